//! The plain-data model stored inside a store.
//!
//! This module provides the [`Value`] enum that represents all possible
//! values a store can hold. Values are either leaf values (primitives like
//! integers, strings, booleans) or branch values (nested maps and lists),
//! and every location in a value tree is addressable by path.
//!
//! Path-addressed access lives here as well: [`Value::get_path`] walks a
//! tree without ever failing hard, and [`Value::set_path`] writes through a
//! tree, creating intermediate containers as needed.

use std::{collections::BTreeMap, fmt};

use thiserror::Error;

use crate::path::{Path, PathBuf};

/// The container type behind [`Value::Map`].
pub type Map = BTreeMap<String, Value>;

/// Structured error types for value operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ValueError {
    /// A path cannot address a location in the value tree.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// Type mismatch during a value conversion.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl ValueError {
    /// Check if this error is related to path addressing.
    pub fn is_invalid_path(&self) -> bool {
        matches!(self, ValueError::InvalidPath { .. })
    }

    /// Check if this error is related to type mismatches.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ValueError::TypeMismatch { .. })
    }
}

impl From<ValueError> for crate::Error {
    fn from(err: ValueError) -> Self {
        crate::Error::Value(err)
    }
}

/// Options for [`Value::set_path`].
#[derive(Debug, Clone, Copy)]
pub struct SetOptions {
    /// When `false` and the final key already holds a value, the existing
    /// value is left untouched and returned instead of being replaced.
    pub overwrite: bool,
}

impl Default for SetOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Values that can be stored in a store.
///
/// `Value` represents all possible data types a store can hold. Values can
/// be either leaf values (terminal data) or branch values (containing other
/// values).
///
/// # Value Types
///
/// ## Leaf Values (Terminal Nodes)
/// - [`Value::Null`] - Represents null/empty values
/// - [`Value::Bool`] - Boolean values (true/false)
/// - [`Value::Int`] - 64-bit signed integers
/// - [`Value::Float`] - 64-bit floating point numbers
/// - [`Value::Text`] - UTF-8 text strings
///
/// ## Branch Values (Container Nodes)
/// - [`Value::Map`] - String-keyed nested structures
/// - [`Value::List`] - Ordered collections
///
/// # Direct Comparisons
///
/// `Value` implements `PartialEq` with primitive types for ergonomic
/// comparisons:
///
/// ```
/// # use watchtree::value::Value;
/// let text = Value::Text("hello".to_string());
/// let number = Value::Int(42);
///
/// assert!(text == "hello");
/// assert!(number == 42);
/// assert!("hello" == text);
///
/// // Type mismatches return false
/// assert!(!(text == 42));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    // Leaf values (terminal nodes)
    /// Null/empty value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text string value
    Text(String),

    // Branch values (can contain other values)
    /// String-keyed sub-tree
    Map(Map),
    /// Ordered collection of values
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this is a leaf value (terminal node)
    pub fn is_leaf(&self) -> bool {
        !self.is_branch()
    }

    /// Returns true if this is a branch value (can contain other values)
    pub fn is_branch(&self) -> bool {
        matches!(self, Value::Map(_) | Value::List(_))
    }

    /// Returns true if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Map(_) => "map",
            Value::List(_) => "list",
        }
    }

    /// Attempts to convert to a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to convert to a boolean, returning default if not a bool
    pub fn as_bool_or(&self, default: bool) -> bool {
        self.as_bool().unwrap_or(default)
    }

    /// Attempts to convert to an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to an integer, returning default if not an int
    pub fn as_int_or(&self, default: i64) -> i64 {
        self.as_int().unwrap_or(default)
    }

    /// Attempts to convert to a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to convert to a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to convert to a string, returning empty string if not text
    pub fn as_text_or_empty(&self) -> &str {
        self.as_text().unwrap_or("")
    }

    /// Attempts to convert to a map (returns immutable reference)
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to convert to a mutable map reference
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Attempts to convert to a list (returns immutable reference)
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Attempts to convert to a mutable list reference
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Gets a value by direct key, if this value is a map.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key.as_ref()),
            _ => None,
        }
    }

    /// Gets a value by path using dot notation (e.g. `"panels.left.width"`).
    ///
    /// The empty path returns this value itself. Numeric segments index
    /// lists. Returns `None` as soon as a segment is missing; a missing
    /// key is never an error.
    ///
    /// # Examples
    ///
    /// ```
    /// # use watchtree::value::{Map, Value};
    /// let mut root = Value::Map(Map::new());
    /// root.set_path("panels.left.width", 300, &Default::default())?;
    ///
    /// assert_eq!(root.get_path("panels.left.width"), Some(&Value::Int(300)));
    /// assert_eq!(root.get_path("panels.missing"), None);
    /// assert_eq!(root.get_path(""), Some(&root));
    /// # Ok::<(), watchtree::ValueError>(())
    /// ```
    pub fn get_path(&self, path: impl AsRef<str>) -> Option<&Value> {
        let path = PathBuf::normalize(path);
        let mut current = self;
        for segment in path.segments() {
            current = match current {
                Value::Map(map) => map.get(segment.as_ref())?,
                Value::List(list) => list.get(segment.as_ref().parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Gets a mutable reference to a value by path
    pub fn get_path_mut(&mut self, path: impl AsRef<str>) -> Option<&mut Value> {
        let path = PathBuf::normalize(path);
        let mut current = self;
        for segment in path.segments() {
            current = match current {
                Value::Map(map) => map.get_mut(segment.as_ref())?,
                Value::List(list) => {
                    let index = segment.as_ref().parse::<usize>().ok()?;
                    list.get_mut(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Gets a text value by path
    pub fn get_text_at_path(&self, path: impl AsRef<str>) -> Option<&str> {
        self.get_path(path)?.as_text()
    }

    /// Gets an integer value by path
    pub fn get_int_at_path(&self, path: impl AsRef<str>) -> Option<i64> {
        self.get_path(path)?.as_int()
    }

    /// Gets a boolean value by path
    pub fn get_bool_at_path(&self, path: impl AsRef<str>) -> Option<bool> {
        self.get_path(path)?.as_bool()
    }

    /// Sets a value at the given path, creating intermediate containers as
    /// needed, and returns the value previously stored there.
    ///
    /// Walking the path converts any existing non-container value found
    /// mid-path into an empty map; the previous scalar is discarded, not
    /// merged. Descending into a list requires a numeric segment: an index
    /// one past the end appends, a larger index pads the list with
    /// [`Value::Null`] first, and a non-numeric segment fails with
    /// [`ValueError::InvalidPath`].
    ///
    /// With `overwrite: false` and the final key already present, the
    /// existing value is left untouched and returned.
    ///
    /// The empty path replaces this value itself.
    ///
    /// # Examples
    ///
    /// ```
    /// # use watchtree::value::{Map, SetOptions, Value};
    /// let mut root = Value::Map(Map::new());
    /// root.set_path("a", 1, &Default::default())?;
    /// let kept = root.set_path("a", 2, &SetOptions { overwrite: false })?;
    ///
    /// assert_eq!(kept, Some(Value::Int(1)));
    /// assert_eq!(root.get_path("a"), Some(&Value::Int(1)));
    /// # Ok::<(), watchtree::ValueError>(())
    /// ```
    pub fn set_path(
        &mut self,
        path: impl AsRef<str>,
        value: impl Into<Value>,
        options: &SetOptions,
    ) -> Result<Option<Value>, ValueError> {
        let path = PathBuf::normalize(path);
        let value = value.into();
        let segments: Vec<String> = path.segments().map(|s| s.into_owned()).collect();
        let Some((last, intermediate)) = segments.split_last() else {
            if !options.overwrite {
                return Ok(Some(self.clone()));
            }
            return Ok(Some(std::mem::replace(self, value)));
        };

        let mut current = self;
        for segment in intermediate {
            current = descend(current, segment, &path)?;
        }

        if let Value::List(list) = current {
            let index = parse_index(last, &path)?;
            if index < list.len() {
                if !options.overwrite {
                    return Ok(Some(list[index].clone()));
                }
                return Ok(Some(std::mem::replace(&mut list[index], value)));
            }
            list.resize(index, Value::Null);
            list.push(value);
            return Ok(None);
        }

        let map = ensure_map(current);
        if !options.overwrite && map.contains_key(last) {
            return Ok(map.get(last).cloned());
        }
        Ok(map.insert(last.clone(), value))
    }

    /// Removes the value at the given path, returning it if present.
    ///
    /// Removing from a list shifts the remaining elements left. Removing the
    /// empty path resets this value to [`Value::Null`] and returns the old
    /// value.
    pub fn remove_path(&mut self, path: impl AsRef<str>) -> Option<Value> {
        let path = PathBuf::normalize(path);
        if path.is_empty() {
            return Some(std::mem::replace(self, Value::Null));
        }
        let parent_path = path.parent().unwrap_or(Path::from_inner(""));
        let name = path.file_name()?.into_owned();
        match self.get_path_mut(parent_path)? {
            Value::Map(map) => map.remove(&name),
            Value::List(list) => {
                let index = name.parse::<usize>().ok()?;
                if index < list.len() {
                    Some(list.remove(index))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Converts to a JSON-like string representation for human-readable
    /// output.
    ///
    /// This method produces output intended for display, debugging, and
    /// export. For lossless interchange, convert to [`serde_json::Value`]
    /// instead.
    pub fn to_json_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Text(s) => format!("\"{}\"", s.replace('\"', "\\\"")),
            Value::Map(map) => {
                let mut result = String::with_capacity(map.len() * 8);
                result.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        result.push(',');
                    }
                    result.push('"');
                    result.push_str(key);
                    result.push_str("\":");
                    result.push_str(&value.to_json_string());
                }
                result.push('}');
                result
            }
            Value::List(list) => {
                let mut result = String::with_capacity(list.len() * 8);
                result.push('[');
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        result.push(',');
                    }
                    result.push_str(&item.to_json_string());
                }
                result.push(']');
                result
            }
        }
    }
}

/// Ensures `slot` is a map, discarding any non-map value.
fn ensure_map(slot: &mut Value) -> &mut Map {
    if !matches!(slot, Value::Map(_)) {
        *slot = Value::Map(Map::new());
    }
    match slot {
        Value::Map(map) => map,
        // converted just above
        _ => unreachable!(),
    }
}

fn parse_index(segment: &str, path: &Path) -> Result<usize, ValueError> {
    segment.parse().map_err(|_| ValueError::InvalidPath {
        path: path.as_str().to_string(),
        reason: format!("segment '{segment}' does not index a list"),
    })
}

/// Walks one intermediate path segment, creating containers as needed.
fn descend<'a>(
    current: &'a mut Value,
    segment: &str,
    path: &Path,
) -> Result<&'a mut Value, ValueError> {
    if let Value::List(list) = current {
        let index = parse_index(segment, path)?;
        if index >= list.len() {
            list.resize(index + 1, Value::Null);
        }
        let slot = &mut list[index];
        if slot.is_leaf() {
            *slot = Value::Map(Map::new());
        }
        return Ok(slot);
    }
    let map = ensure_map(current);
    let slot = map
        .entry(segment.to_string())
        .or_insert_with(|| Value::Map(Map::new()));
    if slot.is_leaf() {
        *slot = Value::Map(Map::new());
    }
    Ok(slot)
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::List(list) => {
                write!(f, "[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenient From implementations for common types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        // Convert to i64, wrapping values above i64::MAX
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Value::Map(iter.into_iter().collect())
    }
}

// Lossless interchange with serde_json documents
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::Number(n.into()),
            Value::Float(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s),
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
            Value::List(list) => {
                serde_json::Value::Array(list.into_iter().map(Into::into).collect())
            }
        }
    }
}

// TryFrom implementations for better type coercion
impl TryFrom<&Value> for String {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(ValueError::TypeMismatch {
                expected: "String".to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<&Value> for i64 {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(n) => Ok(*n),
            _ => Err(ValueError::TypeMismatch {
                expected: "i64".to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Float(n) => Ok(*n),
            _ => Err(ValueError::TypeMismatch {
                expected: "f64".to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}

impl TryFrom<&Value> for bool {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(ValueError::TypeMismatch {
                expected: "bool".to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }
}

// PartialEq implementations for comparing Value with other types
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        match self {
            Value::Text(s) => s == other,
            _ => false,
        }
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Value::Int(n) => n == other,
            _ => false,
        }
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        match self {
            Value::Int(n) => *n == *other as i64,
            _ => false,
        }
    }
}

impl PartialEq<u32> for Value {
    fn eq(&self, other: &u32) -> bool {
        match self {
            Value::Int(n) => *n == *other as i64,
            _ => false,
        }
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        match self {
            Value::Float(n) => n == other,
            _ => false,
        }
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        match self {
            Value::Bool(b) => b == other,
            _ => false,
        }
    }
}

// Reverse implementations for symmetry
impl PartialEq<Value> for str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == *self
    }
}

impl PartialEq<Value> for String {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for i32 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for u32 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for f64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for bool {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}
