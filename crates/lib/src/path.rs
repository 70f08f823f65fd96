//! Path types for addressing values inside a store.
//!
//! This module provides type-safe path construction and segmentation for
//! accessing nested structures. The Path/PathBuf types follow the same
//! borrowed/owned pattern as std::path::Path/PathBuf.
//!
//! # Core Types
//!
//! - [`Path`] - An unsized borrowed path type (always behind a reference)
//! - [`PathBuf`] - An owned path type that can be constructed and modified
//! - [`PathSyntax`] - The separator/escape pair driving the raw codec
//!
//! # Escaping
//!
//! A segment boundary exists only at an *unescaped* occurrence of the
//! separator. The escape character is backslash: `\.` inside a segment is a
//! literal dot, `\\` is a literal backslash, and a backslash before any
//! other character escapes that character verbatim. A trailing lone
//! backslash is taken literally.
//!
//! # Usage
//!
//! ```rust
//! use watchtree::path::PathBuf;
//! use std::str::FromStr;
//!
//! // Construct from string (automatically normalized)
//! let path = PathBuf::from_str("editor.theme.accent")?;
//!
//! // Build incrementally (infallible)
//! let path = PathBuf::new()
//!     .push("editor")
//!     .push("theme")
//!     .push("accent");
//! assert_eq!(path.as_str(), "editor.theme.accent");
//!
//! // Segments may contain a literal separator
//! let file = PathBuf::new().push("files").push_segment("main.rs");
//! assert_eq!(file.as_str(), "files.main\\.rs");
//! # Ok::<(), std::convert::Infallible>(())
//! ```

use std::{
    borrow::{Borrow, Cow},
    fmt,
    ops::Deref,
    str::FromStr,
};

/// The default segment separator.
pub const DEFAULT_SEPARATOR: char = '.';

/// The default escape character.
pub const DEFAULT_ESCAPE: char = '\\';

/// A separator/escape pair driving the raw path codec.
///
/// [`Path`] and [`PathBuf`] always use the default syntax; the syntax type
/// exists for callers that need to split or join path strings with a
/// different separator.
///
/// # Examples
///
/// ```rust
/// # use watchtree::path::PathSyntax;
/// let slashes = PathSyntax::new('/', '\\');
/// assert_eq!(slashes.split("a/b/c"), vec!["a", "b", "c"]);
/// assert_eq!(slashes.split("a\\/b/c"), vec!["a/b", "c"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSyntax {
    /// The segment separator.
    pub separator: char,
    /// The escape character.
    pub escape: char,
}

impl Default for PathSyntax {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            escape: DEFAULT_ESCAPE,
        }
    }
}

impl PathSyntax {
    /// Creates a syntax from a separator and an escape character.
    pub const fn new(separator: char, escape: char) -> Self {
        Self { separator, escape }
    }

    /// Splits a raw path string into unescaped segments.
    ///
    /// A boundary exists at every unescaped separator. Empty segments
    /// produced by leading, trailing, or consecutive separators are dropped,
    /// so `".a..b."` splits the same as `"a.b"`.
    pub fn split(&self, raw: &str) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c == self.escape {
                // A trailing lone escape is literal.
                current.push(chars.next().unwrap_or(self.escape));
            } else if c == self.separator {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Escapes a single segment so it survives a [`split`](Self::split)
    /// round trip intact.
    pub fn escape_segment(&self, segment: &str) -> String {
        let mut out = String::with_capacity(segment.len());
        for c in segment.chars() {
            if c == self.separator || c == self.escape {
                out.push(self.escape);
            }
            out.push(c);
        }
        out
    }

    /// Joins unescaped segments into a serialized path string.
    ///
    /// Empty segments are dropped; `join` after [`split`](Self::split) is the
    /// identity on normalized paths.
    pub fn join<I>(&self, segments: I) -> String
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut out = String::new();
        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(self.separator);
            }
            out.push_str(&self.escape_segment(segment));
        }
        out
    }

    /// Normalizes a raw path string into canonical serialized form.
    pub fn normalize(&self, raw: &str) -> String {
        self.join(self.split(raw))
    }
}

/// Unescapes a serialized segment, borrowing when no escape is present.
fn unescape<'a>(segment: &'a str, syntax: &PathSyntax) -> Cow<'a, str> {
    if !segment.contains(syntax.escape) {
        return Cow::Borrowed(segment);
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == syntax.escape {
            out.push(chars.next().unwrap_or(syntax.escape));
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Iterator over the serialized (still escaped) segments of a path.
struct RawSegments<'a> {
    rest: Option<&'a str>,
    syntax: PathSyntax,
}

impl<'a> RawSegments<'a> {
    fn new(inner: &'a str) -> Self {
        Self {
            rest: if inner.is_empty() { None } else { Some(inner) },
            syntax: PathSyntax::default(),
        }
    }
}

impl<'a> Iterator for RawSegments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let mut iter = rest.char_indices();
        while let Some((i, c)) = iter.next() {
            if c == self.syntax.escape {
                iter.next();
            } else if c == self.syntax.separator {
                self.rest = Some(&rest[i + c.len_utf8()..]);
                return Some(&rest[..i]);
            }
        }
        self.rest = None;
        Some(rest)
    }
}

/// An owned path addressing a value inside a store.
///
/// `PathBuf` holds the canonical serialized form of a path: segments joined
/// by the default separator, with separators and escape characters inside a
/// segment escaped. Construction normalizes its input, so two paths that
/// address the same location always compare equal.
///
/// # Examples
///
/// ```rust
/// # use watchtree::path::PathBuf;
/// # use std::str::FromStr;
/// let path = PathBuf::from_str("panels.left.width")?;
/// let segments: Vec<_> = path.segments().collect();
/// assert_eq!(segments, vec!["panels", "left", "width"]);
/// # Ok::<(), std::convert::Infallible>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathBuf {
    inner: String,
}

/// A borrowed path, the unsized counterpart to [`PathBuf`].
///
/// `Path` relates to `PathBuf` the way `&str` relates to `String`. It is
/// always used behind a reference and provides read-only access to the
/// canonical serialized form.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Path {
    inner: str,
}

impl PathBuf {
    /// Creates a new empty path, addressing the root value itself.
    pub fn new() -> Self {
        Self {
            inner: String::new(),
        }
    }

    /// Creates a path by normalizing the input string.
    ///
    /// This method always succeeds: empty segments are dropped and escape
    /// sequences are canonicalized.
    pub fn normalize(raw: impl AsRef<str>) -> Self {
        Self {
            inner: PathSyntax::default().normalize(raw.as_ref()),
        }
    }

    /// Adds a path to the end of this path.
    ///
    /// The argument is interpreted as a path string and normalized, so it may
    /// itself contain separators. Use [`push_segment`](Self::push_segment) to
    /// append literal content as a single segment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use watchtree::path::PathBuf;
    /// let path = PathBuf::new().push("panels").push("left.width");
    /// assert_eq!(path.as_str(), "panels.left.width");
    /// ```
    pub fn push(mut self, path: impl AsRef<str>) -> Self {
        let normalized = PathSyntax::default().normalize(path.as_ref());
        if normalized.is_empty() {
            return self;
        }
        if self.inner.is_empty() {
            self.inner = normalized;
        } else {
            self.inner.push(DEFAULT_SEPARATOR);
            self.inner.push_str(&normalized);
        }
        self
    }

    /// Appends a single literal segment, escaping separators inside it.
    ///
    /// An empty segment is ignored: the empty segment is not representable in
    /// a normalized path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use watchtree::path::PathBuf;
    /// let path = PathBuf::new().push("files").push_segment("mod.rs");
    /// let segments: Vec<_> = path.segments().collect();
    /// assert_eq!(segments, vec!["files", "mod.rs"]);
    /// ```
    pub fn push_segment(mut self, segment: impl AsRef<str>) -> Self {
        let segment = segment.as_ref();
        if segment.is_empty() {
            return self;
        }
        let escaped = PathSyntax::default().escape_segment(segment);
        if self.inner.is_empty() {
            self.inner = escaped;
        } else {
            self.inner.push(DEFAULT_SEPARATOR);
            self.inner.push_str(&escaped);
        }
        self
    }

    /// Joins this path with another already-canonical path.
    pub fn join(mut self, other: impl AsRef<Path>) -> Self {
        let other = other.as_ref();
        if self.inner.is_empty() {
            self.inner = other.as_str().to_string();
        } else if !other.as_str().is_empty() {
            self.inner.push(DEFAULT_SEPARATOR);
            self.inner.push_str(other.as_str());
        }
        self
    }
}

impl Path {
    /// Creates a Path from a canonical serialized string.
    ///
    /// Internal: callers obtain a `&Path` through `Deref` on [`PathBuf`] or
    /// from slicing operations such as [`strip_prefix`](Self::strip_prefix).
    pub(crate) fn from_inner(s: &str) -> &Path {
        // SAFETY: Path is a repr(transparent) wrapper around str
        unsafe { &*(s as *const str as *const Path) }
    }

    /// Returns the path as its canonical serialized string.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if the path has no segments (it addresses the root).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of segments in the path.
    pub fn len(&self) -> usize {
        RawSegments::new(&self.inner).count()
    }

    /// Returns an iterator over the unescaped segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = Cow<'_, str>> {
        RawSegments::new(&self.inner).map(|raw| unescape(raw, &PathSyntax::default()))
    }

    /// Returns the last segment of the path, or `None` if empty.
    pub fn file_name(&self) -> Option<Cow<'_, str>> {
        RawSegments::new(&self.inner)
            .last()
            .map(|raw| unescape(raw, &PathSyntax::default()))
    }

    /// Returns the path with the last segment removed, or `None` if the path
    /// has fewer than two segments.
    pub fn parent(&self) -> Option<&Path> {
        if self.inner.is_empty() {
            return None;
        }
        let mut last = None;
        let mut iter = self.inner.char_indices();
        while let Some((i, c)) = iter.next() {
            if c == DEFAULT_ESCAPE {
                iter.next();
            } else if c == DEFAULT_SEPARATOR {
                last = Some(i);
            }
        }
        last.map(|i| Path::from_inner(&self.inner[..i]))
    }

    /// Returns `true` if `prefix` is a whole-segment prefix of this path.
    ///
    /// The empty path is a prefix of every path.
    pub fn starts_with(&self, prefix: impl AsRef<Path>) -> bool {
        self.strip_prefix(prefix).is_some()
    }

    /// Removes a whole-segment prefix, returning the remainder.
    ///
    /// Matching is segment-wise, never character-wise: `"ab.c"` does not have
    /// the prefix `"a"`. Stripping a path from itself yields the empty path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use watchtree::path::PathBuf;
    /// let path = PathBuf::normalize("panels.left.width");
    /// let prefix = PathBuf::normalize("panels");
    /// assert_eq!(path.strip_prefix(&prefix).unwrap().as_str(), "left.width");
    /// assert!(path.strip_prefix(PathBuf::normalize("pan")).is_none());
    /// ```
    pub fn strip_prefix(&self, prefix: impl AsRef<Path>) -> Option<&Path> {
        let prefix = prefix.as_ref().as_str();
        if prefix.is_empty() {
            return Some(self);
        }
        let rest = self.inner.strip_prefix(prefix)?;
        if rest.is_empty() {
            return Some(Path::from_inner(""));
        }
        // Canonical escaping is unique, so a serialized-form match that lands
        // on a separator is exactly a whole-segment match.
        rest.strip_prefix(DEFAULT_SEPARATOR).map(Path::from_inner)
    }

    /// Converts this `Path` to an owned [`PathBuf`].
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Default for PathBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for PathBuf {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        Path::from_inner(self.inner.as_str())
    }
}

impl AsRef<Path> for PathBuf {
    fn as_ref(&self) -> &Path {
        self.deref()
    }
}

impl AsRef<Path> for Path {
    fn as_ref(&self) -> &Path {
        self
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl AsRef<str> for PathBuf {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Borrow<Path> for PathBuf {
    fn borrow(&self) -> &Path {
        self.deref()
    }
}

impl From<&Path> for PathBuf {
    fn from(path: &Path) -> Self {
        path.to_path_buf()
    }
}

impl From<&PathBuf> for PathBuf {
    fn from(path: &PathBuf) -> Self {
        path.clone()
    }
}

impl From<&str> for PathBuf {
    fn from(raw: &str) -> Self {
        PathBuf::normalize(raw)
    }
}

impl FromStr for PathBuf {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl fmt::Display for PathBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", &self.inner)
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", &self.inner)
        }
    }
}
