//! Handles scoped to a subtree of a store.

use tracing::trace;

use crate::path::{Path, PathBuf};
use crate::store::{ChangeEvent, Matcher, Store, StoreError, Subscription};
use crate::value::Value;

/// A handle bound to a store and an absolute path prefix.
///
/// A scope gives relative access to one container of the tree: it remembers
/// the owning store and composes the absolute path for every operation, so
/// writes made through a scope ride the store's ordinary write path and
/// reach the same listeners with absolute event paths.
///
/// # Examples
///
/// ```
/// # use watchtree::Store;
/// let store = Store::from_json(r#"{"panels": {"left": {"width": 300}}}"#)?;
/// let left = store.at("panels.left");
///
/// left.set("width", 340)?;
/// assert_eq!(store.get_int("panels.left.width"), Some(340));
/// assert_eq!(left.get("width"), store.get("panels.left.width"));
/// # Ok::<(), watchtree::Error>(())
/// ```
#[derive(Clone)]
pub struct Scope {
    store: Store,
    prefix: PathBuf,
}

impl Scope {
    pub(crate) fn new(store: Store, prefix: PathBuf) -> Self {
        Scope { store, prefix }
    }

    /// The absolute path prefix this scope is bound to.
    pub fn path(&self) -> &Path {
        &self.prefix
    }

    /// The owning store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns a scope for a descendant of this scope.
    pub fn at(&self, path: impl AsRef<str>) -> Scope {
        Scope {
            store: self.store.clone(),
            prefix: self.prefix.clone().push(path),
        }
    }

    /// Returns a snapshot of the value this scope is bound to.
    pub fn value(&self) -> Option<Value> {
        self.store.get(&self.prefix)
    }

    /// Returns a snapshot of the value at `path`, relative to this scope.
    pub fn get(&self, path: impl AsRef<str>) -> Option<Value> {
        self.store.get(self.prefix.clone().push(path))
    }

    /// Writes `value` at `path`, relative to this scope.
    pub fn set(&self, path: impl AsRef<str>, value: impl Into<Value>) -> crate::Result<Option<Value>> {
        self.store.set(self.prefix.clone().push(path), value)
    }

    /// Writes with opaque metadata, relative to this scope.
    pub fn set_with(
        &self,
        path: impl AsRef<str>,
        value: impl Into<Value>,
        extra: Option<Value>,
    ) -> crate::Result<Option<Value>> {
        self.store
            .set_with(self.prefix.clone().push(path), value, extra)
    }

    /// Removes the value at `path`, relative to this scope. Silent, like
    /// [`Store::remove`].
    pub fn remove(&self, path: impl AsRef<str>) -> Option<Value> {
        self.store.remove(self.prefix.clone().push(path))
    }

    /// Subscribes to `event` for this scope's subtree (the prefix itself and
    /// every descendant).
    pub fn subscribe(
        &self,
        event: impl Into<String>,
        handler: impl Fn(&ChangeEvent) -> crate::Result<()> + 'static,
    ) -> Subscription {
        self.store
            .subscribe(event, Matcher::Subtree(self.prefix.clone()), handler)
    }
}

/// Raw, untracked access to a list in the tree.
///
/// The four mutators operate directly on the underlying `Vec<Value>` and
/// bypass the write path: no `"set"`, no `"change"`, no metadata. Elements
/// introduced this way enter the tree unobserved. This is an explicit
/// opt-out of change tracking; use indexed writes
/// (`store.set("items.0", …)`) when listeners need to see the mutation.
pub struct RawListHandle {
    store: Store,
    path: PathBuf,
}

impl std::fmt::Debug for RawListHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawListHandle")
            .field("path", &self.path)
            .finish()
    }
}

impl RawListHandle {
    pub(crate) fn new(store: Store, path: PathBuf) -> Self {
        RawListHandle { store, path }
    }

    /// The absolute path of the list.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_list<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> crate::Result<R> {
        let mut root = self.store.inner.root.borrow_mut();
        match root.get_path_mut(&self.path) {
            Some(Value::List(list)) => Ok(f(list)),
            _ => Err(StoreError::NotAList {
                path: self.path.to_string(),
            }
            .into()),
        }
    }

    /// Appends a value. No events are dispatched.
    pub fn push(&self, value: impl Into<Value>) -> crate::Result<()> {
        trace!(path = %self.path, "raw list push");
        self.with_list(|list| list.push(value.into()))
    }

    /// Removes and returns the last value. No events are dispatched.
    pub fn pop(&self) -> crate::Result<Option<Value>> {
        trace!(path = %self.path, "raw list pop");
        self.with_list(Vec::pop)
    }

    /// Prepends a value. No events are dispatched.
    pub fn push_front(&self, value: impl Into<Value>) -> crate::Result<()> {
        trace!(path = %self.path, "raw list push_front");
        self.with_list(|list| list.insert(0, value.into()))
    }

    /// Removes and returns the first value. No events are dispatched.
    pub fn pop_front(&self) -> crate::Result<Option<Value>> {
        trace!(path = %self.path, "raw list pop_front");
        self.with_list(|list| {
            if list.is_empty() {
                None
            } else {
                Some(list.remove(0))
            }
        })
    }

    /// The current length of the list.
    pub fn len(&self) -> crate::Result<usize> {
        self.with_list(|list| list.len())
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> crate::Result<bool> {
        self.with_list(|list| list.is_empty())
    }
}
