//! Change events delivered to listeners.

use crate::path::PathBuf;
use crate::value::Value;

/// Event name dispatched before a write is committed.
///
/// A `"set"` listener that reads back through the store observes the value
/// the write is about to replace still in place.
pub const SET: &str = "set";

/// Event name dispatched after a write committed a different value.
///
/// A `"change"` listener observes the new value already committed. Writes
/// that store a value equal to the current one dispatch [`SET`] only.
pub const CHANGE: &str = "change";

/// Context information passed to listeners during dispatch.
///
/// The same payload is used for `"set"` and `"change"`; the two events
/// differ only in when they fire relative to the commit.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// The value previously stored at the path, if any.
    pub old_value: Option<Value>,
    /// The value being written.
    pub new_value: Value,
    /// The written path, relative to the store root.
    pub path: PathBuf,
    /// Caller-supplied opaque metadata, threaded from
    /// [`Store::set_with`](super::Store::set_with). Never stored in the tree.
    pub extra: Option<Value>,
}

impl ChangeEvent {
    /// Creates an event payload for a write of `new_value` over `old_value`.
    pub fn new(path: PathBuf, old_value: Option<Value>, new_value: Value) -> Self {
        Self {
            old_value,
            new_value,
            path,
            extra: None,
        }
    }

    /// Attaches opaque metadata to the event.
    pub fn with_extra(mut self, extra: Option<Value>) -> Self {
        self.extra = extra;
        self
    }
}
