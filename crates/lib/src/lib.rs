//!
//! Watchtree: an observable nested data store.
//! This library turns an arbitrary nested plain-data value into an observable
//! graph that reports fine-grained change events addressed by dot-path, and
//! lets two independent graphs be kept in sync bidirectionally without
//! feedback loops.
//!
//! ## Core Concepts
//!
//! Watchtree is built around a small number of pieces:
//!
//! * **Values (`value::Value`)**: The JSON-like data model. Everything stored in a
//!   store is a tree of maps, lists, and scalars.
//! * **Paths (`path::Path` / `path::PathBuf`)**: Dot-separated addresses into the
//!   value tree, with escape-aware segmentation so segments may contain literal
//!   separators.
//! * **Stores (`store::Store`)**: The reactive container owning one root value and
//!   its listener registries. All writes flow through the store, which dispatches
//!   `"set"` before committing and `"change"` after.
//! * **Matchers (`store::Matcher`)**: Exact-path, subtree, or predicate filters
//!   deciding which listeners receive an event for a given path.
//! * **Scopes (`store::Scope`)**: Handles bound to a store and an absolute path
//!   prefix, giving relative access to a subtree.
//! * **Bridges (`bridge`)**: Pairs of listeners that keep two store subtrees
//!   mirrored, using a shared initiator token to suppress echoes.
//!
//! ## Example
//!
//! ```
//! use std::{cell::Cell, rc::Rc};
//! use watchtree::{Store, store::event};
//!
//! let store = Store::from_json(r#"{"panel": {"width": 300}}"#)?;
//!
//! let width = Rc::new(Cell::new(0i64));
//! let seen = width.clone();
//! store.subscribe(event::CHANGE, "panel.width", move |ev| {
//!     seen.set(ev.new_value.as_int().unwrap_or_default());
//!     Ok(())
//! }).detach();
//!
//! store.set("panel.width", 420)?;
//! assert_eq!(width.get(), 420);
//! # Ok::<(), watchtree::Error>(())
//! ```

pub mod bridge;
pub mod path;
pub mod store;
pub mod value;

pub use bridge::BridgeHandle;
pub use path::{Path, PathBuf, PathSyntax};
pub use store::{ChangeEvent, Matcher, RawListHandle, Scope, Store, StoreError, Subscription};
pub use value::{Map, SetOptions, Value, ValueError};

/// Result type used throughout the Watchtree library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Watchtree library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured value/path errors from the value module
    #[error(transparent)]
    Value(value::ValueError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// An error surfaced by a listener during dispatch.
    ///
    /// Listener failures are never caught or retried by the store; they abort
    /// the remaining handlers for the event and unwind through the write that
    /// triggered the dispatch.
    #[error("listener failed: {0}")]
    Listener(Box<dyn std::error::Error>),
}

impl Error {
    /// Wraps an arbitrary consumer error for propagation out of a listener.
    pub fn listener(err: impl Into<Box<dyn std::error::Error>>) -> Self {
        Error::Listener(err.into())
    }

    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Serialize(_) => "serialize",
            Error::Value(_) => "value",
            Error::Store(_) => "store",
            Error::Listener(_) => "listener",
        }
    }

    /// Check if this error was caused by an address that cannot be resolved.
    pub fn is_invalid_path(&self) -> bool {
        match self {
            Error::Value(value_err) => value_err.is_invalid_path(),
            _ => false,
        }
    }

    /// Check if this error is a value type mismatch.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Value(value_err) => value_err.is_type_error(),
            Error::Store(store_err) => store_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is the re-entrancy guard tripping on a dispatch cycle.
    pub fn is_dispatch_cycle(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_dispatch_cycle(),
            _ => false,
        }
    }

    /// Check if this error originated in a listener.
    pub fn is_listener_error(&self) -> bool {
        matches!(self, Error::Listener(_))
    }
}
