//! The reactive store: one root value, listener registries, and the write
//! path that turns assignments into events.
//!
//! # Write contract
//!
//! Every write flows through [`Store::set_with`], which:
//!
//! 1. reads (and clones) the old value at the path,
//! 2. dispatches `"set"` **before** committing — a `"set"` listener reading
//!    back through the store observes the old value still in place,
//! 3. commits the write,
//! 4. dispatches `"change"` **after** committing, and only if the new value
//!    differs from the old one.
//!
//! Deletes are silent: [`Store::remove`] dispatches no event at all. This
//! asymmetry is part of the contract.
//!
//! # Dispatch model
//!
//! Dispatch is fully synchronous and single-threaded. Handlers run in
//! registration order; a handler returning an error aborts the remaining
//! handlers and the error unwinds through the triggering write. Handlers may
//! freely read and write the store (no root borrow is held across handler
//! invocation); a handler that writes back to the very path/event it is
//! handling trips the re-entrancy guard and receives
//! [`StoreError::DispatchCycle`] instead of recursing unboundedly.

pub mod event;

mod errors;
mod registry;
mod scope;

pub use errors::StoreError;
pub use event::ChangeEvent;
pub use registry::{ListenerFn, Matcher};
pub use scope::{RawListHandle, Scope};

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

use tracing::{debug, trace};

use crate::path::PathBuf;
use crate::value::{Map, SetOptions, Value};
use registry::ListenerRegistry;

pub(crate) struct StoreInner {
    pub(crate) root: RefCell<Value>,
    registries: RefCell<HashMap<String, ListenerRegistry>>,
    /// Stack of (event, path) pairs currently being dispatched.
    dispatching: RefCell<Vec<(String, PathBuf)>>,
    next_listener_id: Cell<u64>,
}

/// The reactive container owning a root value and its listener registries.
///
/// `Store` is a cheap handle: cloning it yields another handle to the same
/// underlying store, which is how listeners (and bridges) capture the store
/// they write back into.
///
/// # Examples
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use watchtree::{Store, store::event};
///
/// let store = Store::from_json(r#"{"editor": {"font": 13}}"#)?;
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let sink = log.clone();
/// store.subscribe(event::CHANGE, "editor.font", move |ev| {
///     sink.borrow_mut().push(ev.new_value.clone());
///     Ok(())
/// }).detach();
///
/// store.set("editor.font", 15)?;
/// store.set("editor.font", 15)?; // equal value: "set" only, no "change"
/// assert_eq!(log.borrow().len(), 1);
/// # Ok::<(), watchtree::Error>(())
/// ```
#[derive(Clone)]
pub struct Store {
    pub(crate) inner: Rc<StoreInner>,
}

impl Store {
    /// Creates a store owning an empty map.
    pub fn new() -> Self {
        Self::from_value(Value::Map(Map::new()))
    }

    /// Creates a store owning `value` as its root.
    pub fn from_value(value: impl Into<Value>) -> Self {
        Store {
            inner: Rc::new(StoreInner {
                root: RefCell::new(value.into()),
                registries: RefCell::new(HashMap::new()),
                dispatching: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            }),
        }
    }

    /// Creates a store by parsing a JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(Value::from(parsed)))
    }

    /// Returns a snapshot of the root value.
    pub fn data(&self) -> Value {
        self.inner.root.borrow().clone()
    }

    /// Replaces the root value through the ordinary write path.
    ///
    /// This produces `"set"`/`"change"` events with the empty path, exactly
    /// like any nested write.
    pub fn set_data(&self, value: impl Into<Value>) -> crate::Result<Option<Value>> {
        self.set("", value)
    }

    /// Returns a snapshot of the value at `path`, if present.
    pub fn get(&self, path: impl AsRef<str>) -> Option<Value> {
        self.inner.root.borrow().get_path(path).cloned()
    }

    /// Returns the text at `path`, if present and text.
    pub fn get_text(&self, path: impl AsRef<str>) -> Option<String> {
        self.inner
            .root
            .borrow()
            .get_text_at_path(path)
            .map(str::to_string)
    }

    /// Returns the integer at `path`, if present and an integer.
    pub fn get_int(&self, path: impl AsRef<str>) -> Option<i64> {
        self.inner.root.borrow().get_int_at_path(path)
    }

    /// Returns the boolean at `path`, if present and a boolean.
    pub fn get_bool(&self, path: impl AsRef<str>) -> Option<bool> {
        self.inner.root.borrow().get_bool_at_path(path)
    }

    /// Returns `true` if `path` addresses a value in the store.
    pub fn contains_path(&self, path: impl AsRef<str>) -> bool {
        self.inner.root.borrow().get_path(path).is_some()
    }

    /// Writes `value` at `path`, returning the value previously stored
    /// there.
    pub fn set(&self, path: impl AsRef<str>, value: impl Into<Value>) -> crate::Result<Option<Value>> {
        self.set_with(path, value, None)
    }

    /// Writes `value` at `path` with opaque metadata threaded into the
    /// emitted events.
    ///
    /// `extra` is delivered to every `"set"`/`"change"` listener for this
    /// write and is never stored in the tree. This is the channel consumers
    /// use to tag their own writes (a bridge carries its initiator token
    /// here).
    pub fn set_with(
        &self,
        path: impl AsRef<str>,
        value: impl Into<Value>,
        extra: Option<Value>,
    ) -> crate::Result<Option<Value>> {
        let path = PathBuf::normalize(path);
        let value = value.into();
        trace!(path = %path, value = %value.type_name(), "set");

        // Old value is read before anything else; the "set" dispatch below
        // must observe it still committed.
        let old_value = self.inner.root.borrow().get_path(&path).cloned();
        let payload =
            ChangeEvent::new(path.clone(), old_value.clone(), value.clone()).with_extra(extra);

        self.dispatch(event::SET, &payload)?;

        {
            let mut root = self.inner.root.borrow_mut();
            root.set_path(&path, value, &SetOptions::default())?;
        }

        let changed = match &payload.old_value {
            Some(old) => *old != payload.new_value,
            None => true,
        };
        if changed {
            self.dispatch(event::CHANGE, &payload)?;
        }
        Ok(old_value)
    }

    /// Removes the value at `path`, returning it if present.
    ///
    /// Deletes dispatch **no** events; only writes are observable. Removing
    /// the empty path resets the root to [`Value::Null`].
    pub fn remove(&self, path: impl AsRef<str>) -> Option<Value> {
        let path = PathBuf::normalize(path);
        trace!(path = %path, "remove");
        self.inner.root.borrow_mut().remove_path(&path)
    }

    /// Registers a listener for `event` on the paths accepted by `matcher`.
    ///
    /// The registry for `event` is created lazily on first subscription.
    /// Listeners fire in registration order and live until the returned
    /// [`Subscription`] is cancelled (dropping it without cancelling leaves
    /// the listener registered for the life of the store).
    pub fn subscribe(
        &self,
        event: impl Into<String>,
        matcher: impl Into<Matcher>,
        handler: impl Fn(&ChangeEvent) -> crate::Result<()> + 'static,
    ) -> Subscription {
        let event = event.into();
        let matcher = matcher.into();
        let id = self.inner.next_listener_id.get();
        self.inner.next_listener_id.set(id + 1);
        debug!(event = %event, id, matcher = ?matcher, "listener registered");

        self.inner
            .registries
            .borrow_mut()
            .entry(event.clone())
            .or_default()
            .register(id, matcher, Rc::new(handler));

        Subscription {
            inner: Rc::downgrade(&self.inner),
            event,
            id,
        }
    }

    /// Dispatches a caller-defined event to its listeners.
    ///
    /// `"set"` and `"change"` are produced by the write path; `emit` is the
    /// entry point for every other event name a consumer wants to route
    /// through the store's registries.
    pub fn emit(&self, event: impl AsRef<str>, payload: &ChangeEvent) -> crate::Result<()> {
        self.dispatch(event.as_ref(), payload)
    }

    /// Returns the number of listeners registered for `event`.
    pub fn listener_count(&self, event: impl AsRef<str>) -> usize {
        self.inner
            .registries
            .borrow()
            .get(event.as_ref())
            .map(ListenerRegistry::len)
            .unwrap_or(0)
    }

    /// Returns a handle scoped to the subtree at `path`.
    pub fn at(&self, path: impl AsRef<str>) -> Scope {
        Scope::new(self.clone(), PathBuf::normalize(path))
    }

    /// Returns a raw-mutation handle for the list at `path`.
    ///
    /// Raw list mutations bypass the write path entirely: they produce no
    /// events and their elements enter the tree unobserved. See
    /// [`RawListHandle`].
    pub fn raw_list(&self, path: impl AsRef<str>) -> crate::Result<RawListHandle> {
        let path = PathBuf::normalize(path);
        match self.inner.root.borrow().get_path(&path) {
            Some(Value::List(_)) => Ok(RawListHandle::new(self.clone(), path)),
            _ => Err(StoreError::NotAList {
                path: path.to_string(),
            }
            .into()),
        }
    }

    /// Invokes every handler registered for `event` whose matcher accepts
    /// the payload's path, synchronously and in registration order.
    fn dispatch(&self, event: &str, payload: &ChangeEvent) -> crate::Result<()> {
        let handlers = {
            let registries = self.inner.registries.borrow();
            match registries.get(event) {
                Some(registry) => registry.lookup(&payload.path),
                None => return Ok(()),
            }
        };
        if handlers.is_empty() {
            return Ok(());
        }
        trace!(event, path = %payload.path, handlers = handlers.len(), "dispatch");

        {
            let dispatching = self.inner.dispatching.borrow();
            if dispatching
                .iter()
                .any(|(e, p)| e == event && p.as_str() == payload.path.as_str())
            {
                return Err(StoreError::DispatchCycle {
                    event: event.to_string(),
                    path: payload.path.to_string(),
                }
                .into());
            }
        }

        self.inner
            .dispatching
            .borrow_mut()
            .push((event.to_string(), payload.path.clone()));
        let result = handlers.iter().try_for_each(|handler| handler(payload));
        self.inner.dispatching.borrow_mut().pop();
        result
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// A disposer handle for a registered listener.
///
/// Cancelling removes the listener from its registry. Dropping the handle
/// without cancelling detaches it: the listener stays registered for the
/// life of the store.
#[must_use = "dropping a Subscription without cancelling leaves the listener registered"]
pub struct Subscription {
    inner: Weak<StoreInner>,
    event: String,
    id: u64,
}

impl Subscription {
    /// The event name this subscription listens on.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Removes the listener from the store.
    ///
    /// Returns `false` if the store is gone or the listener was already
    /// removed.
    pub fn cancel(self) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut registries = inner.registries.borrow_mut();
        let Some(registry) = registries.get_mut(&self.event) else {
            return false;
        };
        let removed = registry.remove(self.id);
        if removed {
            debug!(event = %self.event, id = self.id, "listener cancelled");
        }
        removed
    }

    /// Detaches the subscription explicitly, leaving the listener registered.
    pub fn detach(self) {}
}
