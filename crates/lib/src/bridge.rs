//! Two-way mirroring between subtrees of two stores.
//!
//! A bridge is nothing more than a pair of `"change"` listeners. Each
//! listener mirrors writes from its own subtree into the corresponding
//! location of the peer subtree, tagging the mirrored write with a shared
//! initiator token in the event metadata. When the mirrored write comes back
//! around as a `"change"` on the peer, the reverse listener recognizes its
//! own token and drops the event — this token check is the sole mechanism
//! preventing infinite write loops between two mutually observing stores.
//!
//! # Examples
//!
//! ```
//! # use watchtree::Store;
//! let a = Store::from_json(r#"{"x": {"y": 1}}"#)?;
//! let b = Store::from_json(r#"{"z": {"y": 1}}"#)?;
//!
//! let handle = a.bridge("x", &b, "z");
//!
//! a.set("x.y", 2)?;
//! assert_eq!(b.get_int("z.y"), Some(2));
//!
//! b.set("z.y", 3)?;
//! assert_eq!(a.get_int("x.y"), Some(3));
//!
//! handle.cancel();
//! a.set("x.y", 4)?;
//! assert_eq!(b.get_int("z.y"), Some(3));
//! # Ok::<(), watchtree::Error>(())
//! ```

use tracing::debug;
use uuid::Uuid;

use crate::path::PathBuf;
use crate::store::{ChangeEvent, Matcher, Store, Subscription, event};
use crate::value::{Map, Value};

/// The key under which a bridge stores its token in event metadata.
const INITIATOR_KEY: &str = "initiator";

/// Builds the `extra` metadata a bridge attaches to mirrored writes.
fn initiator_extra(token: &str) -> Value {
    let mut extra = Map::new();
    extra.insert(INITIATOR_KEY.to_string(), Value::from(token));
    Value::Map(extra)
}

/// Returns `true` if the event carries this bridge's initiator token, i.e.
/// it is the echo of a write the bridge itself performed.
fn initiated_by(payload: &ChangeEvent, token: &str) -> bool {
    payload
        .extra
        .as_ref()
        .and_then(|extra| extra.get(INITIATOR_KEY))
        .and_then(Value::as_text)
        .is_some_and(|initiator| initiator == token)
}

/// Registers one direction of a bridge: changes under `source_prefix` on
/// `source` are mirrored to the corresponding path under `target_prefix` on
/// `target`.
fn wire(
    source: &Store,
    source_prefix: PathBuf,
    target: Store,
    target_prefix: PathBuf,
    token: String,
) -> Subscription {
    let matcher = Matcher::Subtree(source_prefix.clone());
    source.subscribe(event::CHANGE, matcher, move |payload| {
        if initiated_by(payload, &token) {
            return Ok(());
        }
        let Some(relative) = payload.path.strip_prefix(&source_prefix) else {
            return Ok(());
        };
        let target_path = target_prefix.clone().join(relative);
        target.set_with(
            target_path,
            payload.new_value.clone(),
            Some(initiator_extra(&token)),
        )?;
        Ok(())
    })
}

/// The two subscriptions backing an established bridge.
///
/// Cancelling tears down both directions. Dropping the handle without
/// cancelling leaves the bridge mirroring for the life of the stores.
#[must_use = "dropping a BridgeHandle without cancelling leaves the bridge active"]
pub struct BridgeHandle {
    local: Subscription,
    remote: Subscription,
    token: String,
}

impl BridgeHandle {
    /// The initiator token shared by both directions of this bridge.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Tears down both directions of the bridge.
    pub fn cancel(self) {
        self.local.cancel();
        self.remote.cancel();
    }

    /// Detaches the bridge explicitly, leaving it mirroring.
    pub fn detach(self) {
        self.local.detach();
        self.remote.detach();
    }
}

impl Store {
    /// Keeps the subtree at `local_path` mirrored with the subtree at
    /// `remote_path` of `remote`, in both directions.
    ///
    /// Writing anywhere under `local_path` mirrors the written value to the
    /// corresponding location under `remote_path`, and vice versa. Each
    /// external write fires exactly one `"change"` per store: the mirrored
    /// write carries a fresh initiator token in its metadata, and the
    /// reverse listener drops events tagged with its own token instead of
    /// re-mirroring them.
    ///
    /// Only writes are mirrored; removals are silent (see
    /// [`Store::remove`]) and do not cross the bridge.
    pub fn bridge(
        &self,
        local_path: impl AsRef<str>,
        remote: &Store,
        remote_path: impl AsRef<str>,
    ) -> BridgeHandle {
        let local_path = PathBuf::normalize(local_path);
        let remote_path = PathBuf::normalize(remote_path);
        let token = Uuid::new_v4().to_string();
        debug!(local = %local_path, remote = %remote_path, token = %token, "bridge established");

        let local = wire(
            self,
            local_path.clone(),
            remote.clone(),
            remote_path.clone(),
            token.clone(),
        );
        let remote = wire(remote, remote_path, self.clone(), local_path, token.clone());

        BridgeHandle {
            local,
            remote,
            token,
        }
    }
}
