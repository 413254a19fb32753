//! Traversal control: cancellation tokens and the registry of active traversals.
//!
//! The control surface registers one [`TraversalControl`] per feed item it
//! starts; both traversal loops poll the token at their checkpoints. Stopping
//! an item sets the flag and drops the registry entry.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::dom::NodeKey;

/// Cancellation flag plus running/idle state for one item traversal.
#[derive(Debug, Default)]
pub struct TraversalControl {
    cancelled: AtomicBool,
    running: AtomicBool,
}

impl TraversalControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Item key -> control of its active traversal. Entries are inserted on start
/// and removed on stop or completion.
#[derive(Default)]
pub struct ControlRegistry {
    active: RwLock<HashMap<NodeKey, Arc<TraversalControl>>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh control for `key` and return it. Replaces (and cancels)
    /// any previous entry for the same key.
    pub fn register(&self, key: NodeKey) -> Arc<TraversalControl> {
        let control = Arc::new(TraversalControl::new());
        control.set_running(true);
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&control));
        if let Some(old) = previous {
            old.cancel();
            old.set_running(false);
        }
        control
    }

    pub fn get(&self, key: NodeKey) -> Option<Arc<TraversalControl>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    pub fn is_active(&self, key: NodeKey) -> bool {
        self.get(key).is_some()
    }

    /// Cancel and remove the entry for `key`. Returns false if none was active.
    pub fn request_stop(&self, key: NodeKey) -> bool {
        let removed = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        match removed {
            Some(control) => {
                control.cancel();
                control.set_running(false);
                true
            }
            None => false,
        }
    }

    /// Remove the entry for `key` only if it is still `control` (a newer
    /// traversal may have replaced it). Returns true if it was removed.
    pub fn unregister_if_current(&self, key: NodeKey, control: &Arc<TraversalControl>) -> bool {
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let current = active.get(&key).is_some_and(|c| Arc::ptr_eq(c, control));
        if current {
            active.remove(&key);
            control.set_running(false);
        }
        current
    }

    /// Cancel every active traversal. Returns the keys that were stopped.
    pub fn request_stop_all(&self) -> Vec<NodeKey> {
        let drained: Vec<(NodeKey, Arc<TraversalControl>)> = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        drained
            .into_iter()
            .map(|(key, control)| {
                control.cancel();
                control.set_running(false);
                key
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Default path for the control socket: `~/.local/state/feedgrab/control.sock`.
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    xdg::BaseDirectories::with_prefix("feedgrab")?.place_state_file("control.sock")
}
