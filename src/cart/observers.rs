//! Cart change subscriptions.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::cart::CartItem;

new_key_type! {
    /// Handle returned by [`CartStore::subscribe`](crate::cart::CartStore::subscribe).
    pub struct SubscriptionKey;
}

pub(super) type Listener = Arc<dyn Fn(&[CartItem]) + Send + Sync>;

/// Listeners notified after every cart mutation.
#[derive(Default)]
pub(super) struct Observers {
    listeners: Mutex<SlotMap<SubscriptionKey, Listener>>,
}

impl Observers {
    pub(super) fn subscribe(&self, listener: Listener) -> SubscriptionKey {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(listener)
    }

    pub(super) fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub(super) fn notify(&self, items: &[CartItem]) {
        // Snapshot first so a listener may (un)subscribe without deadlocking.
        let listeners: SmallVec<[Listener; 4]> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        for listener in listeners {
            listener(items);
        }
    }

    fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}
