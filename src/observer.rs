//! Change notification - observers registered against locators
//!
//! A mutation on locator `L` is delivered to every observer whose locator
//! contains `L`: observers of that exact item plus observers of the whole
//! collection. Delivery happens on the mutating thread, after the write.

use crate::locator::Locator;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// What kind of mutation produced a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A notification that the data behind `locator` changed.
///
/// Carries no row data; observers re-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ChangeEvent {
    pub locator: Locator,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(locator: Locator, kind: ChangeKind) -> Self {
        Self { locator, kind }
    }
}

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

struct Observer {
    locator: Locator,
    callback: Callback,
}

#[derive(Default)]
struct Observers {
    next_id: u64,
    entries: BTreeMap<u64, Observer>,
}

/// Registry of observers, shared by the provider and its subscriptions.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<Observers>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for changes at or beneath `locator`.
    ///
    /// The observer stays registered until the returned subscription is
    /// released or dropped.
    pub fn subscribe<F>(&self, locator: Locator, callback: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut observers = self.lock();
        let id = observers.next_id;
        observers.next_id += 1;
        observers.entries.insert(
            id,
            Observer {
                locator,
                callback: Arc::new(callback),
            },
        );
        tracing::trace!("Subscribed observer {} to {}", id, locator);

        Subscription {
            id,
            locator,
            registry: Arc::downgrade(&self.inner),
            released: false,
        }
    }

    /// Register an observer that forwards events into a channel
    pub fn subscribe_channel(
        &self,
        locator: Locator,
    ) -> (Subscription, crossbeam::channel::Receiver<ChangeEvent>) {
        let (tx, rx) = crossbeam::channel::unbounded();
        let subscription = self.subscribe(locator, move |event| {
            // Receiver gone means nobody is listening any more.
            let _ = tx.send(*event);
        });
        (subscription, rx)
    }

    /// Deliver `event` to every observer whose locator contains the event's.
    ///
    /// Callbacks run after the registry lock is released, so they may
    /// subscribe or release freely. Returns the number of observers notified.
    pub fn notify(&self, event: &ChangeEvent) -> usize {
        let targets: Vec<Callback> = self
            .lock()
            .entries
            .values()
            .filter(|observer| observer.locator.contains(&event.locator))
            .map(|observer| Arc::clone(&observer.callback))
            .collect();

        for callback in &targets {
            callback(event);
        }
        tracing::debug!("Notified {} observer(s) of {:?} on {}", targets.len(), event.kind, event.locator);
        targets.len()
    }

    /// Number of live observers
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Observers> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A registered observer. Released exactly once: by `release` or on drop.
pub struct Subscription {
    id: u64,
    locator: Locator,
    registry: Weak<Mutex<Observers>>,
    released: bool,
}

impl Subscription {
    /// Locator this subscription watches
    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Unregister the observer.
    ///
    /// Returns `false` if the registry no longer exists.
    pub fn release(mut self) -> bool {
        self.detach()
    }

    fn detach(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(&self.id)
            .is_some();
        tracing::trace!("Released observer {} on {}", self.id, self.locator);
        removed
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("locator", &self.locator)
            .field("released", &self.released)
            .finish()
    }
}
