//! Loading State Store — the observable overlay flags.
//!
//! Holds one [`LoadingSession`] and notifies subscribers synchronously, in
//! registration order, on every write. The store does no validation; any
//! caller may set any field.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use vista_core::prelude::*;
use vista_core::{LoadingPatch, LoadingSession};

use crate::persistence::{completed_initial_load, SessionStorage};

type Callback = Arc<dyn Fn(&LoadingSession) + Send + Sync>;

struct StoreInner {
    session: Mutex<LoadingSession>,
    subscribers: Mutex<Vec<(u64, Callback)>>,
    next_id: AtomicU64,
}

/// Shared handle to the loading state. Cloning shares the same state.
#[derive(Clone)]
pub struct LoadingStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for LoadingStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingStore")
            .field("session", &*self.inner.session.lock())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for LoadingStore {
    fn default() -> Self {
        Self::new(LoadingSession::default())
    }
}

impl LoadingStore {
    pub fn new(initial: LoadingSession) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                session: Mutex::new(initial),
                subscribers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Build the store at process start.
    ///
    /// Reads the splash flag from session storage once; transient overlay
    /// flags always start `false`. An unreadable store counts as a first visit.
    pub fn open(storage: &dyn SessionStorage, key: &str) -> Self {
        let completed = completed_initial_load(storage, key);
        debug!(completed, "Opened loading store");
        Self::new(LoadingSession::starting(completed))
    }

    pub fn read(&self) -> LoadingSession {
        *self.inner.session.lock()
    }

    /// Shallow-merge `patch` and notify subscribers with the merged snapshot.
    pub fn write(&self, patch: LoadingPatch) -> LoadingSession {
        let snapshot = {
            let mut session = self.inner.session.lock();
            session.apply(patch);
            *session
        };
        trace!(?patch, ?snapshot, "Loading store write");

        // Callbacks run outside both locks so they may read or write the store.
        let subscribers: Vec<Callback> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();
        for callback in subscribers {
            callback(&snapshot);
        }

        snapshot
    }

    /// Register a change callback. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingSession) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .push((id, Arc::new(callback)));
        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// Registration handle returned by [`LoadingStore::subscribe`].
#[must_use = "dropping a Subscription unsubscribes it"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemorySessionStorage, DEFAULT_SESSION_KEY};

    #[test]
    fn test_write_merges_fields() {
        let store = LoadingStore::default();
        store.write(LoadingPatch::new().transition(true));
        let snapshot = store.write(LoadingPatch::new().full_screen(true));

        assert!(snapshot.is_transition_loading);
        assert!(snapshot.is_full_screen_loading);
        assert_eq!(store.read(), snapshot);
    }

    #[test]
    fn test_subscribers_called_in_registration_order() {
        let store = LoadingStore::default();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let c1 = calls.clone();
        let _s1 = store.subscribe(move |s| c1.lock().push(("first", s.is_transition_loading)));
        let c2 = calls.clone();
        let _s2 = store.subscribe(move |s| c2.lock().push(("second", s.is_transition_loading)));

        store.write(LoadingPatch::new().transition(true));

        assert_eq!(*calls.lock(), vec![("first", true), ("second", true)]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = LoadingStore::default();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let sub = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.write(LoadingPatch::new().transition(true));
        sub.unsubscribe();
        store.write(LoadingPatch::new().transition(false));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_subscriber_may_write_back() {
        let store = LoadingStore::default();
        let inner = store.clone();
        let _sub = store.subscribe(move |s| {
            if s.is_full_screen_loading && !s.has_completed_initial_load {
                inner.write(LoadingPatch::new().initial_load_completed(true));
            }
        });

        store.write(LoadingPatch::new().full_screen(true));
        assert!(store.read().has_completed_initial_load);
    }

    #[test]
    fn test_open_reads_session_flag() {
        let storage = MemorySessionStorage::new();
        assert!(!LoadingStore::open(&storage, DEFAULT_SESSION_KEY)
            .read()
            .has_completed_initial_load);

        storage.set(DEFAULT_SESSION_KEY, "true").unwrap();
        let store = LoadingStore::open(&storage, DEFAULT_SESSION_KEY);
        let session = store.read();
        assert!(session.has_completed_initial_load);
        assert!(!session.is_any_overlay_visible());
    }
}
