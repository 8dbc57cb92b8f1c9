#![forbid(unsafe_code)]

//! "History changed" broadcast.
//!
//! [`ChangeNotifier`] carries a single zero-payload event. Observers register
//! a callback and get back a [`Subscription`] guard; dropping the guard
//! unsubscribes. Callbacks fire in registration order after every mutating
//! history call.
//!
//! # Design
//!
//! Subscribers are stored as `Weak` references to `Arc` callbacks owned by the
//! guards, so a forgotten observer cannot keep itself alive through the
//! notifier. Dead entries are pruned lazily on the next [`notify`].
//!
//! The history may live on a host thread, so callbacks are `Send + Sync` and
//! the subscriber list sits behind a `Mutex`. The lock is released before any
//! callback runs, which makes subscribing from inside a callback safe.
//!
//! [`notify`]: ChangeNotifier::notify

use std::sync::{Arc, Mutex, PoisonError, Weak};

type CallbackArc = Arc<dyn Fn() + Send + Sync>;
type CallbackWeak = Weak<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct NotifierInner {
    version: u64,
    subscribers: Vec<CallbackWeak>,
}

/// Zero-payload change broadcaster with a version counter.
///
/// Cloning a `ChangeNotifier` yields another handle to the same subscriber
/// list and counter.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each [`notify`](Self::notify).
/// 2. Live subscribers are called in registration order.
/// 3. Dropped [`Subscription`]s are never called again.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<Mutex<NotifierInner>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ChangeNotifier")
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` to run on every change.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let strong: CallbackArc = Arc::new(callback);
        self.lock().subscribers.push(Arc::downgrade(&strong));
        Subscription { _guard: strong }
    }

    /// Bump the version and call every live subscriber.
    pub fn notify(&self) {
        let callbacks: Vec<CallbackArc> = {
            let mut inner = self.lock();
            inner.version += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        tracing::trace!(
            target: "retrace.history",
            subscribers = callbacks.len(),
            "history changed"
        );

        for cb in &callbacks {
            cb();
        }
    }

    /// Number of notifications sent so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NotifierInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII guard for a change callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: CallbackArc,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
