use crate::state::ProjectState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Callback invoked with the state just persisted. Subscribers must treat it
/// as read-only; mutations go back through the store.
pub type Subscriber = Arc<dyn Fn(&ProjectState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Synchronous publish/subscribe for state changes. Delivery order between
/// subscribers is unspecified.
#[derive(Default)]
pub struct ChangeBus {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&ProjectState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.len();
        subs.retain(|(sid, _)| *sid != id);
        subs.len() < before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `state` to every subscriber. Returns the number notified.
    ///
    /// The subscriber list is snapshotted first, so callbacks may subscribe,
    /// unsubscribe, or save back into the store.
    pub fn publish(&self, state: &ProjectState) -> usize {
        let snapshot: Vec<Subscriber> = self.lock().iter().map(|(_, s)| s.clone()).collect();
        for subscriber in &snapshot {
            subscriber(state);
        }
        snapshot.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Subscriber)>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn publish_reaches_every_subscriber() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = hits.clone();
            bus.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(bus.publish(&ProjectState::new(None)), 3);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
        bus.publish(&ProjectState::new(None));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscriber_can_subscribe_during_publish() {
        let bus = Arc::new(ChangeBus::new());
        let inner = bus.clone();
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });
        assert_eq!(bus.publish(&ProjectState::new(None)), 1);
        assert_eq!(bus.len(), 2);
    }
}
