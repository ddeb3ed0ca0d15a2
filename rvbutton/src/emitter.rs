//! Typed publish/subscribe register.
//!
//! Each event name type declares what its handlers return. Publishing calls
//! every handler registered for the event, in registration order, and hands
//! back their return values so callers can await them.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// An enumerated set of event names sharing one handler signature.
pub trait EventName: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Value returned by every handler of this event set.
    type Output: Send + 'static;
}

/// A registered handler. Identity (for unsubscribing) is the allocation.
pub type Handler<E> = Arc<dyn Fn() -> <E as EventName>::Output + Send + Sync>;

type Registry<E> = Mutex<HashMap<E, Vec<Handler<E>>>>;

fn lock<E: EventName>(registry: &Registry<E>) -> MutexGuard<'_, HashMap<E, Vec<Handler<E>>>> {
    registry
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Emitter<E: EventName> {
    handlers: Arc<Registry<E>>,
}

impl<E: EventName> Default for Emitter<E> {
    fn default() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<E: EventName> fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<E, usize> = lock(&self.handlers)
            .iter()
            .map(|(event, handlers)| (*event, handlers.len()))
            .collect();
        f.debug_struct("Emitter").field("handlers", &counts).finish()
    }
}

impl<E: EventName> Emitter<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Registering the same handler twice makes it run
    /// twice per publish.
    pub fn subscribe(&self, event: E, handler: Handler<E>) -> Subscription<E> {
        lock(&self.handlers)
            .entry(event)
            .or_default()
            .push(handler.clone());

        Subscription {
            registry: Arc::downgrade(&self.handlers),
            event,
            handler,
        }
    }

    /// Register a closure.
    pub fn on<F>(&self, event: E, handler: F) -> Subscription<E>
    where
        F: Fn() -> E::Output + Send + Sync + 'static,
    {
        self.subscribe(event, Arc::new(handler))
    }

    /// Call every handler registered for `event` and collect the results.
    ///
    /// Handlers run against a snapshot taken on entry: handlers added or
    /// removed while publishing take effect from the next publish.
    pub fn publish(&self, event: E) -> Vec<E::Output> {
        let snapshot: Vec<Handler<E>> = lock(&self.handlers)
            .get(&event)
            .cloned()
            .unwrap_or_default();

        log::trace!("[emitter] {:?} -> {} handlers", event, snapshot.len());
        snapshot.iter().map(|handler| handler()).collect()
    }

    pub fn listener_count(&self, event: E) -> usize {
        lock(&self.handlers).get(&event).map_or(0, Vec::len)
    }
}

/// Handle returned by [`Emitter::subscribe`].
///
/// Dropping it keeps the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<E: EventName> {
    registry: Weak<Registry<E>>,
    event: E,
    handler: Handler<E>,
}

impl<E: EventName> fmt::Debug for Subscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

impl<E: EventName> Subscription<E> {
    pub fn event(&self) -> E {
        self.event
    }

    /// Remove every registration of this handler for this event.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Some(handlers) = lock(&registry).get_mut(&self.event) {
            handlers.retain(|h| !Arc::ptr_eq(h, &self.handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Ping {
        A,
        B,
    }

    impl EventName for Ping {
        type Output = u32;
    }

    #[test]
    fn test_publish_collects_in_registration_order() {
        let emitter = Emitter::<Ping>::new();
        emitter.on(Ping::A, || 1);
        emitter.on(Ping::A, || 2);
        emitter.on(Ping::B, || 3);

        assert_eq!(emitter.publish(Ping::A), vec![1, 2]);
        assert_eq!(emitter.publish(Ping::B), vec![3]);
    }

    #[test]
    fn test_publish_without_handlers_is_empty() {
        let emitter = Emitter::<Ping>::new();
        assert!(emitter.publish(Ping::A).is_empty());
        assert_eq!(emitter.listener_count(Ping::A), 0);
    }

    #[test]
    fn test_same_handler_twice_runs_twice_and_unsubscribes_both() {
        let emitter = Emitter::<Ping>::new();
        let handler: Handler<Ping> = Arc::new(|| 7);

        let first = emitter.subscribe(Ping::A, handler.clone());
        let _second = emitter.subscribe(Ping::A, handler);
        emitter.on(Ping::A, || 8);
        assert_eq!(emitter.publish(Ping::A), vec![7, 7, 8]);

        first.unsubscribe();
        assert_eq!(emitter.publish(Ping::A), vec![8]);
    }

    #[test]
    fn test_unsubscribe_only_touches_its_event() {
        let emitter = Emitter::<Ping>::new();
        let handler: Handler<Ping> = Arc::new(|| 1);
        let sub = emitter.subscribe(Ping::A, handler.clone());
        emitter.subscribe(Ping::B, handler);

        sub.unsubscribe();
        assert_eq!(emitter.listener_count(Ping::A), 0);
        assert_eq!(emitter.listener_count(Ping::B), 1);
    }

    #[test]
    fn test_handler_added_during_publish_waits_for_next_publish() {
        let emitter = Arc::new(Emitter::<Ping>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_emitter = Arc::downgrade(&emitter);
        let inner_calls = calls.clone();
        emitter.on(Ping::A, move || {
            if let Some(emitter) = inner_emitter.upgrade() {
                let c = inner_calls.clone();
                emitter.on(Ping::A, move || {
                    c.fetch_add(1, Ordering::SeqCst);
                    0
                });
            }
            0
        });

        assert_eq!(emitter.publish(Ping::A).len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(emitter.publish(Ping::A).len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_after_emitter_dropped_is_harmless() {
        let emitter = Emitter::<Ping>::new();
        let sub = emitter.on(Ping::B, || 0);
        drop(emitter);
        sub.unsubscribe();
    }
}
