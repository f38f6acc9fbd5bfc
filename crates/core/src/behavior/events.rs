//! Typed observer registry for recorder notifications

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use wayfare_domain::PatternAnalysis;

/// Events published by the behavior recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorEvent {
    /// Re-analysis produced a fresh [`PatternAnalysis`]
    PatternsUpdated,
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&PatternAnalysis) + Send + Sync>;

struct Registration {
    event: BehaviorEvent,
    id: SubscriptionId,
    handler: Handler,
}

/// Callback list keyed by [`BehaviorEvent`]
#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl ObserverRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, event: BehaviorEvent, handler: F) -> SubscriptionId
    where
        F: Fn(&PatternAnalysis) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration { event, id, handler: Arc::new(handler) });
        id
    }

    /// Remove a handler. Unknown ids are ignored; returns whether one was
    /// removed.
    pub fn unsubscribe(&self, event: BehaviorEvent, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|reg| !(reg.event == event && reg.id == id));
        registrations.len() != before
    }

    /// Invoke every handler registered for `event`, in registration order.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// subscribe or unsubscribe.
    pub fn notify(&self, event: BehaviorEvent, analysis: &PatternAnalysis) {
        let handlers: Vec<Handler> = self
            .registrations
            .lock()
            .iter()
            .filter(|reg| reg.event == event)
            .map(|reg| Arc::clone(&reg.handler))
            .collect();

        for handler in handlers {
            handler(analysis);
        }
    }

    /// Number of handlers registered for `event`
    #[must_use]
    pub fn len(&self, event: BehaviorEvent) -> usize {
        self.registrations.lock().iter().filter(|reg| reg.event == event).count()
    }

    #[must_use]
    pub fn is_empty(&self, event: BehaviorEvent) -> bool {
        self.len(event) == 0
    }
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("registrations", &self.registrations.lock().len())
            .finish()
    }
}
