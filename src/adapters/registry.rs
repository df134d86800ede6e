//! Per-category subscriber registry.
//!
//! An explicit publish/subscribe component owning a category-to-handler-set
//! mapping, constructed and torn down with its producer; no ambient or
//! global state.
//!
//! # Re-entrancy
//!
//! Handlers may subscribe or unsubscribe (themselves or others) from inside
//! their own callback. Dispatch iterates a snapshot taken when the envelope
//! arrives but re-checks membership immediately before each call, so a
//! handler removed mid-broadcast does not receive the in-flight envelope
//! and a handler added mid-broadcast does not retroactively receive it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::{EventCategory, EventEnvelope, SubscriptionId};
use crate::ports::EventHandler;

type HandlerSlot = (SubscriptionId, Arc<dyn EventHandler>);

/// Category-to-handler-set mapping owned by a single producer instance.
///
/// Registration order is preserved per category, but delivery order across
/// handlers is not part of the contract.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned, which only happens after
/// a handler panicked while the registry was mid-mutation.
pub struct SubscriberRegistry {
    handlers: RwLock<HashMap<EventCategory, Vec<HandlerSlot>>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for one category.
    ///
    /// Returns the handle that [`unsubscribe`](Self::unsubscribe) takes to
    /// remove exactly this registration. The registry holds a reference to
    /// the handler, never ownership of subscriber-side state.
    pub fn subscribe(
        &self,
        category: EventCategory,
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.handlers
            .write()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .entry(category)
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes a registration.
    ///
    /// Returns `false` if the handle was already removed or never belonged
    /// to this category.
    pub fn unsubscribe(&self, category: EventCategory, id: SubscriptionId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .expect("SubscriberRegistry: handlers lock poisoned");
        match handlers.get_mut(&category) {
            Some(slots) => {
                let before = slots.len();
                slots.retain(|(slot_id, _)| *slot_id != id);
                slots.len() != before
            }
            None => false,
        }
    }

    /// Number of live registrations for a category.
    pub fn subscriber_count(&self, category: EventCategory) -> usize {
        self.handlers
            .read()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .get(&category)
            .map(|slots| slots.len())
            .unwrap_or(0)
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.handlers
            .write()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .clear();
    }

    /// Delivers an envelope to every live subscriber of its category.
    ///
    /// Handler failures are logged and do not stop delivery to the
    /// remaining subscribers.
    pub async fn dispatch(&self, envelope: &EventEnvelope) {
        // Snapshot under the lock, call with the lock released: handlers may
        // re-enter the registry from their own callback.
        let snapshot: Vec<HandlerSlot> = {
            let handlers = self
                .handlers
                .read()
                .expect("SubscriberRegistry: handlers lock poisoned");
            handlers.get(&envelope.category).cloned().unwrap_or_default()
        };

        for (id, handler) in snapshot {
            if !self.is_subscribed(envelope.category, id) {
                continue;
            }
            if let Err(error) = handler.handle(envelope.clone()).await {
                tracing::warn!(
                    handler = handler.name(),
                    category = %envelope.category,
                    %error,
                    "subscriber failed to process envelope"
                );
            }
        }
    }

    fn is_subscribed(&self, category: EventCategory, id: SubscriptionId) -> bool {
        self.handlers
            .read()
            .expect("SubscriberRegistry: handlers lock poisoned")
            .get(&category)
            .map(|slots| slots.iter().any(|(slot_id, _)| *slot_id == id))
            .unwrap_or(false)
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
