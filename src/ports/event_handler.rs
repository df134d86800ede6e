//! EventHandler port - the subscriber callback contract.
//!
//! Both producers (the live connection manager and the event simulator)
//! deliver the same envelope shape to handlers registered through this
//! trait; a consumer cannot tell the producers apart.

use async_trait::async_trait;

use crate::domain::{EventEnvelope, FeedError};

/// Caller-supplied callback invoked for each delivered envelope.
///
/// Implementations must not block: delivery happens on the producer's
/// dispatch task and a slow handler delays every subscriber behind it in
/// the same stream. Returning an error is logged by the dispatcher and
/// never stops delivery to other handlers.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process one delivered envelope.
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), FeedError>;

    /// Stable name used in dispatch logs.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that the trait is object-safe.
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventHandler) {}

    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn handler_trait_objects_are_send_sync() {
        assert_send_sync::<std::sync::Arc<dyn EventHandler>>();
    }
}
