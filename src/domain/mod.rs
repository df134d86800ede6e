//! Domain types for the live feed: event payloads, the transport envelope,
//! identifier value objects and feed-level errors.
//!
//! Everything in this module is immutable once constructed. Producers build
//! events, wrap them in an [`EventEnvelope`] and hand them to subscribers;
//! nothing downstream ever mutates a delivered event.

mod envelope;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use envelope::{EventCategory, EventEnvelope, FeedEvent};
pub use errors::FeedError;
pub use events::{
    ActivityAction, AlertPriority, AlertSeverity, ConnectionNotice, ConnectionState,
    RevenueSnapshot, ServiceKind, SystemAlertEvent, TransactionEvent, TransactionStatus,
    UserActivityEvent, UserRegistrationEvent,
};
pub use ids::{ClientId, EventId, SubscriptionId};
pub use timestamp::Timestamp;
