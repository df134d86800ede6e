//! Adapters - concrete producers and the subscriber registry.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  ConnectionManager   │      │    EventSimulator    │
//! │  (live websocket)    │      │  (randomized timers) │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │  EventEnvelope              │  EventEnvelope
//!            ▼                             ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  SubscriberRegistry  │      │   client broadcast   │
//! │  (per-category)      │      │   (every client)     │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            └──────────────┬──────────────┘
//!                           ▼
//!                 application layer (aggregator)
//! ```
//!
//! Exactly one producer is active per feed instance; both deliver the same
//! envelope shape, so consumers cannot tell them apart.

pub mod connection;
pub mod registry;
pub mod simulator;

pub use connection::{ClientMessage, ConnectionManager, FeedStats, ReconnectPolicy, SendOutcome};
pub use registry::SubscriberRegistry;
pub use simulator::{EventSimulator, SimulatorConfig, WeightedChoice};
