//! VTU Pulse - real-time dashboard feed core for the top-up platform.
//!
//! Two interchangeable producers push typed event envelopes to
//! subscribers: a websocket [`ConnectionManager`](adapters::ConnectionManager)
//! with bounded reconnection for live deployments, and a timer-driven
//! [`EventSimulator`](adapters::EventSimulator) when no server is
//! configured. The application layer turns either stream into bounded,
//! render-ready dashboard state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
