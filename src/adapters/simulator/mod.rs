//! Stand-in event producer used when no feed server is configured.
//!
//! Manufactures plausible domain events on independent randomized timers
//! and broadcasts them to registered clients through the same envelope
//! shape the live connection manager delivers.
//!
//! # Components
//!
//! - [`simulator`] - the simulator and its generator tasks
//! - [`generators`] - payload factories and their sample data pools
//! - [`schedule`] - per-generator delay distributions
//! - [`weighted`] - declarative weighted random selection

pub mod generators;
pub mod schedule;
pub mod simulator;
pub mod weighted;

pub use schedule::Schedule;
pub use simulator::{EventSimulator, SimulatorConfig};
pub use weighted::WeightedChoice;
