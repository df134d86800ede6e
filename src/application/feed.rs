//! Producer selection: live connection or simulator.
//!
//! The consuming layer does not decide per call site which producer to
//! talk to; it builds a [`LiveFeed`] from configuration once and uses the
//! shared surface. A configured server URL selects the live connection
//! manager; absence of configuration is itself meaningful and selects the
//! simulator.

use std::sync::Arc;

use crate::adapters::{ConnectionManager, EventSimulator};
use crate::config::FeedConfig;
use crate::domain::{ClientId, EventCategory, SubscriptionId};
use crate::ports::EventHandler;

/// Handle for a handler attached through [`LiveFeed::attach`].
///
/// Opaque; pass it back to [`LiveFeed::detach`] to stop delivery.
#[derive(Debug)]
pub enum FeedSubscription {
    Live(Vec<(EventCategory, SubscriptionId)>),
    Simulated(ClientId),
}

/// The active producer behind the dashboard.
///
/// Both variants emit identically shaped envelopes; everything downstream
/// of [`attach`](Self::attach) is producer-agnostic.
pub enum LiveFeed {
    Live(ConnectionManager),
    Simulated(EventSimulator),
}

impl LiveFeed {
    /// Builds the producer the configuration selects.
    pub fn from_config(config: &FeedConfig) -> Self {
        match &config.server_url {
            Some(url) => {
                tracing::info!(%url, "starting live feed connection");
                LiveFeed::Live(ConnectionManager::with_policy(
                    url.clone(),
                    config.reconnect_policy(),
                ))
            }
            None => {
                tracing::info!("no feed server configured, starting event simulator");
                LiveFeed::Simulated(EventSimulator::with_config(config.simulator_config()))
            }
        }
    }

    /// Attaches a handler to every category the active producer emits.
    pub fn attach(&self, handler: Arc<dyn EventHandler>) -> FeedSubscription {
        match self {
            LiveFeed::Live(manager) => FeedSubscription::Live(
                EventCategory::ALL
                    .iter()
                    .map(|category| (*category, manager.on(*category, handler.clone())))
                    .collect(),
            ),
            LiveFeed::Simulated(simulator) => {
                FeedSubscription::Simulated(simulator.add_client(handler))
            }
        }
    }

    /// Detaches a previously attached handler.
    ///
    /// Returns `false` if the subscription does not belong to the active
    /// producer or was already detached.
    pub fn detach(&self, subscription: FeedSubscription) -> bool {
        match (self, subscription) {
            (LiveFeed::Live(manager), FeedSubscription::Live(ids)) => ids
                .into_iter()
                .fold(false, |any, (category, id)| manager.off(category, id) || any),
            (LiveFeed::Simulated(simulator), FeedSubscription::Simulated(id)) => {
                simulator.remove_client(id)
            }
            _ => false,
        }
    }

    /// Tears down the active producer. Idempotent.
    pub fn shutdown(&self) {
        match self {
            LiveFeed::Live(manager) => manager.disconnect(),
            LiveFeed::Simulated(simulator) => simulator.shutdown(),
        }
    }

    /// True when running against the simulator.
    pub fn is_simulated(&self) -> bool {
        matches!(self, LiveFeed::Simulated(_))
    }

    /// The live connection manager, when one is active.
    pub fn manager(&self) -> Option<&ConnectionManager> {
        match self {
            LiveFeed::Live(manager) => Some(manager),
            LiveFeed::Simulated(_) => None,
        }
    }
}
