//! Feed configuration.

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::{ReconnectPolicy, SimulatorConfig};
use crate::application::AggregatorConfig;

use super::error::ValidationError;

/// Live feed configuration.
///
/// `server_url` is the single switch between modes: a configured URL
/// selects the live connection manager, absence selects the simulator.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket URL of the feed server (`ws://` or `wss://`).
    ///
    /// Absence is meaningful: it selects simulator mode.
    pub server_url: Option<String>,

    /// Reconnect delay unit in milliseconds; the nth consecutive failure
    /// waits n × this.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Consecutive failures tolerated before the manager gives up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Rolling buffer capacity for transactions.
    #[serde(default = "default_max_transactions")]
    pub max_transactions: usize,

    /// Rolling buffer capacity for user activity.
    #[serde(default = "default_max_activities")]
    pub max_activities: usize,

    /// Rolling buffer capacity for alerts.
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,

    /// Rolling buffer capacity for registrations.
    #[serde(default = "default_max_registrations")]
    pub max_registrations: usize,

    /// Fixed RNG seed for the simulator; unset seeds from entropy.
    pub simulator_seed: Option<u64>,
}

impl FeedConfig {
    /// Reconnect policy for the live connection manager.
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts: self.max_reconnect_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }

    /// Simulator cadences (defaults, plus the configured seed).
    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            seed: self.simulator_seed,
            ..SimulatorConfig::default()
        }
    }

    /// Aggregator buffer capacities.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            max_transactions: self.max_transactions,
            max_activities: self.max_activities,
            max_alerts: self.max_alerts,
            max_registrations: self.max_registrations,
        }
    }

    /// Validate feed configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.server_url {
            if !url.starts_with("ws://") && !url.starts_with("wss://") {
                return Err(ValidationError::InvalidFeedUrl);
            }
        }
        if self.base_delay_ms == 0 {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.max_reconnect_attempts == 0 {
            return Err(ValidationError::InvalidBackoff);
        }
        if self.max_transactions == 0
            || self.max_activities == 0
            || self.max_alerts == 0
            || self.max_registrations == 0
        {
            return Err(ValidationError::InvalidBufferCapacity);
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            base_delay_ms: default_base_delay_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            max_transactions: default_max_transactions(),
            max_activities: default_max_activities(),
            max_alerts: default_max_alerts(),
            max_registrations: default_max_registrations(),
            simulator_seed: None,
        }
    }
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_max_transactions() -> usize {
    50
}

fn default_max_activities() -> usize {
    30
}

fn default_max_alerts() -> usize {
    20
}

fn default_max_registrations() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_simulator_mode() {
        let config = FeedConfig::default();
        assert!(config.server_url.is_none());
        assert!(config.validate().is_ok());

        let policy = config.reconnect_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn non_websocket_url_is_rejected() {
        let config = FeedConfig {
            server_url: Some("https://feed.example.com".to_string()),
            ..FeedConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidFeedUrl)
        ));
    }

    #[test]
    fn wss_url_is_accepted() {
        let config = FeedConfig {
            server_url: Some("wss://feed.example.com/live".to_string()),
            ..FeedConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_backoff_or_capacity_is_rejected() {
        let config = FeedConfig {
            base_delay_ms: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBackoff)
        ));

        let config = FeedConfig {
            max_alerts: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBufferCapacity)
        ));
    }

    #[test]
    fn simulator_seed_flows_through() {
        let config = FeedConfig {
            simulator_seed: Some(42),
            ..FeedConfig::default()
        };
        assert_eq!(config.simulator_config().seed, Some(42));
    }
}
