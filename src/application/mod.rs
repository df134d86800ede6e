//! Application layer - dashboard read models and producer selection.

pub mod aggregator;
pub mod feed;

pub use aggregator::{AggregatorConfig, DashboardAggregator, DashboardMetrics};
pub use feed::{FeedSubscription, LiveFeed};
