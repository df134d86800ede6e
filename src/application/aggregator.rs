//! Dashboard read models built from the event stream.
//!
//! Consumes envelopes from whichever producer is active - the aggregator
//! cannot tell them apart - and maintains bounded, newest-first rolling
//! buffers per category plus the latest revenue snapshot. Dismissing or
//! clearing alerts is purely local view state; upstream producers are
//! never notified.

use std::collections::VecDeque;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::{
    AlertPriority, ConnectionNotice, EventCategory, EventEnvelope, EventId, FeedError,
    RevenueSnapshot, SystemAlertEvent, TransactionEvent, TransactionStatus, UserActivityEvent,
    UserRegistrationEvent,
};
use crate::ports::EventHandler;

/// Buffer capacities for the rolling views.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub max_transactions: usize,
    pub max_activities: usize,
    pub max_alerts: usize,
    pub max_registrations: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_transactions: 50,
            max_activities: 30,
            max_alerts: 20,
            max_registrations: 20,
        }
    }
}

/// Derived dashboard figures.
///
/// Counters cover everything seen since construction; alert figures cover
/// the current (dismissable) buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DashboardMetrics {
    pub transactions_seen: u64,
    pub completed: u64,
    pub pending: u64,
    pub failed: u64,
    /// `completed / transactions_seen`, or zero before the first event.
    pub completion_rate: f64,
    /// All-time purchase volume in kobo.
    pub total_volume: u64,
    pub active_alerts: usize,
    pub critical_alerts: usize,
}

#[derive(Default)]
struct ViewState {
    transactions: VecDeque<TransactionEvent>,
    activities: VecDeque<UserActivityEvent>,
    alerts: VecDeque<SystemAlertEvent>,
    registrations: VecDeque<UserRegistrationEvent>,
    revenue: Option<RevenueSnapshot>,
    connection: Option<ConnectionNotice>,

    transactions_seen: u64,
    completed: u64,
    pending: u64,
    failed: u64,
    total_volume: u64,
}

/// Bounded rolling view of the live feed, ready for rendering.
///
/// Register it with a producer as an [`EventHandler`]; read it from the UI
/// through the snapshot accessors. Buffers are append-then-truncate: only
/// the newest N entries per category survive (last-writer-wins on
/// capacity, not time-based expiry).
pub struct DashboardAggregator {
    config: AggregatorConfig,
    state: RwLock<ViewState>,
}

impl DashboardAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ViewState::default()),
        }
    }

    /// Newest-first buffered transactions.
    pub fn transactions(&self) -> Vec<TransactionEvent> {
        self.read().transactions.iter().cloned().collect()
    }

    /// Newest-first buffered user activity.
    pub fn activities(&self) -> Vec<UserActivityEvent> {
        self.read().activities.iter().cloned().collect()
    }

    /// Newest-first buffered alerts, minus any dismissed locally.
    pub fn alerts(&self) -> Vec<SystemAlertEvent> {
        self.read().alerts.iter().cloned().collect()
    }

    /// Newest-first buffered registrations.
    pub fn registrations(&self) -> Vec<UserRegistrationEvent> {
        self.read().registrations.iter().cloned().collect()
    }

    /// The latest revenue snapshot; replaced on every update, never
    /// accumulated.
    pub fn latest_revenue(&self) -> Option<RevenueSnapshot> {
        self.read().revenue
    }

    /// The most recent connection notice, if any producer sent one.
    ///
    /// Drives the UI's connection indicator; the simulator never emits
    /// these, so `None` is normal in simulated mode.
    pub fn connection(&self) -> Option<ConnectionNotice> {
        self.read().connection.clone()
    }

    /// Removes one alert from the local buffer only.
    ///
    /// Returns `false` if the alert was not buffered (already dismissed or
    /// rolled out). The producer is not notified.
    pub fn dismiss_alert(&self, id: EventId) -> bool {
        let mut state = self.write();
        let before = state.alerts.len();
        state.alerts.retain(|alert| alert.id != id);
        state.alerts.len() != before
    }

    /// Empties the local alert buffer.
    pub fn clear_alerts(&self) {
        self.write().alerts.clear();
    }

    /// Derived figures for the dashboard header.
    pub fn metrics(&self) -> DashboardMetrics {
        let state = self.read();
        let completion_rate = if state.transactions_seen == 0 {
            0.0
        } else {
            state.completed as f64 / state.transactions_seen as f64
        };
        DashboardMetrics {
            transactions_seen: state.transactions_seen,
            completed: state.completed,
            pending: state.pending,
            failed: state.failed,
            completion_rate,
            total_volume: state.total_volume,
            active_alerts: state.alerts.len(),
            critical_alerts: state
                .alerts
                .iter()
                .filter(|alert| alert.priority == AlertPriority::Critical)
                .count(),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ViewState> {
        self.state
            .read()
            .expect("DashboardAggregator: state lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ViewState> {
        self.state
            .write()
            .expect("DashboardAggregator: state lock poisoned")
    }
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self::new(AggregatorConfig::default())
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, value: T, cap: usize) {
    buffer.push_front(value);
    buffer.truncate(cap);
}

#[async_trait]
impl EventHandler for DashboardAggregator {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), FeedError> {
        let mut state = self.write();
        match envelope.category {
            EventCategory::Transaction => {
                let event: TransactionEvent = envelope.decode()?;
                state.transactions_seen += 1;
                state.total_volume += event.amount;
                match event.status {
                    TransactionStatus::Completed => state.completed += 1,
                    TransactionStatus::Pending => state.pending += 1,
                    TransactionStatus::Failed => state.failed += 1,
                }
                push_bounded(&mut state.transactions, event, self.config.max_transactions);
            }
            EventCategory::UserActivity => {
                let event = envelope.decode()?;
                push_bounded(&mut state.activities, event, self.config.max_activities);
            }
            EventCategory::SystemAlert => {
                let event = envelope.decode()?;
                push_bounded(&mut state.alerts, event, self.config.max_alerts);
            }
            EventCategory::RevenueUpdate => {
                state.revenue = Some(envelope.decode()?);
            }
            EventCategory::UserRegistration => {
                let event = envelope.decode()?;
                push_bounded(&mut state.registrations, event, self.config.max_registrations);
            }
            EventCategory::Connection => {
                state.connection = Some(envelope.decode()?);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "DashboardAggregator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertSeverity, ConnectionState, FeedEvent, ServiceKind};
    use serde_json::json;

    fn transaction(seq: u64, status: TransactionStatus) -> TransactionEvent {
        TransactionEvent {
            id: EventId::new(),
            user_id: format!("usr-{seq}"),
            user_name: "Adaeze Obi".to_string(),
            service: ServiceKind::Airtime,
            amount: 10_000 + seq,
            status,
            network: None,
            phone: None,
        }
    }

    fn alert(priority: AlertPriority) -> SystemAlertEvent {
        SystemAlertEvent {
            id: EventId::new(),
            severity: AlertSeverity::Warning,
            message: "Settlement batch delayed".to_string(),
            component: "payment-gateway".to_string(),
            priority,
        }
    }

    async fn feed(aggregator: &DashboardAggregator, event: &impl FeedEvent) {
        aggregator.handle(event.to_envelope()).await.unwrap();
    }

    #[tokio::test]
    async fn buffers_are_newest_first_and_bounded() {
        let aggregator = DashboardAggregator::new(AggregatorConfig {
            max_transactions: 5,
            ..AggregatorConfig::default()
        });

        for seq in 0..8u64 {
            feed(&aggregator, &transaction(seq, TransactionStatus::Completed)).await;
        }

        let buffered = aggregator.transactions();
        assert_eq!(buffered.len(), 5);
        // Newest first: the last pushed event leads, the oldest three are gone.
        assert_eq!(buffered[0].user_id, "usr-7");
        assert_eq!(buffered[4].user_id, "usr-3");

        // Truncation does not touch the all-time counters.
        assert_eq!(aggregator.metrics().transactions_seen, 8);
    }

    #[tokio::test]
    async fn revenue_snapshot_replaces_instead_of_accumulating() {
        let aggregator = DashboardAggregator::default();

        let first = RevenueSnapshot {
            total_revenue: 100,
            today_revenue: 10,
            month_revenue: 50,
            transaction_count: 4,
            average_transaction: 25,
        };
        let second = RevenueSnapshot {
            total_revenue: 200,
            ..first
        };

        feed(&aggregator, &first).await;
        feed(&aggregator, &second).await;

        assert_eq!(aggregator.latest_revenue().unwrap().total_revenue, 200);
    }

    #[tokio::test]
    async fn dismiss_removes_exactly_one_alert_locally() {
        let aggregator = DashboardAggregator::default();

        let keep = alert(AlertPriority::Low);
        let drop = alert(AlertPriority::High);
        feed(&aggregator, &keep).await;
        feed(&aggregator, &drop).await;

        assert!(aggregator.dismiss_alert(drop.id));
        assert!(!aggregator.dismiss_alert(drop.id));

        let remaining = aggregator.alerts();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn clear_alerts_empties_the_buffer() {
        let aggregator = DashboardAggregator::default();
        feed(&aggregator, &alert(AlertPriority::Low)).await;
        feed(&aggregator, &alert(AlertPriority::Critical)).await;

        aggregator.clear_alerts();
        assert!(aggregator.alerts().is_empty());
        assert_eq!(aggregator.metrics().active_alerts, 0);
    }

    #[tokio::test]
    async fn metrics_track_status_counts_and_volume() {
        let aggregator = DashboardAggregator::default();

        feed(&aggregator, &transaction(1, TransactionStatus::Completed)).await;
        feed(&aggregator, &transaction(2, TransactionStatus::Completed)).await;
        feed(&aggregator, &transaction(3, TransactionStatus::Pending)).await;
        feed(&aggregator, &transaction(4, TransactionStatus::Failed)).await;
        feed(&aggregator, &alert(AlertPriority::Critical)).await;

        let metrics = aggregator.metrics();
        assert_eq!(metrics.transactions_seen, 4);
        assert_eq!(metrics.completed, 2);
        assert_eq!(metrics.pending, 1);
        assert_eq!(metrics.failed, 1);
        assert!((metrics.completion_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(metrics.total_volume, 40_010);
        assert_eq!(metrics.critical_alerts, 1);
    }

    #[tokio::test]
    async fn connection_notices_update_the_indicator() {
        let aggregator = DashboardAggregator::default();
        assert!(aggregator.connection().is_none());

        let notice = ConnectionNotice {
            state: ConnectionState::Connected,
            attempt: 0,
            reason: None,
        };
        feed(&aggregator, &notice).await;

        assert_eq!(
            aggregator.connection().unwrap().state,
            ConnectionState::Connected
        );
    }

    #[tokio::test]
    async fn mismatched_payload_shape_is_an_error_not_a_panic() {
        let aggregator = DashboardAggregator::default();
        let envelope = EventEnvelope::new(EventCategory::Transaction, &json!({"bogus": true}));

        assert!(aggregator.handle(envelope).await.is_err());
        assert!(aggregator.transactions().is_empty());
        assert_eq!(aggregator.metrics().transactions_seen, 0);
    }
}
