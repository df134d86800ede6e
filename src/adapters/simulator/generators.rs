//! Payload factories for the event simulator.
//!
//! Each factory owns its distribution tables and draws from a sample pool
//! of users, carriers and components, so generated traffic reads like the
//! live platform's without touching any real account.

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use crate::domain::{
    ActivityAction, AlertPriority, AlertSeverity, EventId, RevenueSnapshot, ServiceKind,
    SystemAlertEvent, Timestamp, TransactionEvent, TransactionStatus, UserActivityEvent,
};

use super::weighted::WeightedChoice;

/// (user_id, display name) pool shared by every generator.
const SAMPLE_USERS: &[(&str, &str)] = &[
    ("usr-1043", "Adaeze Obi"),
    ("usr-2210", "Tunde Alabi"),
    ("usr-3307", "Chiamaka Eze"),
    ("usr-4118", "Ibrahim Musa"),
    ("usr-5521", "Funke Adeyemi"),
    ("usr-6634", "Emeka Nwosu"),
    ("usr-7789", "Hauwa Bello"),
    ("usr-8852", "Segun Okafor"),
];

const NETWORKS: &[&str] = &["MTN", "Airtel", "Glo", "9mobile"];

/// (component, message) pool for system alerts.
const ALERT_CATALOG: &[(&str, &str)] = &[
    ("payment-gateway", "Settlement batch delayed beyond threshold"),
    ("wallet-service", "Wallet balance reconciliation drift detected"),
    ("airtime-provider", "Provider response times degraded"),
    ("electricity-provider", "Token vending endpoint returned errors"),
    ("auth-service", "Elevated login failure rate"),
    ("database", "Replica lag above alerting threshold"),
];

fn sample_user(rng: &mut impl Rng) -> (&'static str, &'static str) {
    *SAMPLE_USERS
        .choose(rng)
        .expect("sample user pool is non-empty")
}

/// Builds purchase events with the platform's observed status mix.
pub struct TransactionFactory {
    status: WeightedChoice<TransactionStatus>,
    amount_range: (u64, u64),
}

impl TransactionFactory {
    /// Status mix: 80% completed, 15% pending, 5% failed.
    pub fn new(amount_range: (u64, u64)) -> Self {
        let status = WeightedChoice::new([
            (TransactionStatus::Completed, 80),
            (TransactionStatus::Pending, 15),
            (TransactionStatus::Failed, 5),
        ])
        .expect("static status weight table is valid");
        Self {
            status,
            amount_range,
        }
    }

    pub fn make(&self, rng: &mut impl Rng) -> TransactionEvent {
        let (user_id, user_name) = sample_user(rng);
        let service = *ServiceKind::ALL
            .choose(rng)
            .expect("service pool is non-empty");
        let (min, max) = self.amount_range;

        // Carrier and phone only make sense for airtime and data top-ups.
        let telco = matches!(service, ServiceKind::Airtime | ServiceKind::Data);
        let network = telco.then(|| {
            NETWORKS
                .choose(rng)
                .expect("network pool is non-empty")
                .to_string()
        });
        let phone = telco.then(|| format!("+23480{:08}", rng.gen_range(0..100_000_000u64)));

        TransactionEvent {
            id: EventId::new(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
            service,
            amount: rng.gen_range(min..=max),
            status: *self.status.sample(rng),
            network,
            phone,
        }
    }
}

/// Builds user activity events with a uniform action mix.
pub fn random_activity(rng: &mut impl Rng) -> UserActivityEvent {
    let (user_id, user_name) = sample_user(rng);
    let action = *ActivityAction::ALL
        .choose(rng)
        .expect("action pool is non-empty");

    let detail = match action {
        ActivityAction::Login | ActivityAction::Logout => {
            let channel = if rng.gen_bool(0.7) { "mobile" } else { "web" };
            Some(json!({ "channel": channel }))
        }
        _ => None,
    };

    UserActivityEvent {
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        action,
        occurred_at: Timestamp::now(),
        detail,
    }
}

/// Builds an independent random revenue snapshot.
///
/// Deliberately not derived from the generated transaction stream; each
/// snapshot stands alone.
pub fn random_revenue(rng: &mut impl Rng) -> RevenueSnapshot {
    let total_revenue = rng.gen_range(50_000_000..=500_000_000u64);
    let transaction_count = rng.gen_range(200..=5_000u64);
    RevenueSnapshot {
        total_revenue,
        today_revenue: rng.gen_range(500_000..=10_000_000u64),
        month_revenue: rng.gen_range(10_000_000..=80_000_000u64),
        transaction_count,
        average_transaction: total_revenue / transaction_count,
    }
}

/// Builds system alerts, most ticks producing nothing.
pub struct AlertFactory {
    priority: WeightedChoice<AlertPriority>,
    probability: f64,
}

impl AlertFactory {
    /// Priority mix: 50% low, 30% medium, 15% high, 5% critical, emitted
    /// with the given per-tick probability.
    pub fn new(probability: f64) -> Self {
        let priority = WeightedChoice::new([
            (AlertPriority::Low, 50),
            (AlertPriority::Medium, 30),
            (AlertPriority::High, 15),
            (AlertPriority::Critical, 5),
        ])
        .expect("static priority weight table is valid");
        Self {
            priority,
            probability,
        }
    }

    pub fn make(&self, rng: &mut impl Rng) -> Option<SystemAlertEvent> {
        if !rng.gen_bool(self.probability) {
            return None;
        }

        let priority = *self.priority.sample(rng);
        let (component, message) = *ALERT_CATALOG
            .choose(rng)
            .expect("alert catalog is non-empty");

        Some(SystemAlertEvent {
            id: EventId::new(),
            severity: severity_for(priority),
            message: message.to_string(),
            component: component.to_string(),
            priority,
        })
    }
}

/// Display severity implied by operational priority.
fn severity_for(priority: AlertPriority) -> AlertSeverity {
    match priority {
        AlertPriority::Low => AlertSeverity::Info,
        AlertPriority::Medium | AlertPriority::High => AlertSeverity::Warning,
        AlertPriority::Critical => AlertSeverity::Error,
    }
}
