//! Category-specific event records carried by the feed.
//!
//! One record type per wire category, plus the local-only connection
//! notification. All records are immutable once emitted; the aggregation
//! layer may drop them from its buffers but never rewrites them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{EventCategory, EventId, FeedEvent, Timestamp};

// ============================================
// Transactions
// ============================================

/// The product a purchase event paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Airtime,
    Data,
    WalletFunding,
    Cable,
    Electricity,
}

impl ServiceKind {
    /// Every service the platform sells.
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::Airtime,
        ServiceKind::Data,
        ServiceKind::WalletFunding,
        ServiceKind::Cable,
        ServiceKind::Electricity,
    ];
}

/// Settlement state of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

/// A single top-up purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Unique per event.
    pub id: EventId,
    pub user_id: String,
    pub user_name: String,
    pub service: ServiceKind,
    /// Amount in kobo (smallest currency unit); always positive.
    pub amount: u64,
    pub status: TransactionStatus,
    /// Carrier label for airtime/data purchases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl FeedEvent for TransactionEvent {
    const CATEGORY: EventCategory = EventCategory::Transaction;
}

// ============================================
// User activity
// ============================================

/// What a user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Login,
    Logout,
    Transaction,
    ProfileUpdate,
}

impl ActivityAction {
    /// Every action the activity stream reports.
    pub const ALL: [ActivityAction; 4] = [
        ActivityAction::Login,
        ActivityAction::Logout,
        ActivityAction::Transaction,
        ActivityAction::ProfileUpdate,
    ];
}

/// A user doing something on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserActivityEvent {
    pub user_id: String,
    pub user_name: String,
    pub action: ActivityAction,
    pub occurred_at: Timestamp,
    /// Free-form context blob; shape is action-specific and optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<JsonValue>,
}

impl FeedEvent for UserActivityEvent {
    const CATEGORY: EventCategory = EventCategory::UserActivity;
}

// ============================================
// System alerts
// ============================================

/// Display class of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Error,
    Warning,
    Info,
    Success,
}

/// Operational urgency of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

/// An operational notice from some platform component.
///
/// Consumers may dismiss an alert from their local view; the event itself
/// is never mutated or retracted upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemAlertEvent {
    pub id: EventId,
    pub severity: AlertSeverity,
    pub message: String,
    /// Originating component label, e.g. "payment-gateway".
    pub component: String,
    pub priority: AlertPriority,
}

impl FeedEvent for SystemAlertEvent {
    const CATEGORY: EventCategory = EventCategory::SystemAlert;
}

// ============================================
// Revenue snapshots
// ============================================

/// Point-in-time revenue figures, all in kobo.
///
/// Each snapshot is independent and replaces the previous one; it is not a
/// delta and is not derived from the transaction stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RevenueSnapshot {
    pub total_revenue: u64,
    pub today_revenue: u64,
    pub month_revenue: u64,
    pub transaction_count: u64,
    pub average_transaction: u64,
}

impl FeedEvent for RevenueSnapshot {
    const CATEGORY: EventCategory = EventCategory::RevenueUpdate;
}

// ============================================
// User registrations
// ============================================

/// A new account on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRegistrationEvent {
    pub user_id: String,
    pub user_name: String,
    pub registered_at: Timestamp,
}

impl FeedEvent for UserRegistrationEvent {
    const CATEGORY: EventCategory = EventCategory::UserRegistration;
}

// ============================================
// Connection notifications (synthetic)
// ============================================

/// Lifecycle state of the managed connection.
///
/// Owned exclusively by the connection manager; observers receive read-only
/// notifications on the synthetic `connection` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    /// Orthogonal failure notification, not a sink state: the manager keeps
    /// retrying (within budget) after reporting it.
    Error,
}

/// Read-only state-change notification delivered on the `connection` category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionNotice {
    pub state: ConnectionState,
    /// Consecutive failed connect attempts since the last successful open.
    pub attempt: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FeedEvent for ConnectionNotice {
    const CATEGORY: EventCategory = EventCategory::Connection;
}
