//! Timer-driven event simulator.
//!
//! Four independent generator tasks - transactions, user activity, revenue
//! snapshots, system alerts - each draw their own delays and broadcast to
//! every registered client. There is no shared tick: correlated, bursty
//! output would look synthetic on the dashboard.
//!
//! Ordering is FIFO within one generator's stream only; across generators
//! there is no guarantee, and consumers must not assume one.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;

use crate::domain::{ClientId, EventEnvelope, FeedEvent};
use crate::ports::EventHandler;

use super::generators::{random_activity, random_revenue, AlertFactory, TransactionFactory};
use super::schedule::Schedule;

/// Tunable cadences and ranges for the generator tasks.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Uniform delay bounds between purchase events.
    pub transaction_interval: (Duration, Duration),

    /// Uniform delay bounds between activity events.
    pub activity_interval: (Duration, Duration),

    /// Fixed cadence of revenue snapshots.
    pub revenue_interval: Duration,

    /// Fixed cadence of alert ticks; most ticks emit nothing.
    pub alert_interval: Duration,

    /// Probability that an alert tick emits an alert.
    pub alert_probability: f64,

    /// Bounds for generated purchase amounts, in kobo.
    pub amount_range: (u64, u64),

    /// Base RNG seed; `None` seeds from entropy. Each generator derives its
    /// own stream from this, so a fixed seed makes a run reproducible.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            transaction_interval: (Duration::from_secs(3), Duration::from_secs(10)),
            activity_interval: (Duration::from_secs(5), Duration::from_secs(15)),
            revenue_interval: Duration::from_secs(15),
            alert_interval: Duration::from_secs(20),
            alert_probability: 0.3,
            amount_range: (5_000, 2_500_000),
            seed: None,
        }
    }
}

type ClientSlot = (ClientId, Arc<dyn EventHandler>);

/// Stand-in data producer used when no feed server is configured.
///
/// Every registered client receives every generated envelope; filtering by
/// category is a consumer concern. Lifetime is caller-managed: pair every
/// construction with a [`shutdown`](Self::shutdown).
pub struct EventSimulator {
    clients: Arc<RwLock<Vec<ClientSlot>>>,
    cancel: CancellationToken,
}

impl EventSimulator {
    /// Starts the four generators with default cadences and an entropy seed.
    pub fn start() -> Self {
        Self::with_config(SimulatorConfig::default())
    }

    /// Starts with default cadences and a fixed seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(SimulatorConfig {
            seed: Some(seed),
            ..SimulatorConfig::default()
        })
    }

    /// Starts the four generator tasks immediately.
    pub fn with_config(config: SimulatorConfig) -> Self {
        let clients: Arc<RwLock<Vec<ClientSlot>>> = Arc::new(RwLock::new(Vec::new()));
        let cancel = CancellationToken::new();

        let transactions = TransactionFactory::new(config.amount_range);
        spawn_generator(
            clients.clone(),
            cancel.clone(),
            Schedule::UniformBetween(config.transaction_interval.0, config.transaction_interval.1),
            rng_for(config.seed, 0),
            move |rng| Some(transactions.make(rng).to_envelope()),
        );

        spawn_generator(
            clients.clone(),
            cancel.clone(),
            Schedule::UniformBetween(config.activity_interval.0, config.activity_interval.1),
            rng_for(config.seed, 1),
            |rng| Some(random_activity(rng).to_envelope()),
        );

        spawn_generator(
            clients.clone(),
            cancel.clone(),
            Schedule::Fixed(config.revenue_interval),
            rng_for(config.seed, 2),
            |rng| Some(random_revenue(rng).to_envelope()),
        );

        let alerts = AlertFactory::new(config.alert_probability);
        spawn_generator(
            clients.clone(),
            cancel.clone(),
            Schedule::Fixed(config.alert_interval),
            rng_for(config.seed, 3),
            move |rng| alerts.make(rng).map(|alert| alert.to_envelope()),
        );

        Self { clients, cancel }
    }

    /// Registers a broadcast target; it will receive every generated
    /// envelope until removed.
    pub fn add_client(&self, handler: Arc<dyn EventHandler>) -> ClientId {
        let id = ClientId::new();
        self.clients
            .write()
            .expect("EventSimulator: clients lock poisoned")
            .push((id, handler));
        id
    }

    /// Removes a broadcast target. Returns `false` if already removed.
    pub fn remove_client(&self, id: ClientId) -> bool {
        let mut clients = self
            .clients
            .write()
            .expect("EventSimulator: clients lock poisoned");
        let before = clients.len();
        clients.retain(|(client_id, _)| *client_id != id);
        clients.len() != before
    }

    /// Number of registered broadcast targets.
    pub fn client_count(&self) -> usize {
        self.clients
            .read()
            .expect("EventSimulator: clients lock poisoned")
            .len()
    }

    /// Cancels all four generators and clears the client registry.
    ///
    /// Idempotent; safe to call any number of times.
    pub fn shutdown(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("event simulator stopped");
        }
        self.cancel.cancel();
        self.clients
            .write()
            .expect("EventSimulator: clients lock poisoned")
            .clear();
    }
}

fn rng_for(seed: Option<u64>, lane: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(lane)),
        None => StdRng::from_entropy(),
    }
}

fn spawn_generator<F>(
    clients: Arc<RwLock<Vec<ClientSlot>>>,
    cancel: CancellationToken,
    schedule: Schedule,
    mut rng: StdRng,
    mut make: F,
) where
    F: FnMut(&mut StdRng) -> Option<EventEnvelope> + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let delay = schedule.next_delay(&mut rng);
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            if let Some(envelope) = make(&mut rng) {
                broadcast(&clients, &envelope).await;
            }
        }
    });
}

/// Delivers one envelope to every live client.
///
/// Same snapshot-then-recheck discipline as the subscriber registry: a
/// client removed mid-broadcast does not receive the in-flight envelope,
/// and one added mid-broadcast does not retroactively receive it.
async fn broadcast(clients: &Arc<RwLock<Vec<ClientSlot>>>, envelope: &EventEnvelope) {
    let snapshot: Vec<ClientSlot> = clients
        .read()
        .expect("EventSimulator: clients lock poisoned")
        .clone();

    for (id, handler) in snapshot {
        let live = clients
            .read()
            .expect("EventSimulator: clients lock poisoned")
            .iter()
            .any(|(client_id, _)| *client_id == id);
        if !live {
            continue;
        }
        if let Err(error) = handler.handle(envelope.clone()).await {
            tracing::warn!(
                handler = handler.name(),
                category = %envelope.category,
                %error,
                "simulator client failed to process envelope"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventCategory, FeedError, TransactionEvent, TransactionStatus};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Counts envelopes per category and keeps the raw stream.
    #[derive(Default)]
    struct RecordingClient {
        envelopes: Mutex<Vec<EventEnvelope>>,
    }

    impl RecordingClient {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn count(&self, category: EventCategory) -> usize {
            self.envelopes
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.category == category)
                .count()
        }

        fn total(&self) -> usize {
            self.envelopes.lock().unwrap().len()
        }

        fn transactions(&self) -> Vec<TransactionEvent> {
            self.envelopes
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.category == EventCategory::Transaction)
                .map(|e| e.decode().unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl EventHandler for RecordingClient {
        async fn handle(&self, envelope: EventEnvelope) -> Result<(), FeedError> {
            self.envelopes.lock().unwrap().push(envelope);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "RecordingClient"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_transaction_arrives_within_eleven_simulated_seconds() {
        let simulator = EventSimulator::with_seed(7);
        let client = RecordingClient::new();
        simulator.add_client(client.clone());

        tokio::time::sleep(Duration::from_secs(11)).await;

        let transactions = client.transactions();
        assert!(!transactions.is_empty(), "no transaction within 11s");
        for event in &transactions {
            assert!(event.amount > 0);
            assert!(matches!(
                event.status,
                TransactionStatus::Completed
                    | TransactionStatus::Pending
                    | TransactionStatus::Failed
            ));
        }

        simulator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn five_minutes_produce_the_expected_cadences() {
        let simulator = EventSimulator::with_seed(99);
        let client = RecordingClient::new();
        simulator.add_client(client.clone());

        tokio::time::sleep(Duration::from_secs(301)).await;

        // Transactions every 3-10s, activity every 5-15s, revenue every 15s,
        // alert ticks every 20s with 30% emission.
        let transactions = client.count(EventCategory::Transaction);
        assert!((30..=101).contains(&transactions), "transactions {transactions}");

        let activities = client.count(EventCategory::UserActivity);
        assert!((20..=61).contains(&activities), "activities {activities}");

        let revenue = client.count(EventCategory::RevenueUpdate);
        assert!((19..=21).contains(&revenue), "revenue {revenue}");

        let alerts = client.count(EventCategory::SystemAlert);
        assert!(alerts <= 15, "alerts {alerts}");

        simulator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn every_client_receives_every_envelope() {
        let simulator = EventSimulator::with_seed(3);
        let first = RecordingClient::new();
        let second = RecordingClient::new();
        simulator.add_client(first.clone());
        simulator.add_client(second.clone());

        tokio::time::sleep(Duration::from_secs(120)).await;

        // Broadcast does no per-category filtering: both clients see the
        // identical stream.
        assert!(first.total() > 0);
        assert_eq!(first.total(), second.total());
        assert!(first.count(EventCategory::Transaction) > 0);
        assert!(first.count(EventCategory::UserActivity) > 0);
        assert!(first.count(EventCategory::RevenueUpdate) > 0);

        simulator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn removed_clients_stop_receiving() {
        let simulator = EventSimulator::with_seed(13);
        let client = RecordingClient::new();
        let id = simulator.add_client(client.clone());

        tokio::time::sleep(Duration::from_secs(60)).await;
        let seen = client.total();
        assert!(seen > 0);

        assert!(simulator.remove_client(id));
        assert!(!simulator.remove_client(id));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(client.total(), seen);

        simulator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_idempotent_and_final() {
        let simulator = EventSimulator::with_seed(29);
        let client = RecordingClient::new();
        simulator.add_client(client.clone());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(client.total() > 0);

        simulator.shutdown();
        simulator.shutdown();
        assert_eq!(simulator.client_count(), 0);

        let seen = client.total();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(client.total(), seen, "emissions after shutdown");
    }
}
