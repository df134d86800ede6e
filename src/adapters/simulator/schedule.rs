//! Per-generator delay distributions.

use rand::Rng;
use std::time::Duration;

/// How long a generator waits between emissions.
///
/// Each generator draws a fresh delay every cycle, so independent
/// generators drift apart instead of producing bursty, correlated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// The same delay every cycle.
    Fixed(Duration),

    /// A uniformly random delay per cycle, inclusive of both bounds.
    UniformBetween(Duration, Duration),
}

impl Schedule {
    /// Draws the delay for the next cycle.
    pub fn next_delay(&self, rng: &mut impl Rng) -> Duration {
        match *self {
            Schedule::Fixed(delay) => delay,
            Schedule::UniformBetween(min, max) => {
                let millis = rng.gen_range(min.as_millis()..=max.as_millis());
                Duration::from_millis(millis as u64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn fixed_schedule_never_varies() {
        let schedule = Schedule::Fixed(Duration::from_secs(15));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(schedule.next_delay(&mut rng), Duration::from_secs(15));
        }
    }

    #[test]
    fn uniform_schedule_stays_within_bounds() {
        let min = Duration::from_secs(3);
        let max = Duration::from_secs(10);
        let schedule = Schedule::UniformBetween(min, max);
        let mut rng = StdRng::seed_from_u64(9);

        let mut seen_distinct = std::collections::HashSet::new();
        for _ in 0..200 {
            let delay = schedule.next_delay(&mut rng);
            assert!(delay >= min && delay <= max, "delay {delay:?} out of bounds");
            seen_distinct.insert(delay);
        }
        // A uniform draw over a 7-second millisecond range should not
        // collapse to a handful of values.
        assert!(seen_distinct.len() > 50);
    }
}
