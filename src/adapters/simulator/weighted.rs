//! Declarative weighted random selection.
//!
//! Distributions like "80% completed / 15% pending / 5% failed" are defined
//! as explicit `(value, weight)` pairs instead of inline cumulative-sum
//! code, so each table is readable at the call site and testable in
//! isolation.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::Rng;
use thiserror::Error;

/// Errors from building a weighted table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightedChoiceError {
    #[error("weighted table needs at least one entry")]
    Empty,

    #[error("weighted table needs at least one non-zero weight")]
    AllZero,
}

/// A fixed distribution over explicit `(value, weight)` pairs.
///
/// Weights are relative, not percentages: `(a, 8), (b, 2)` draws `a` four
/// times as often as `b`.
#[derive(Debug, Clone)]
pub struct WeightedChoice<T> {
    values: Vec<T>,
    index: WeightedIndex<u32>,
}

impl<T> WeightedChoice<T> {
    /// Builds a table from `(value, weight)` pairs.
    ///
    /// Zero-weight entries are allowed (they are simply never drawn), but
    /// the table must contain at least one entry with a non-zero weight.
    pub fn new(pairs: impl IntoIterator<Item = (T, u32)>) -> Result<Self, WeightedChoiceError> {
        let (values, weights): (Vec<T>, Vec<u32>) = pairs.into_iter().unzip();
        if values.is_empty() {
            return Err(WeightedChoiceError::Empty);
        }
        let index = WeightedIndex::new(&weights).map_err(|_| WeightedChoiceError::AllZero)?;
        Ok(Self { values, index })
    }

    /// Draws one value according to the weights.
    pub fn sample(&self, rng: &mut impl Rng) -> &T {
        &self.values[self.index.sample(rng)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_table_is_rejected() {
        let result = WeightedChoice::<u8>::new([]);
        assert_eq!(result.unwrap_err(), WeightedChoiceError::Empty);
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let result = WeightedChoice::new([("a", 0), ("b", 0)]);
        assert_eq!(result.unwrap_err(), WeightedChoiceError::AllZero);
    }

    #[test]
    fn single_nonzero_weight_always_wins() {
        let table = WeightedChoice::new([("never", 0), ("always", 7)]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            assert_eq!(*table.sample(&mut rng), "always");
        }
    }

    #[test]
    fn samples_track_the_declared_weights() {
        let table = WeightedChoice::new([("heavy", 8), ("light", 2)]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut heavy = 0usize;
        let draws = 10_000;
        for _ in 0..draws {
            if *table.sample(&mut rng) == "heavy" {
                heavy += 1;
            }
        }

        // 80% expected; ±3 percentage points is over seven standard
        // deviations at this sample size.
        assert!((7_700..=8_300).contains(&heavy), "heavy drawn {heavy} times");
    }

    proptest! {
        #[test]
        fn sampled_values_come_from_the_table(
            weights in proptest::collection::vec(0u32..100, 1..8),
            seed in any::<u64>(),
        ) {
            prop_assume!(weights.iter().any(|w| *w > 0));

            let pairs: Vec<(usize, u32)> =
                weights.iter().copied().enumerate().collect();
            let table = WeightedChoice::new(pairs).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);

            for _ in 0..64 {
                let drawn = *table.sample(&mut rng);
                prop_assert!(drawn < weights.len());
                prop_assert!(weights[drawn] > 0, "zero-weight entry drawn");
            }
        }
    }
}
