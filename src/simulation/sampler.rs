use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Distribution;
use crate::pipeline::traits::CategoricalSampler;

/// Picks the first index whose running weight total strictly exceeds `r`.
///
/// When rounding leaves the total at or below `r` (weights summing to a bit
/// less than 1.0), the last index is returned. `weights` must not be empty.
pub fn sample_index(weights: &[f64], r: f64) -> usize {
    debug_assert!(!weights.is_empty(), "cannot sample from an empty distribution");
    let mut cumulative = 0.0;
    for (idx, &w) in weights.iter().enumerate() {
        cumulative += w;
        if r < cumulative {
            return idx;
        }
    }
    tracing::trace!(
        r,
        cumulative,
        "sampler: cumulative weight never exceeded draw, using last label"
    );
    weights.len().saturating_sub(1)
}

/// Categorical sampler backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngCategoricalSampler<R> {
    rng: R,
}

impl<R: Rng> RngCategoricalSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngCategoricalSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> CategoricalSampler for RngCategoricalSampler<R> {
    fn sample(&mut self, distribution: &Distribution) -> usize {
        let r: f64 = self.rng.gen();
        sample_index(distribution.weights(), r)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Replays a fixed list of uniform draws, cycling when exhausted.
    pub(crate) struct ScriptedSampler {
        draws: Vec<f64>,
        next: usize,
    }

    impl ScriptedSampler {
        pub(crate) fn new(draws: Vec<f64>) -> Self {
            Self { draws, next: 0 }
        }
    }

    impl CategoricalSampler for ScriptedSampler {
        fn sample(&mut self, distribution: &Distribution) -> usize {
            let r = self.draws[self.next % self.draws.len()];
            self.next += 1;
            sample_index(distribution.weights(), r)
        }
    }

    #[test]
    fn cumulative_boundaries_are_strict() {
        let weights = [0.2, 0.3, 0.5];
        assert_eq!(sample_index(&weights, 0.0), 0);
        assert_eq!(sample_index(&weights, 0.199), 0);
        // 0.2 does not strictly exceed 0.2, so the draw lands on the next label.
        assert_eq!(sample_index(&weights, 0.2), 1);
        assert_eq!(sample_index(&weights, 0.49), 1);
        assert_eq!(sample_index(&weights, 0.5), 2);
        assert_eq!(sample_index(&weights, 0.999_999), 2);
    }

    #[test]
    fn zero_weight_labels_are_never_chosen() {
        let weights = [0.0, 1.0, 0.0];
        for r in [0.0, 0.25, 0.5, 0.75, 0.999] {
            assert_eq!(sample_index(&weights, r), 1);
        }
    }

    #[test]
    fn short_sum_falls_back_to_last_label() {
        let weights = [0.3, 0.3, 0.3];
        assert_eq!(sample_index(&weights, 0.95), 2);
        let weights = [0.5, 0.0];
        assert_eq!(sample_index(&weights, 0.75), 1);
    }

    #[test]
    fn seeded_samplers_repeat() {
        let dist = Distribution::new(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut a = RngCategoricalSampler::seeded(7);
        let mut b = RngCategoricalSampler::seeded(7);
        let xs: Vec<usize> = (0..256).map(|_| a.sample(&dist)).collect();
        let ys: Vec<usize> = (0..256).map(|_| b.sample(&dist)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&i| i < 4));
    }

    #[test]
    fn scripted_sampler_is_deterministic() {
        let dist = Distribution::new(vec![0.5, 0.5]).unwrap();
        let mut sampler = ScriptedSampler::new(vec![0.1, 0.9]);
        assert_eq!(sampler.sample(&dist), 0);
        assert_eq!(sampler.sample(&dist), 1);
        assert_eq!(sampler.sample(&dist), 0);
    }
}
