use crate::error::HmmError;

/// Sum tolerance before a distribution is reported as drifted.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// Weights over an ordered label set.
///
/// Index `i` is the weight of the `i`-th declared label. The sampler walks
/// the weights in this order, so the order is part of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    weights: Vec<f64>,
}

impl Distribution {
    /// Rejects empty, negative and non-finite weights. A sum that misses 1.0
    /// by more than [`SUM_TOLERANCE`] is accepted but logged.
    pub fn new(weights: Vec<f64>) -> Result<Self, HmmError> {
        if weights.is_empty() {
            return Err(HmmError::invalid_model("distribution has no weights"));
        }
        if let Some((idx, w)) = weights
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, w)| !w.is_finite() || w < 0.0)
        {
            return Err(HmmError::invalid_model(format!(
                "weight #{idx} is {w}; weights must be finite and non-negative"
            )));
        }
        Ok(Self { weights })
    }

    pub(crate) fn from_trusted(weights: Vec<f64>) -> Self {
        Self { weights }
    }

    pub fn uniform(len: usize) -> Result<Self, HmmError> {
        if len == 0 {
            return Err(HmmError::invalid_model("distribution has no weights"));
        }
        Self::new(vec![1.0 / len as f64; len])
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn is_normalized(&self) -> bool {
        (self.total() - 1.0).abs() <= SUM_TOLERANCE
    }
}
