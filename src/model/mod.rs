//! Static description of a discrete hidden Markov model.

mod distribution;
mod labels;

pub use distribution::{Distribution, SUM_TOLERANCE};
pub use labels::LabelSet;

use crate::error::HmmError;
use crate::types::{StateIndex, SymbolIndex};

/// An immutable discrete HMM. Every weight vector is aligned with the
/// declared order of `states` or `observations`.
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    name: String,
    states: LabelSet,
    observations: LabelSet,
    initial: Distribution,
    transition: Vec<Distribution>,
    emission: Vec<Distribution>,
}

impl HmmModel {
    pub fn new(
        name: impl Into<String>,
        states: LabelSet,
        observations: LabelSet,
        initial: Distribution,
        transition: Vec<Distribution>,
        emission: Vec<Distribution>,
    ) -> Result<Self, HmmError> {
        let n_states = states.len();
        let n_symbols = observations.len();

        if initial.len() != n_states {
            return Err(HmmError::invalid_model(format!(
                "initial distribution has {} weights, expected {n_states}",
                initial.len()
            )));
        }
        if transition.len() != n_states {
            return Err(HmmError::invalid_model(format!(
                "transition model has {} rows, expected {n_states}",
                transition.len()
            )));
        }
        if emission.len() != n_states {
            return Err(HmmError::invalid_model(format!(
                "emission model has {} rows, expected {n_states}",
                emission.len()
            )));
        }
        for (row, state) in transition.iter().zip(states.iter()) {
            if row.len() != n_states {
                return Err(HmmError::invalid_model(format!(
                    "transition row '{state}' has {} weights, expected {n_states}",
                    row.len()
                )));
            }
        }
        for (row, state) in emission.iter().zip(states.iter()) {
            if row.len() != n_symbols {
                return Err(HmmError::invalid_model(format!(
                    "emission row '{state}' has {} weights, expected {n_symbols}",
                    row.len()
                )));
            }
        }

        let model = Self {
            name: name.into(),
            states,
            observations,
            initial,
            transition,
            emission,
        };
        model.warn_on_drift();
        Ok(model)
    }

    fn warn_on_drift(&self) {
        let rows = std::iter::once(("initial", None, &self.initial))
            .chain(
                self.transition
                    .iter()
                    .enumerate()
                    .map(|(i, d)| ("transition", Some(i), d)),
            )
            .chain(
                self.emission
                    .iter()
                    .enumerate()
                    .map(|(i, d)| ("emission", Some(i), d)),
            );
        for (table, row, dist) in rows {
            if !dist.is_normalized() {
                let state = row.and_then(|i| self.states.get(i)).unwrap_or("-");
                tracing::warn!(
                    model = self.name.as_str(),
                    table,
                    state,
                    sum = dist.total(),
                    "distribution does not sum to 1; sampler will fall back to the last label"
                );
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &LabelSet {
        &self.states
    }

    pub fn observations(&self) -> &LabelSet {
        &self.observations
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_symbols(&self) -> usize {
        self.observations.len()
    }

    pub fn initial(&self) -> &Distribution {
        &self.initial
    }

    /// Row of `P(next | state)`.
    ///
    /// Panics if `state` does not belong to this model.
    pub fn transition(&self, state: StateIndex) -> &Distribution {
        &self.transition[state.0]
    }

    /// Row of `P(symbol | state)`.
    ///
    /// Panics if `state` does not belong to this model.
    pub fn emission(&self, state: StateIndex) -> &Distribution {
        &self.emission[state.0]
    }

    pub fn state_index(&self, label: &str) -> Option<StateIndex> {
        self.states.position(label).map(StateIndex)
    }

    pub fn symbol_index(&self, label: &str) -> Option<SymbolIndex> {
        self.observations.position(label).map(SymbolIndex)
    }

    pub fn state_label(&self, state: StateIndex) -> &str {
        self.states.get(state.0).unwrap_or("?")
    }

    pub fn symbol_label(&self, symbol: SymbolIndex) -> &str {
        self.observations.get(symbol.0).unwrap_or("?")
    }
}

/// The three-state, three-colour model used by the default report.
pub fn reference_model() -> HmmModel {
    let rows = |rows: [[f64; 3]; 3]| -> Vec<Distribution> {
        rows.into_iter()
            .map(|row| Distribution::from_trusted(row.to_vec()))
            .collect()
    };
    HmmModel {
        name: "reference".to_string(),
        states: LabelSet::from_trusted(&["S1", "S2", "S3"]),
        observations: LabelSet::from_trusted(&["Red", "Blue", "Green"]),
        initial: Distribution::from_trusted(vec![1.0 / 3.0; 3]),
        transition: rows([[0.6, 0.2, 0.2], [0.2, 0.6, 0.2], [0.2, 0.2, 0.6]]),
        emission: rows([[0.7, 0.2, 0.1], [0.1, 0.7, 0.2], [0.2, 0.2, 0.6]]),
    }
}
