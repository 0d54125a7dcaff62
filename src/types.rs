use crate::error::HmmError;
use crate::model::HmmModel;
use crate::simulation::summary::Summary;

/// Position of a hidden state in the model's declared state order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateIndex(pub usize);

/// Position of an observation symbol in the model's declared symbol order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolIndex(pub usize);

/// One simulated run: `observations[t]` was emitted from `states[t]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    states: Vec<StateIndex>,
    observations: Vec<SymbolIndex>,
}

impl Trajectory {
    pub(crate) fn from_parts(states: Vec<StateIndex>, observations: Vec<SymbolIndex>) -> Self {
        debug_assert_eq!(states.len(), observations.len());
        Self {
            states,
            observations,
        }
    }

    /// Builds a trajectory from labels, resolving each against `model`.
    pub fn from_labels<S, O>(model: &HmmModel, states: &[S], observations: &[O]) -> Result<Self, HmmError>
    where
        S: AsRef<str>,
        O: AsRef<str>,
    {
        if states.len() != observations.len() {
            return Err(HmmError::invalid_input(format!(
                "trajectory length mismatch: {} states vs {} observations",
                states.len(),
                observations.len()
            )));
        }
        let states = states
            .iter()
            .map(|label| {
                model.state_index(label.as_ref()).ok_or_else(|| {
                    HmmError::invalid_input(format!("unknown state '{}'", label.as_ref()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let observations = observations
            .iter()
            .map(|label| {
                model.symbol_index(label.as_ref()).ok_or_else(|| {
                    HmmError::invalid_input(format!("unknown observation '{}'", label.as_ref()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(states, observations))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[StateIndex] {
        &self.states
    }

    pub fn observations(&self) -> &[SymbolIndex] {
        &self.observations
    }

    pub fn steps(&self) -> impl Iterator<Item = (StateIndex, SymbolIndex)> + '_ {
        self.states
            .iter()
            .copied()
            .zip(self.observations.iter().copied())
    }
}

/// Everything a single simulator run produces.
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub trajectory: Trajectory,
    pub summary: Summary,
}
