use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HmmError;
use crate::model::{Distribution, HmmModel, LabelSet};
use crate::types::StateIndex;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub steps: usize,
    pub seed: Option<u64>,
    /// JSON model file; the built-in reference model is used when unset.
    pub model_path: Option<String>,
}

impl SimulationConfig {
    pub const DEFAULT_STEPS: usize = 1000;
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: Self::DEFAULT_STEPS,
            seed: None,
            model_path: None,
        }
    }
}

/// On-disk model description. Label order is fixed by the `states` and
/// `observations` arrays; every weight row follows that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(default = "default_model_name")]
    pub name: String,
    pub states: Vec<String>,
    pub observations: Vec<String>,
    /// Uniform over `states` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Vec<f64>>,
    pub transition: Vec<Vec<f64>>,
    pub emission: Vec<Vec<f64>>,
}

fn default_model_name() -> String {
    "custom".to_string()
}

impl ModelFile {
    pub fn load(path: &Path) -> Result<Self, HmmError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| HmmError::io("read model file", e))?;
        serde_json::from_str(&data).map_err(|e| HmmError::json("parse model file", e))
    }

    pub fn from_model(model: &HmmModel) -> Self {
        let n_states = model.n_states();
        Self {
            name: model.name().to_string(),
            states: model.states().as_slice().to_vec(),
            observations: model.observations().as_slice().to_vec(),
            initial: Some(model.initial().weights().to_vec()),
            transition: (0..n_states)
                .map(|s| model.transition(StateIndex(s)).weights().to_vec())
                .collect(),
            emission: (0..n_states)
                .map(|s| model.emission(StateIndex(s)).weights().to_vec())
                .collect(),
        }
    }
}

impl TryFrom<ModelFile> for HmmModel {
    type Error = HmmError;

    fn try_from(file: ModelFile) -> Result<Self, Self::Error> {
        let states = LabelSet::new(file.states)?;
        let observations = LabelSet::new(file.observations)?;
        let initial = match file.initial {
            Some(weights) => Distribution::new(weights)?,
            None => Distribution::uniform(states.len())?,
        };
        let transition = file
            .transition
            .into_iter()
            .map(Distribution::new)
            .collect::<Result<Vec<_>, _>>()?;
        let emission = file
            .emission
            .into_iter()
            .map(Distribution::new)
            .collect::<Result<Vec<_>, _>>()?;
        HmmModel::new(file.name, states, observations, initial, transition, emission)
    }
}
