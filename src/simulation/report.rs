use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::HmmError;
use crate::model::HmmModel;
use crate::simulation::summary::Summary;
use crate::types::StateIndex;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub meta: RunMeta,
    pub states: Vec<StateReport>,
}

impl RunReport {
    /// Writes the report as pretty JSON, creating parent directories.
    pub fn write_json(&self, path: &Path) -> Result<(), HmmError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HmmError::io("create report directory", e))?;
        }
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| HmmError::json("serialize run report", e))?;
        json.push('\n');
        fs::write(path, json).map_err(|e| HmmError::io("write run report", e))?;
        tracing::debug!(path = %path.display(), "report: wrote run report json");
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub generated_at: String,
    pub model_name: String,
    pub steps: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateReport {
    pub label: String,
    pub visits: u64,
    pub symbols: Vec<SymbolShare>,
    /// Pearson statistic of observed emissions against the declared row.
    /// `None` for states that were never visited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_chi_squared: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolShare {
    pub label: String,
    pub count: u64,
    pub percent: f64,
    pub declared_percent: f64,
}

/// Pearson's chi-squared statistic for `observed` against `expected_probs`.
///
/// Cells with zero expected probability and zero observations are skipped.
/// A zero-probability cell with observations yields infinity. Returns `None`
/// when there are no observations.
pub fn chi_squared_statistic(observed: &[u64], expected_probs: &[f64]) -> Option<f64> {
    let n: u64 = observed.iter().sum();
    if n == 0 {
        return None;
    }
    let n = n as f64;
    let mut stat = 0.0;
    for (&obs, &p) in observed.iter().zip(expected_probs) {
        let expected = n * p;
        if expected <= 0.0 {
            if obs > 0 {
                return Some(f64::INFINITY);
            }
            continue;
        }
        let diff = obs as f64 - expected;
        stat += diff * diff / expected;
    }
    Some(stat)
}

pub fn build_run_report(
    model: &HmmModel,
    summary: &Summary,
    seed: Option<u64>,
    generated_at: String,
) -> RunReport {
    let states = (0..model.n_states())
        .map(StateIndex)
        .map(|state| {
            let counts = summary.frequencies.row(state);
            let percents = summary.percentages.row(state);
            let declared = model.emission(state).weights();
            let symbols = model
                .observations()
                .iter()
                .enumerate()
                .map(|(idx, label)| SymbolShare {
                    label: label.to_string(),
                    count: counts[idx],
                    percent: percents[idx],
                    declared_percent: declared[idx] * 100.0,
                })
                .collect();
            StateReport {
                label: model.state_label(state).to_string(),
                visits: summary.frequencies.total(state),
                symbols,
                emission_chi_squared: chi_squared_statistic(counts, declared),
            }
        })
        .collect();

    RunReport {
        schema_version: REPORT_SCHEMA_VERSION,
        meta: RunMeta {
            generated_at,
            model_name: model.name().to_string(),
            steps: summary.frequencies.steps(),
            seed,
        },
        states,
    }
}
