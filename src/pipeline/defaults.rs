use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::HmmError;
use crate::model::HmmModel;
use crate::pipeline::traits::TrajectoryReporter;
use crate::plot::render_trajectory_svg;
use crate::simulation::summary::Summary;
use crate::types::{StateIndex, SymbolIndex, Trajectory};

/// Per-state emission percentages, one decimal place, states and symbols in
/// declared order.
pub fn format_percentage_report(model: &HmmModel, summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Frequency of each observation in each state (%):");
    for (s, state) in model.states().iter().enumerate() {
        let _ = writeln!(out, "State {state}:");
        for (o, symbol) in model.observations().iter().enumerate() {
            let percent = summary.percentages.get(StateIndex(s), SymbolIndex(o));
            let _ = writeln!(out, "  {symbol}: {percent:.1}%");
        }
    }
    out
}

/// Prints the percentage table to standard output.
pub struct PercentageTextReporter;

impl TrajectoryReporter for PercentageTextReporter {
    fn report(
        &self,
        model: &HmmModel,
        _trajectory: &Trajectory,
        summary: &Summary,
    ) -> Result<(), HmmError> {
        let text = format_percentage_report(model, summary);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout)
            .and_then(|_| stdout.write_all(text.as_bytes()))
            .and_then(|_| stdout.flush())
            .map_err(|e| HmmError::io("write percentage report", e))
    }
}

/// Writes the two-panel trajectory plot as an SVG file.
pub struct SvgPlotReporter {
    path: PathBuf,
}

impl SvgPlotReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TrajectoryReporter for SvgPlotReporter {
    fn report(
        &self,
        model: &HmmModel,
        trajectory: &Trajectory,
        _summary: &Summary,
    ) -> Result<(), HmmError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HmmError::io("create plot directory", e))?;
        }
        let svg = render_trajectory_svg(model, trajectory);
        fs::write(&self.path, svg).map_err(|e| HmmError::io("write trajectory plot", e))?;
        tracing::debug!(path = %self.path.display(), "plot: wrote trajectory svg");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reference_model;
    use crate::simulation::summary::summarize;

    fn sample_summary() -> (HmmModel, Trajectory, Summary) {
        let model = reference_model();
        let trajectory = Trajectory::from_labels(
            &model,
            &["S1", "S1", "S1", "S2"],
            &["Red", "Red", "Blue", "Blue"],
        )
        .unwrap();
        let summary = summarize(&model, &trajectory).unwrap();
        (model, trajectory, summary)
    }

    #[test]
    fn percentage_report_layout() {
        let (model, _, summary) = sample_summary();
        let text = format_percentage_report(&model, &summary);
        let expected = "\
Frequency of each observation in each state (%):
State S1:
  Red: 66.7%
  Blue: 33.3%
  Green: 0.0%
State S2:
  Red: 0.0%
  Blue: 100.0%
  Green: 0.0%
State S3:
  Red: 0.0%
  Blue: 0.0%
  Green: 0.0%
";
        assert_eq!(text, expected);
    }

    #[test]
    fn svg_reporter_creates_parent_directories() {
        let (model, trajectory, summary) = sample_summary();
        let dir = std::env::temp_dir().join("hmm_sim_svg_reporter");
        let _ = fs::remove_dir_all(&dir);
        let reporter = SvgPlotReporter::new(dir.join("plots").join("run.svg"));
        reporter.report(&model, &trajectory, &summary).unwrap();
        let svg = fs::read_to_string(reporter.path()).unwrap();
        assert!(svg.contains("Observation Sequence"));
        let _ = fs::remove_dir_all(&dir);
    }
}
