pub mod collaborators;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod plot;
pub mod simulation;
pub mod types;

pub use config::{ModelFile, SimulationConfig};
pub use error::HmmError;
pub use model::{reference_model, Distribution, HmmModel, LabelSet};
pub use pipeline::builder::SimulatorBuilder;
pub use pipeline::defaults::{format_percentage_report, PercentageTextReporter, SvgPlotReporter};
pub use pipeline::runtime::Simulator;
pub use pipeline::traits::{CategoricalSampler, TrajectoryReporter};
pub use simulation::report::{build_run_report, chi_squared_statistic, RunReport};
pub use simulation::sampler::{sample_index, RngCategoricalSampler};
pub use simulation::summary::{summarize, FrequencyTable, PercentageTable, Summary};
pub use simulation::trajectory::{generate, TrajectorySteps};
pub use types::{SimulationOutput, StateIndex, SymbolIndex, Trajectory};
