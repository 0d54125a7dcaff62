use crate::error::HmmError;
use crate::model::HmmModel;
use crate::pipeline::traits::{CategoricalSampler, TrajectoryReporter};
use crate::simulation::summary::{summarize, FrequencyTable};
use crate::simulation::trajectory::{generate, TrajectorySteps};
use crate::types::SimulationOutput;

pub struct Simulator {
    model: HmmModel,
    steps: usize,
    seed: Option<u64>,
    sampler: Box<dyn CategoricalSampler>,
    reporters: Vec<Box<dyn TrajectoryReporter>>,
}

pub(crate) struct SimulatorParts {
    pub model: HmmModel,
    pub steps: usize,
    pub seed: Option<u64>,
    pub sampler: Box<dyn CategoricalSampler>,
    pub reporters: Vec<Box<dyn TrajectoryReporter>>,
}

impl Simulator {
    pub(crate) fn from_parts(parts: SimulatorParts) -> Self {
        Self {
            model: parts.model,
            steps: parts.steps,
            seed: parts.seed,
            sampler: parts.sampler,
            reporters: parts.reporters,
        }
    }

    pub fn model(&self) -> &HmmModel {
        &self.model
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Seed the default sampler was created from, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Simulates the configured number of steps, summarizes, then hands the
    /// result to every reporter in registration order.
    pub fn run(&mut self) -> Result<SimulationOutput, HmmError> {
        self.run_steps(self.steps)
    }

    pub fn run_steps(&mut self, steps: usize) -> Result<SimulationOutput, HmmError> {
        let trajectory = generate(&self.model, self.sampler.as_mut(), steps)?;
        let summary = summarize(&self.model, &trajectory)?;
        for reporter in &self.reporters {
            reporter.report(&self.model, &trajectory, &summary)?;
        }
        Ok(SimulationOutput {
            trajectory,
            summary,
        })
    }

    /// Counts emissions without keeping the trajectory. Reporters are not
    /// invoked because there is no trajectory to hand them.
    pub fn count_steps(&mut self, steps: usize) -> Result<FrequencyTable, HmmError> {
        let mut table = FrequencyTable::for_model(&self.model);
        for item in TrajectorySteps::new(&self.model, self.sampler.as_mut(), steps)? {
            let (state, symbol) = item?;
            table.record(state, symbol)?;
        }
        tracing::debug!(
            model = self.model.name(),
            steps,
            "simulator: streamed emission counts"
        );
        Ok(table)
    }
}
