use crate::error::HmmError;
use crate::model::{Distribution, HmmModel};
use crate::simulation::summary::Summary;
use crate::types::Trajectory;

pub trait CategoricalSampler: Send {
    /// Returns an index into `distribution.weights()`.
    fn sample(&mut self, distribution: &Distribution) -> usize;
}

pub trait TrajectoryReporter: Send + Sync {
    fn report(
        &self,
        model: &HmmModel,
        trajectory: &Trajectory,
        summary: &Summary,
    ) -> Result<(), HmmError>;
}
