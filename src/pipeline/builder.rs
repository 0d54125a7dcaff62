use std::path::Path;

use crate::config::{ModelFile, SimulationConfig};
use crate::error::HmmError;
use crate::model::{reference_model, HmmModel};
use crate::pipeline::runtime::{Simulator, SimulatorParts};
use crate::pipeline::traits::{CategoricalSampler, TrajectoryReporter};
use crate::simulation::sampler::RngCategoricalSampler;

pub struct SimulatorBuilder {
    config: SimulationConfig,
    model: Option<HmmModel>,
    sampler: Option<Box<dyn CategoricalSampler>>,
    reporters: Vec<Box<dyn TrajectoryReporter>>,
}

impl SimulatorBuilder {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            model: None,
            sampler: None,
            reporters: Vec::new(),
        }
    }

    /// Takes precedence over `SimulationConfig::model_path`.
    pub fn with_model(mut self, model: HmmModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Takes precedence over `SimulationConfig::seed`.
    pub fn with_sampler(mut self, sampler: Box<dyn CategoricalSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn TrajectoryReporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn build(self) -> Result<Simulator, HmmError> {
        if self.config.steps == 0 {
            return Err(HmmError::invalid_input("steps must be >= 1"));
        }

        let model = match (self.model, self.config.model_path.as_deref()) {
            (Some(model), _) => model,
            (None, Some(path)) => HmmModel::try_from(ModelFile::load(Path::new(path))?)?,
            (None, None) => reference_model(),
        };

        let seed = self.config.seed;
        let sampler = self.sampler.unwrap_or_else(|| match seed {
            Some(seed) => Box::new(RngCategoricalSampler::seeded(seed)),
            None => Box::new(RngCategoricalSampler::from_entropy()),
        });

        tracing::debug!(
            model = model.name(),
            states = model.n_states(),
            symbols = model.n_symbols(),
            steps = self.config.steps,
            seed,
            reporters = self.reporters.len(),
            "simulator: built"
        );

        Ok(Simulator::from_parts(SimulatorParts {
            model,
            steps: self.config.steps,
            seed,
            sampler,
            reporters: self.reporters,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::model::{Distribution, LabelSet};
    use crate::simulation::summary::Summary;
    use crate::types::{StateIndex, Trajectory};

    struct RecordingReporter {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, usize)>>>,
    }

    impl TrajectoryReporter for RecordingReporter {
        fn report(
            &self,
            _model: &HmmModel,
            trajectory: &Trajectory,
            _summary: &Summary,
        ) -> Result<(), HmmError> {
            self.log
                .lock()
                .expect("reporter log lock")
                .push((self.name, trajectory.len()));
            Ok(())
        }
    }

    struct FailingReporter;

    impl TrajectoryReporter for FailingReporter {
        fn report(
            &self,
            _model: &HmmModel,
            _trajectory: &Trajectory,
            _summary: &Summary,
        ) -> Result<(), HmmError> {
            Err(HmmError::invalid_input("sink closed"))
        }
    }

    /// Always picks the first label.
    struct FirstLabelSampler;

    impl CategoricalSampler for FirstLabelSampler {
        fn sample(&mut self, _distribution: &Distribution) -> usize {
            0
        }
    }

    /// Answers with an index no three-state model has.
    struct OutOfRangeSampler;

    impl CategoricalSampler for OutOfRangeSampler {
        fn sample(&mut self, _distribution: &Distribution) -> usize {
            7
        }
    }

    fn seeded_config(steps: usize, seed: u64) -> SimulationConfig {
        SimulationConfig {
            steps,
            seed: Some(seed),
            model_path: None,
        }
    }

    #[test]
    fn builder_defaults_to_reference_model() {
        let simulator = SimulatorBuilder::new(SimulationConfig::default())
            .build()
            .expect("build should succeed");
        assert_eq!(simulator.model(), &reference_model());
        assert_eq!(simulator.steps(), SimulationConfig::DEFAULT_STEPS);
        assert_eq!(simulator.seed(), None);
    }

    #[test]
    fn build_rejects_zero_steps() {
        let result = SimulatorBuilder::new(seeded_config(0, 1)).build();
        assert!(matches!(result, Err(HmmError::InvalidInput { .. })));
    }

    #[test]
    fn build_fails_on_missing_model_file() {
        let config = SimulationConfig {
            model_path: Some("/nonexistent/model.json".to_string()),
            ..SimulationConfig::default()
        };
        assert!(SimulatorBuilder::new(config).build().is_err());
    }

    #[test]
    fn build_loads_model_file() {
        let path = std::env::temp_dir().join("hmm_sim_builder_model.json");
        std::fs::write(
            &path,
            r#"{"name": "one", "states": ["Only"], "observations": ["a", "b"],
                "transition": [[1.0]], "emission": [[0.0, 1.0]]}"#,
        )
        .expect("write model");
        let config = SimulationConfig {
            steps: 10,
            seed: Some(3),
            model_path: Some(path.to_string_lossy().to_string()),
        };
        let mut simulator = SimulatorBuilder::new(config).build().expect("build");
        let output = simulator.run().unwrap();
        assert_eq!(simulator.model().name(), "one");
        assert_eq!(output.summary.frequencies.row(StateIndex(0)), &[0, 10]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn explicit_model_overrides_model_path() {
        let model = HmmModel::new(
            "explicit",
            LabelSet::new(["A"]).unwrap(),
            LabelSet::new(["x"]).unwrap(),
            Distribution::new(vec![1.0]).unwrap(),
            vec![Distribution::new(vec![1.0]).unwrap()],
            vec![Distribution::new(vec![1.0]).unwrap()],
        )
        .unwrap();
        let config = SimulationConfig {
            model_path: Some("/nonexistent/model.json".to_string()),
            ..seeded_config(5, 0)
        };
        let simulator = SimulatorBuilder::new(config)
            .with_model(model)
            .build()
            .expect("explicit model wins");
        assert_eq!(simulator.model().name(), "explicit");
    }

    #[test]
    fn same_seed_gives_same_output() {
        let mut a = SimulatorBuilder::new(seeded_config(400, 42)).build().unwrap();
        let mut b = SimulatorBuilder::new(seeded_config(400, 42)).build().unwrap();
        let out_a = a.run().unwrap();
        let out_b = b.run().unwrap();
        assert_eq!(out_a.trajectory, out_b.trajectory);
        assert_eq!(out_a.summary, out_b.summary);
    }

    #[test]
    fn injected_sampler_is_used() {
        let mut simulator = SimulatorBuilder::new(seeded_config(20, 0))
            .with_sampler(Box::new(FirstLabelSampler))
            .build()
            .unwrap();
        let output = simulator.run().unwrap();
        assert!(output.trajectory.states().iter().all(|s| s.0 == 0));
        assert_eq!(output.summary.frequencies.count(StateIndex(0), crate::types::SymbolIndex(0)), 20);
    }

    #[test]
    fn reporters_run_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut simulator = SimulatorBuilder::new(seeded_config(7, 9))
            .with_reporter(Box::new(RecordingReporter {
                name: "first",
                log: Arc::clone(&log),
            }))
            .with_reporter(Box::new(RecordingReporter {
                name: "second",
                log: Arc::clone(&log),
            }))
            .build()
            .unwrap();
        simulator.run().unwrap();
        assert_eq!(*log.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn reporter_failure_is_surfaced() {
        let mut simulator = SimulatorBuilder::new(seeded_config(3, 1))
            .with_reporter(Box::new(FailingReporter))
            .build()
            .unwrap();
        assert!(simulator.run().is_err());
    }

    #[test]
    fn streamed_counts_match_full_run() {
        let mut full = SimulatorBuilder::new(seeded_config(2_000, 5)).build().unwrap();
        let mut streamed = SimulatorBuilder::new(seeded_config(2_000, 5)).build().unwrap();
        let output = full.run().unwrap();
        let table = streamed.count_steps(2_000).unwrap();
        assert_eq!(output.summary.frequencies, table);
        assert!(streamed.count_steps(0).is_err());
    }

    #[test]
    fn bad_injected_sampler_fails_the_run_without_reporting() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut simulator = SimulatorBuilder::new(seeded_config(3, 0))
            .with_sampler(Box::new(OutOfRangeSampler))
            .with_reporter(Box::new(RecordingReporter {
                name: "never",
                log: Arc::clone(&log),
            }))
            .build()
            .unwrap();
        assert!(matches!(simulator.run(), Err(HmmError::InvalidInput { .. })));
        assert!(matches!(
            simulator.count_steps(3),
            Err(HmmError::InvalidInput { .. })
        ));
        assert!(log.lock().unwrap().is_empty());
    }
}
