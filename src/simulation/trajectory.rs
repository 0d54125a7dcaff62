use crate::error::HmmError;
use crate::model::HmmModel;
use crate::pipeline::traits::CategoricalSampler;
use crate::types::{StateIndex, SymbolIndex, Trajectory};

/// Upper bound on up-front allocation; longer runs grow as they go.
const PREALLOC_STEPS: usize = 1 << 16;

/// Lazily simulated `(state, observation)` pairs.
///
/// The first state comes from the initial distribution; every later state
/// comes from the transition row of the previous one. Each observation is
/// drawn from the emission row of the state at the same step.
///
/// An index outside the model yields one `Err` and ends the stream.
pub struct TrajectorySteps<'a, S: ?Sized> {
    model: &'a HmmModel,
    sampler: &'a mut S,
    remaining: usize,
    current: Option<StateIndex>,
}

impl<'a, S: CategoricalSampler + ?Sized> TrajectorySteps<'a, S> {
    pub fn new(model: &'a HmmModel, sampler: &'a mut S, steps: usize) -> Result<Self, HmmError> {
        if steps == 0 {
            return Err(HmmError::invalid_input("steps must be >= 1"));
        }
        Ok(Self {
            model,
            sampler,
            remaining: steps,
            current: None,
        })
    }

    fn step(&mut self) -> Result<(StateIndex, SymbolIndex), HmmError> {
        let row = match self.current {
            None => self.model.initial(),
            Some(prev) => self.model.transition(prev),
        };
        let state = self.sampler.sample(row);
        if state >= self.model.n_states() {
            return Err(HmmError::invalid_input(format!(
                "sampler returned state #{state} for a model with {} states",
                self.model.n_states()
            )));
        }
        let state = StateIndex(state);
        let symbol = self.sampler.sample(self.model.emission(state));
        if symbol >= self.model.n_symbols() {
            return Err(HmmError::invalid_input(format!(
                "sampler returned symbol #{symbol} for a model with {} symbols",
                self.model.n_symbols()
            )));
        }
        self.current = Some(state);
        Ok((state, SymbolIndex(symbol)))
    }
}

impl<S: CategoricalSampler + ?Sized> Iterator for TrajectorySteps<'_, S> {
    type Item = Result<(StateIndex, SymbolIndex), HmmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let item = self.step();
        if item.is_err() {
            self.remaining = 0;
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining.min(1), Some(self.remaining))
    }
}

/// Simulates `steps` ticks and keeps both sequences.
pub fn generate<S: CategoricalSampler + ?Sized>(
    model: &HmmModel,
    sampler: &mut S,
    steps: usize,
) -> Result<Trajectory, HmmError> {
    let mut states = Vec::with_capacity(steps.min(PREALLOC_STEPS));
    let mut observations = Vec::with_capacity(steps.min(PREALLOC_STEPS));
    for item in TrajectorySteps::new(model, sampler, steps)? {
        let (state, symbol) = item?;
        states.push(state);
        observations.push(symbol);
    }
    tracing::debug!(
        model = model.name(),
        steps,
        "trajectory: generated state and observation sequences"
    );
    Ok(Trajectory::from_parts(states, observations))
}
