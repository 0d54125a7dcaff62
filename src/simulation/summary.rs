use crate::error::HmmError;
use crate::model::HmmModel;
use crate::types::{StateIndex, SymbolIndex, Trajectory};

/// Observation counts per state, stored row-major by state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    n_states: usize,
    n_symbols: usize,
    counts: Vec<u64>,
    totals: Vec<u64>,
}

impl FrequencyTable {
    pub fn new(n_states: usize, n_symbols: usize) -> Self {
        Self {
            n_states,
            n_symbols,
            counts: vec![0; n_states * n_symbols],
            totals: vec![0; n_states],
        }
    }

    pub fn for_model(model: &HmmModel) -> Self {
        Self::new(model.n_states(), model.n_symbols())
    }

    pub fn record(&mut self, state: StateIndex, symbol: SymbolIndex) -> Result<(), HmmError> {
        if state.0 >= self.n_states || symbol.0 >= self.n_symbols {
            return Err(HmmError::invalid_input(format!(
                "pair (state #{}, symbol #{}) is outside a {}x{} frequency table",
                state.0, symbol.0, self.n_states, self.n_symbols
            )));
        }
        self.counts[state.0 * self.n_symbols + symbol.0] += 1;
        self.totals[state.0] += 1;
        Ok(())
    }

    /// Adds the counts of another table with the same dimensions.
    pub fn merge(&mut self, other: &FrequencyTable) -> Result<(), HmmError> {
        if self.n_states != other.n_states || self.n_symbols != other.n_symbols {
            return Err(HmmError::invalid_input(format!(
                "cannot merge a {}x{} frequency table into a {}x{} one",
                other.n_states, other.n_symbols, self.n_states, self.n_symbols
            )));
        }
        for (dst, src) in self.counts.iter_mut().zip(&other.counts) {
            *dst += src;
        }
        for (dst, src) in self.totals.iter_mut().zip(&other.totals) {
            *dst += src;
        }
        Ok(())
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    pub fn count(&self, state: StateIndex, symbol: SymbolIndex) -> u64 {
        self.row(state)[symbol.0]
    }

    pub fn row(&self, state: StateIndex) -> &[u64] {
        let start = state.0 * self.n_symbols;
        &self.counts[start..start + self.n_symbols]
    }

    /// Number of steps spent in `state`.
    pub fn total(&self, state: StateIndex) -> u64 {
        self.totals[state.0]
    }

    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    pub fn steps(&self) -> u64 {
        self.totals.iter().sum()
    }

    /// Row-wise percentages. Unvisited states report 0.0 for every symbol.
    pub fn percentages(&self) -> PercentageTable {
        let mut values = vec![0.0; self.counts.len()];
        for (state, &total) in self.totals.iter().enumerate() {
            if total == 0 {
                continue;
            }
            let start = state * self.n_symbols;
            for idx in start..start + self.n_symbols {
                values[idx] = 100.0 * self.counts[idx] as f64 / total as f64;
            }
        }
        PercentageTable {
            n_symbols: self.n_symbols,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PercentageTable {
    n_symbols: usize,
    values: Vec<f64>,
}

impl PercentageTable {
    pub fn get(&self, state: StateIndex, symbol: SymbolIndex) -> f64 {
        self.row(state)[symbol.0]
    }

    pub fn row(&self, state: StateIndex) -> &[f64] {
        let start = state.0 * self.n_symbols;
        &self.values[start..start + self.n_symbols]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub frequencies: FrequencyTable,
    pub percentages: PercentageTable,
}

impl Summary {
    pub fn from_frequencies(frequencies: FrequencyTable) -> Self {
        let percentages = frequencies.percentages();
        Self {
            frequencies,
            percentages,
        }
    }

    /// Percentage for a labelled cell, if both labels exist in `model`.
    pub fn percent(&self, model: &HmmModel, state: &str, symbol: &str) -> Option<f64> {
        let state = model.state_index(state)?;
        let symbol = model.symbol_index(symbol)?;
        Some(self.percentages.get(state, symbol))
    }
}

/// Counts how often each state emitted each symbol.
///
/// Fails only when the trajectory references states or symbols beyond the
/// model's dimensions.
pub fn summarize(model: &HmmModel, trajectory: &Trajectory) -> Result<Summary, HmmError> {
    let mut frequencies = FrequencyTable::for_model(model);
    for (state, symbol) in trajectory.steps() {
        frequencies.record(state, symbol)?;
    }
    tracing::debug!(
        model = model.name(),
        steps = frequencies.steps(),
        visited_states = frequencies.totals().iter().filter(|&&t| t > 0).count(),
        "summary: aggregated emission frequencies"
    );
    Ok(Summary::from_frequencies(frequencies))
}
