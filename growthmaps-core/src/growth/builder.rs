//! Builder for configuring an aggregation run.

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::model::{Model, ModelSet};
use crate::timespan::Timespan;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;

use super::cancel::CancellationToken;
use super::runtime::GrowthMapper;

/// Configure the models, timespan and options of an aggregation run.
///
/// Configuration errors are collected and reported by [`GrowthMapBuilder::build`],
/// before any data is read.
#[derive(Debug, Default)]
pub struct GrowthMapBuilder {
    models: ModelSet,
    duplicate: Option<String>,
    timespan: Option<Timespan>,
    initial_value: f64,
    cancellation: Option<CancellationToken>,
    parallel: bool,
    threads: Option<usize>,
}

impl GrowthMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named model.
    ///
    /// Each model produces its own output raster.
    pub fn with_model(&mut self, name: &str, model: impl Into<Model>) -> &mut Self {
        if self.models.insert(name, model).is_err() && self.duplicate.is_none() {
            self.duplicate = Some(name.to_string());
        }
        self
    }

    /// Register every model of `models`.
    pub fn with_models(&mut self, models: ModelSet) -> &mut Self {
        for (name, model) in models.iter() {
            self.with_model(name, model.clone());
        }
        self
    }

    /// The output periods.
    pub fn with_timespan(&mut self, timespan: Timespan) -> &mut Self {
        self.timespan = Some(timespan);
        self
    }

    /// Value every output cell starts from before accumulation.
    ///
    /// Defaults to zero.
    pub fn with_initial_value(&mut self, initial_value: f64) -> &mut Self {
        self.initial_value = initial_value;
        self
    }

    /// Token checked after every timestep; cancelling it aborts the run with an error.
    pub fn with_cancellation(&mut self, token: CancellationToken) -> &mut Self {
        self.cancellation = Some(token);
        self
    }

    /// Evaluate grid cells in parallel using rayon.
    ///
    /// Each cell is still summed in timestep order then layer order, so the output is
    /// identical to a serial run.
    pub fn with_parallel(&mut self, parallel: bool) -> &mut Self {
        self.parallel = parallel;
        self
    }

    /// Evaluate grid cells in parallel on a dedicated pool of `threads` threads.
    pub fn with_threads(&mut self, threads: usize) -> &mut Self {
        self.parallel = true;
        self.threads = Some(threads);
        self
    }

    /// Validate the configuration and create the runner.
    pub fn build(&self) -> GrowthMapResult<GrowthMapper> {
        if let Some(name) = &self.duplicate {
            return Err(GrowthMapError::DuplicateModel(name.clone()));
        }
        if self.models.is_empty() {
            return Err(GrowthMapError::NoModels);
        }
        if let Some((name, _)) = self.models.iter().find(|(_, model)| model.is_empty()) {
            return Err(GrowthMapError::EmptyModel(name.to_string()));
        }
        let timespan = self.timespan.clone().ok_or_else(|| {
            GrowthMapError::InvalidTimespan("no timespan was supplied".to_string())
        })?;

        let pool = match self.threads {
            Some(threads) => Some(Arc::new(
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GrowthMapError::Error(format!("could not start thread pool: {e}")))?,
            )),
            None => None,
        };

        Ok(GrowthMapper::new(
            self.models.clone(),
            timespan,
            self.initial_value,
            self.cancellation.clone(),
            self.parallel,
            pool,
        ))
    }
}
