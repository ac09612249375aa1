//! Execution of an aggregation run.

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::model::{Model, ModelSet};
use crate::source::DataSource;
use crate::stack::Stack;
use crate::timespan::Timespan;
use indexmap::IndexMap;
use ndarray::{Array2, Array3, ArrayViewMut2, Axis};
use rayon::ThreadPool;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::mask::validity_mask;
use super::output::{GrowthMaps, GrowthRaster};

/// Runs a validated set of models over a data source.
///
/// Created by [`super::GrowthMapBuilder`]. Periods are processed strictly in order.
/// Within a period every in-window timestep is copied into one reusable buffer,
/// each model's summed conditional rate is added to that model's period slice, and
/// the slice is finally divided by the number of contributing timesteps and
/// multiplied by the validity mask. A cell that is missing in any contributing
/// timestep is NaN for that period.
///
/// A run either returns every output or an error; it never returns partial output.
#[derive(Debug)]
pub struct GrowthMapper {
    models: ModelSet,
    timespan: Timespan,
    initial_value: f64,
    cancellation: Option<CancellationToken>,
    parallel: bool,
    pool: Option<Arc<ThreadPool>>,
}

impl GrowthMapper {
    pub(crate) fn new(
        models: ModelSet,
        timespan: Timespan,
        initial_value: f64,
        cancellation: Option<CancellationToken>,
        parallel: bool,
        pool: Option<Arc<ThreadPool>>,
    ) -> Self {
        Self {
            models,
            timespan,
            initial_value,
            cancellation,
            parallel,
            pool,
        }
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn timespan(&self) -> &Timespan {
        &self.timespan
    }

    /// The data keys read from the source: the union of every model's keys.
    pub fn required_keys(&self) -> Vec<String> {
        self.models.keys().into_iter().map(str::to_string).collect()
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    fn combine(&self, model: &Model, buffer: &Stack, slice: ArrayViewMut2<'_, f64>) -> GrowthMapResult<()> {
        match &self.pool {
            Some(pool) => pool.install(|| model.combine_into(buffer, slice, true)),
            None => model.combine_into(buffer, slice, self.parallel),
        }
    }

    /// Aggregate `source` into one raster per model.
    pub fn run<S>(&self, source: &S) -> GrowthMapResult<GrowthMaps>
    where
        S: DataSource + ?Sized,
    {
        let keys = self.required_keys();
        let timestamps = source.timestamps();
        if timestamps.is_empty() {
            return Err(GrowthMapError::EmptySource);
        }
        if let Some(index) = (1..timestamps.len()).find(|&i| timestamps[i] < timestamps[i - 1]) {
            return Err(GrowthMapError::UnsortedSource {
                index,
                timestamp: timestamps[index],
            });
        }
        let first_key = keys.first().ok_or(GrowthMapError::NoModels)?;

        // The buffer takes its shape from the first stack and is never resized
        let shape = source.read_layer(0, first_key)?.dim();
        let mut buffer = Stack::allocate(keys.iter().cloned(), shape);
        buffer.copy_from(source, 0)?;
        let missing_value = |key: &str| source.missing_value(key);
        let mask = validity_mask(&buffer, missing_value);

        let n_periods = self.timespan.len();
        let mut outputs: Vec<Array3<f64>> = self
            .models
            .iter()
            .map(|_| Array3::from_elem((shape.0, shape.1, n_periods), self.initial_value))
            .collect();
        let mut counts = Vec::with_capacity(n_periods);

        info!(
            models = self.models.len(),
            keys = ?keys,
            periods = n_periods,
            stacks = timestamps.len(),
            rows = shape.0,
            cols = shape.1,
            "Starting growth-rate aggregation"
        );

        for (period, start, end) in self.timespan.periods() {
            let mut n = 0usize;
            for index in source.window(start, end) {
                buffer.copy_from(source, index)?;
                // Cells missing at this timestep have no defined mean for the period
                let step_mask = validity_mask(&buffer, missing_value);
                for ((_, model), output) in self.models.iter().zip(outputs.iter_mut()) {
                    let mut slice = output.index_axis_mut(Axis(2), period);
                    self.combine(model, &buffer, slice.view_mut())?;
                    slice.zip_mut_with(&step_mask, |o, &m| *o *= m);
                }
                n += 1;

                if self.is_cancelled() {
                    return Err(GrowthMapError::Cancelled {
                        timestamp: timestamps[index],
                    });
                }
            }

            for output in outputs.iter_mut() {
                normalise(output.index_axis_mut(Axis(2), period), &mask, n);
            }

            if n == 0 {
                warn!(
                    period,
                    %start,
                    %end,
                    "No input timesteps fall within the period; output is the mask only"
                );
            } else {
                debug!(period, %start, %end, timesteps = n, "Aggregated period");
            }
            counts.push(n);

            // Also reached by periods without timesteps
            if self.is_cancelled() {
                return Err(GrowthMapError::Cancelled { timestamp: end });
            }
        }

        info!(
            empty_periods = counts.iter().filter(|&&n| n == 0).count(),
            "Finished growth-rate aggregation"
        );

        let times = self.timespan.starts().to_vec();
        let rasters = self
            .models
            .names()
            .zip(outputs)
            .map(|(name, data)| {
                (
                    name.to_string(),
                    GrowthRaster::new(data, times.clone(), counts.clone()),
                )
            })
            .collect::<IndexMap<_, _>>();
        Ok(GrowthMaps::new(rasters))
    }
}

/// Turn an accumulated period slice into a masked mean over `count` timesteps.
fn normalise(mut slice: ArrayViewMut2<'_, f64>, mask: &Array2<f64>, count: usize) {
    if count > 0 {
        let n = count as f64;
        slice.zip_mut_with(mask, |o, &m| *o *= m / n);
    } else {
        slice.zip_mut_with(mask, |o, &m| *o *= m);
    }
}
