//! The temporal aggregation engine.
//!
//! Input stacks are averaged into fixed output periods:
//!
//! 1. The required keys are the union of every model's layer keys.
//! 2. A buffer holding only those keys is allocated with the shape of the first stack,
//!    and the validity mask is computed from that stack.
//! 3. For each period, every input timestep in `[start, end)` is copied into the buffer
//!    and each model's summed conditional rate is added to the model's period slice.
//! 4. The slice is multiplied by `mask / n` for `n` contributing timesteps, or by the
//!    mask alone when no timestep falls in the period (a warning is logged).

mod builder;
mod cancel;
mod mask;
mod output;
mod runtime;

#[cfg(test)]
mod tests;

pub use builder::GrowthMapBuilder;
pub use cancel::CancellationToken;
pub use output::{GrowthMaps, GrowthRaster};
pub use runtime::GrowthMapper;

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::model::{Model, ModelSet};
use crate::source::DataSource;
use crate::timespan::Timespan;

/// Aggregate a single model over `source`.
///
/// `model` may be one layer, a list of layers or a [`Model`].
pub fn mapgrowth<S>(
    model: impl Into<Model>,
    source: &S,
    timespan: Timespan,
    initial_value: f64,
) -> GrowthMapResult<GrowthRaster>
where
    S: DataSource + ?Sized,
{
    GrowthMapBuilder::new()
        .with_model("model", model)
        .with_timespan(timespan)
        .with_initial_value(initial_value)
        .build()?
        .run(source)?
        .into_single()
        .ok_or_else(|| GrowthMapError::Error("expected exactly one output raster".to_string()))
}

/// Aggregate several named models over one shared pass of `source`.
pub fn mapgrowth_set<S>(
    models: ModelSet,
    source: &S,
    timespan: Timespan,
    initial_value: f64,
) -> GrowthMapResult<GrowthMaps>
where
    S: DataSource + ?Sized,
{
    GrowthMapBuilder::new()
        .with_models(models)
        .with_timespan(timespan)
        .with_initial_value(initial_value)
        .build()?
        .run(source)
}
