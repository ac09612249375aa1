//! Gridded population growth-rate maps.
//!
//! Re-exports the aggregation engine from `growthmaps-core` and the rate models
//! from `growthmaps-models`.

pub use growthmaps_core as core;
pub use growthmaps_models as models;

pub use growthmaps_core::errors::{GrowthMapError, GrowthMapResult};
pub use growthmaps_core::growth::{GrowthMapBuilder, GrowthMaps, GrowthRaster};
pub use growthmaps_core::timespan::{Period, Timespan};
pub use growthmaps_core::{mapgrowth, mapgrowth_set, Layer, Model, ModelSet, RateModel};
pub use growthmaps_models::{LowerStress, SchoolfieldIntrinsicGrowth, UpperStress};
