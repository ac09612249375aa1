pub mod config;
#[cfg(test)]
mod example_models;
pub mod fit;
pub mod growth;
pub mod layer;
pub mod model;
pub mod rate_model;
pub mod source;
pub mod stack;
pub mod timespan;
pub mod units;

pub mod errors;

pub use growth::{mapgrowth, mapgrowth_set};
pub use layer::Layer;
pub use model::{Model, ModelSet};
pub use rate_model::{Parameter, RateModel};
