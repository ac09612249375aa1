//! Growth and stress rate models.
//!
//! Every model implements [`growthmaps_core::RateModel`] and is registered with
//! `typetag`, so it can be named by its type in a configuration file:
//!
//! ```toml
//! model = { type = "UpperStress", threshold = 0.9, mortality_rate = -0.5 }
//! ```

pub mod schoolfield;
pub mod stress;

pub use schoolfield::{SchoolfieldIntrinsicGrowth, SchoolfieldParameters, GAS_CONSTANT};
pub use stress::{LowerStress, UpperStress};
