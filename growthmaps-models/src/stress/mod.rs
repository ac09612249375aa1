//! Stress models
//!
//! A stress model applies a mortality slope once its input crosses a threshold:
//! below it for [`LowerStress`], above it for [`UpperStress`]. Outside that region
//! the contribution is exactly zero, so stresses add onto a growth model without
//! changing it where they are inactive.
//!
//! `mortality_rate` is signed; a negative slope reduces the growth rate.

mod lower;
mod upper;

pub use lower::LowerStress;
pub use upper::UpperStress;

fn default_unit() -> String {
    "1".to_string()
}
