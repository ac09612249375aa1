//! Physical units for layer data and model parameters.
//!
//! Rasters arrive in whatever unit the data provider uses (often `degC`), while
//! rate models are parameterised in SI. Units are parsed once when a layer is built
//! and the resulting [`UnitConverter`] is applied per cell.
//!
//! ```
//! use growthmaps_core::units::Unit;
//!
//! let celsius = Unit::parse("degC").unwrap();
//! let kelvin = Unit::parse("K").unwrap();
//! let to_kelvin = celsius.converter(&kelvin).unwrap();
//! assert!((to_kelvin.apply(20.0) - 293.15).abs() < 1e-12);
//! ```

mod conversion;
mod dimension;
mod parser;
mod registry;

pub use conversion::{ConversionError, Unit, UnitConverter};
pub use dimension::Dimension;
pub use parser::{ParseError, ParsedUnit};
pub use registry::{UnitInfo, UnitRegistry, KELVIN_OFFSET, UNIT_REGISTRY};
