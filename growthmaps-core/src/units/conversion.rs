//! Unit conversion.
//!
//! Conversions are affine: `target = value * scale + offset`.
//! The offset is non-zero only between absolute temperature scales such as `degC` and `K`.

use super::dimension::Dimension;
use super::parser::{ParseError, ParsedUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error raised when two units cannot be converted into one another.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    IncompatibleDimensions {
        from: String,
        to: String,
        from_dim: Dimension,
        to_dim: Dimension,
    },
    ParseError(ParseError),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleDimensions {
                from,
                to,
                from_dim,
                to_dim,
            } => write!(
                f,
                "cannot convert '{from}' [{from_dim}] to '{to}' [{to_dim}]"
            ),
            Self::ParseError(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<ParseError> for ConversionError {
    fn from(e: ParseError) -> Self {
        Self::ParseError(e)
    }
}

/// A parsed unit that remembers how it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit {
    original: String,
    parsed: ParsedUnit,
}

impl Unit {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let parsed = ParsedUnit::parse(s)?;
        // Surface unknown symbols now rather than at conversion time
        parsed.dimension()?;
        Ok(Self {
            original: s.to_string(),
            parsed,
        })
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    #[must_use]
    pub fn normalized(&self) -> String {
        self.parsed.normalized()
    }

    #[must_use]
    pub fn parsed(&self) -> &ParsedUnit {
        &self.parsed
    }

    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        self.parsed.dimension()
    }

    pub fn is_dimensionless(&self) -> Result<bool, ParseError> {
        self.parsed.is_dimensionless()
    }

    pub fn is_compatible(&self, other: &Self) -> bool {
        match (self.dimension(), other.dimension()) {
            (Ok(a), Ok(b)) => a.is_compatible(&b),
            _ => false,
        }
    }

    /// Builds the affine map taking values in `self` to values in `target`.
    pub fn converter(&self, target: &Self) -> Result<UnitConverter, ConversionError> {
        let from_dim = self.dimension()?;
        let to_dim = target.dimension()?;
        if !from_dim.is_compatible(&to_dim) {
            return Err(ConversionError::IncompatibleDimensions {
                from: self.original.clone(),
                to: target.original.clone(),
                from_dim,
                to_dim,
            });
        }

        let from_factor = self.parsed.to_si_factor()?;
        let to_factor = target.parsed.to_si_factor()?;
        let from_offset = self.parsed.to_si_offset()?;
        let to_offset = target.parsed.to_si_offset()?;

        Ok(UnitConverter {
            scale: from_factor / to_factor,
            offset: (from_offset - to_offset) / to_factor,
        })
    }

    /// The multiplicative part of the conversion to `target`.
    pub fn conversion_factor(&self, target: &Self) -> Result<f64, ConversionError> {
        Ok(self.converter(target)?.scale)
    }

    pub fn convert_to(&self, value: f64, target: &Self) -> Result<f64, ConversionError> {
        Ok(self.converter(target)?.apply(value))
    }
}

impl PartialEq for Unit {
    /// Units are equal when they normalise to the same symbols.
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl TryFrom<String> for Unit {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.original
    }
}

/// Affine conversion `value * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitConverter {
    pub scale: f64,
    pub offset: f64,
}

impl UnitConverter {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self::identity()
    }
}
