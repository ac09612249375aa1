//! Physical dimensions used to check that a unit conversion is meaningful.
//!
//! A dimension is a vector of integer exponents over the SI base quantities.
//! Two units can only be converted into one another when their dimensions match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer exponents of the SI base quantities.
///
/// For example a molar enthalpy (J/mol) is M·L²·T⁻²·N⁻¹.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Dimension {
    /// Mass exponent (M)
    pub mass: i8,
    /// Length exponent (L)
    pub length: i8,
    /// Time exponent (T)
    pub time: i8,
    /// Temperature exponent (Θ)
    pub temperature: i8,
    /// Amount of substance exponent (N)
    pub amount: i8,
}

impl Dimension {
    #[must_use]
    pub const fn new(mass: i8, length: i8, time: i8, temperature: i8, amount: i8) -> Self {
        Self {
            mass,
            length,
            time,
            temperature,
            amount,
        }
    }

    /// All exponents zero.
    #[must_use]
    pub const fn dimensionless() -> Self {
        Self::new(0, 0, 0, 0, 0)
    }

    pub const MASS: Self = Self::new(1, 0, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0);
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0);
    pub const AMOUNT: Self = Self::new(0, 0, 0, 0, 1);

    /// Energy (M·L²·T⁻²), e.g. J or cal.
    pub const ENERGY: Self = Self::new(1, 2, -2, 0, 0);

    /// Energy per amount of substance (M·L²·T⁻²·N⁻¹), e.g. J/mol.
    ///
    /// Activation and inactivation enthalpies are expressed in this dimension.
    pub const MOLAR_ENERGY: Self = Self::new(1, 2, -2, 0, -1);

    #[must_use]
    pub const fn is_dimensionless(&self) -> bool {
        self.mass == 0
            && self.length == 0
            && self.time == 0
            && self.temperature == 0
            && self.amount == 0
    }

    /// Dimensions are compatible when every exponent matches.
    #[must_use]
    pub const fn is_compatible(&self, other: &Self) -> bool {
        self.mass == other.mass
            && self.length == other.length
            && self.time == other.time
            && self.temperature == other.temperature
            && self.amount == other.amount
    }

    /// Every exponent multiplied by `exp`, or `None` if an exponent leaves the `i8` range.
    #[must_use]
    pub fn checked_pow(&self, exp: i32) -> Option<Self> {
        let exp = i8::try_from(exp).ok()?;
        Some(Self::new(
            self.mass.checked_mul(exp)?,
            self.length.checked_mul(exp)?,
            self.time.checked_mul(exp)?,
            self.temperature.checked_mul(exp)?,
            self.amount.checked_mul(exp)?,
        ))
    }

    /// Dimension of a product, or `None` on exponent overflow.
    #[must_use]
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        Some(Self::new(
            self.mass.checked_add(rhs.mass)?,
            self.length.checked_add(rhs.length)?,
            self.time.checked_add(rhs.time)?,
            self.temperature.checked_add(rhs.temperature)?,
            self.amount.checked_add(rhs.amount)?,
        ))
    }

    /// Dimension of a quotient, or `None` on exponent overflow.
    #[must_use]
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        self.checked_mul(&rhs.checked_pow(-1)?)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "dimensionless");
        }

        let parts: Vec<String> = [
            (self.mass, "M"),
            (self.length, "L"),
            (self.time, "T"),
            (self.temperature, "Θ"),
            (self.amount, "N"),
        ]
        .into_iter()
        .filter(|(exp, _)| *exp != 0)
        .map(|(exp, sym)| {
            if exp == 1 {
                sym.to_string()
            } else {
                format!("{sym}^{exp}")
            }
        })
        .collect();

        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molar_energy_from_parts() {
        assert_eq!(
            Dimension::ENERGY.checked_div(&Dimension::AMOUNT),
            Some(Dimension::MOLAR_ENERGY)
        );
    }

    #[test]
    fn reciprocal_temperature() {
        let per_kelvin = Dimension::dimensionless()
            .checked_div(&Dimension::TEMPERATURE)
            .unwrap();
        assert_eq!(per_kelvin.temperature, -1);
        assert_eq!(per_kelvin.checked_pow(-1), Some(Dimension::TEMPERATURE));
    }

    #[test]
    fn exponent_overflow() {
        assert_eq!(Dimension::ENERGY.checked_pow(64), None);
        assert_eq!(Dimension::LENGTH.checked_pow(200), None);
        assert_eq!(
            Dimension::LENGTH.checked_pow(127),
            Some(Dimension::new(0, 127, 0, 0, 0))
        );
        let long = Dimension::LENGTH.checked_pow(100).unwrap();
        assert_eq!(long.checked_mul(&long), None);
    }

    #[test]
    fn compatibility() {
        assert!(Dimension::TEMPERATURE.is_compatible(&Dimension::TEMPERATURE));
        assert!(!Dimension::TEMPERATURE.is_compatible(&Dimension::MOLAR_ENERGY));
    }

    #[test]
    fn display() {
        assert_eq!(Dimension::dimensionless().to_string(), "dimensionless");
        assert_eq!(Dimension::MOLAR_ENERGY.to_string(), "M L^2 T^-2 N^-1");
        assert_eq!(Dimension::TEMPERATURE.to_string(), "Θ");
    }
}
