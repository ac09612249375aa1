//! Registry of known unit symbols.
//!
//! Every unit maps onto SI base units through `si = value * to_si_factor + to_si_offset`.
//! Only absolute temperature scales carry a non-zero offset.
//! A temperature *difference* in Celsius is spelled `delta_degC` and has no offset.

use super::dimension::Dimension;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Joules per thermochemical calorie.
pub const JOULES_PER_CALORIE: f64 = 4.184;

/// Seconds per year (365.25 days).
pub const SECONDS_PER_YEAR: f64 = 365.25 * SECONDS_PER_DAY;
pub const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// Information about a known unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitInfo {
    pub name: String,
    pub dimension: Dimension,
    /// Multiplier taking a value in this unit to SI base units.
    pub to_si_factor: f64,
    /// Added after scaling. Non-zero only for absolute temperature scales.
    pub to_si_offset: f64,
}

impl UnitInfo {
    fn new(name: &str, dimension: Dimension, to_si_factor: f64) -> Self {
        Self::affine(name, dimension, to_si_factor, 0.0)
    }

    fn affine(name: &str, dimension: Dimension, to_si_factor: f64, to_si_offset: f64) -> Self {
        Self {
            name: name.to_string(),
            dimension,
            to_si_factor,
            to_si_offset,
        }
    }
}

/// SI prefix multipliers, longest symbols first so that `da` wins over `d`.
static SI_PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("n", 1e-9),
];

/// The global unit registry.
pub static UNIT_REGISTRY: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

#[derive(Debug)]
pub struct UnitRegistry {
    units: HashMap<&'static str, UnitInfo>,
    aliases: HashMap<&'static str, &'static str>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            units: HashMap::new(),
            aliases: HashMap::new(),
        };
        registry.register_base_units();
        registry.register_time_units();
        registry.register_energy_units();
        registry.register_temperature_units();
        registry.register_ratio_units();
        registry
    }

    /// Looks up a symbol, resolving aliases and SI prefixes.
    pub fn lookup(&self, symbol: &str) -> Option<UnitInfo> {
        if let Some(info) = self.get_direct(symbol) {
            return Some(info.clone());
        }
        self.lookup_prefixed(symbol)
    }

    fn get_direct(&self, symbol: &str) -> Option<&UnitInfo> {
        self.units.get(symbol).or_else(|| {
            self.aliases
                .get(symbol)
                .and_then(|canonical| self.units.get(canonical))
        })
    }

    fn lookup_prefixed(&self, symbol: &str) -> Option<UnitInfo> {
        SI_PREFIXES.iter().find_map(|(prefix, factor)| {
            let base = symbol.strip_prefix(prefix)?;
            let info = self.get_direct(base)?;
            // A prefixed absolute temperature has no sensible meaning
            if info.to_si_offset != 0.0 {
                return None;
            }
            Some(UnitInfo::new(
                symbol,
                info.dimension,
                info.to_si_factor * factor,
            ))
        })
    }

    fn register_base_units(&mut self) {
        self.units
            .insert("kg", UnitInfo::new("kg", Dimension::MASS, 1.0));
        self.units
            .insert("g", UnitInfo::new("g", Dimension::MASS, 1e-3));
        self.units
            .insert("m", UnitInfo::new("m", Dimension::LENGTH, 1.0));
        self.units
            .insert("s", UnitInfo::new("s", Dimension::TIME, 1.0));
        self.units
            .insert("K", UnitInfo::new("K", Dimension::TEMPERATURE, 1.0));
        self.units
            .insert("mol", UnitInfo::new("mol", Dimension::AMOUNT, 1.0));
        self.units
            .insert("1", UnitInfo::new("1", Dimension::dimensionless(), 1.0));

        self.aliases.insert("dimensionless", "1");
        self.aliases.insert("kelvin", "K");
    }

    fn register_time_units(&mut self) {
        self.units
            .insert("min", UnitInfo::new("min", Dimension::TIME, 60.0));
        self.units
            .insert("hr", UnitInfo::new("hr", Dimension::TIME, 3600.0));
        self.units.insert(
            "day",
            UnitInfo::new("day", Dimension::TIME, SECONDS_PER_DAY),
        );
        self.units
            .insert("yr", UnitInfo::new("yr", Dimension::TIME, SECONDS_PER_YEAR));

        self.aliases.insert("hour", "hr");
        self.aliases.insert("d", "day");
        self.aliases.insert("days", "day");
        self.aliases.insert("year", "yr");
    }

    fn register_energy_units(&mut self) {
        self.units
            .insert("J", UnitInfo::new("J", Dimension::ENERGY, 1.0));
        self.units.insert(
            "cal",
            UnitInfo::new("cal", Dimension::ENERGY, JOULES_PER_CALORIE),
        );
    }

    fn register_temperature_units(&mut self) {
        self.units.insert(
            "degC",
            UnitInfo::affine("degC", Dimension::TEMPERATURE, 1.0, KELVIN_OFFSET),
        );
        self.units.insert(
            "degF",
            UnitInfo::affine(
                "degF",
                Dimension::TEMPERATURE,
                5.0 / 9.0,
                459.67 * 5.0 / 9.0,
            ),
        );
        self.units.insert(
            "delta_degC",
            UnitInfo::new("delta_degC", Dimension::TEMPERATURE, 1.0),
        );

        self.aliases.insert("°C", "degC");
        self.aliases.insert("celsius", "degC");
        self.aliases.insert("Celsius", "degC");
        self.aliases.insert("°F", "degF");
    }

    fn register_ratio_units(&mut self) {
        self.units.insert(
            "percent",
            UnitInfo::new("percent", Dimension::dimensionless(), 1e-2),
        );
        self.aliases.insert("%", "percent");
    }
}
