//! Sharpe-Schoolfield intrinsic growth
//!
//! Temperature-dependent development rate with low- and high-temperature enzyme
//! inactivation.
//!
//! # Rate
//!
//! $$r(T) = \frac{p \frac{T}{T_{ref}} \exp\left(\frac{\Delta H_A}{R}\left(\frac{1}{T_{ref}} - \frac{1}{T}\right)\right)}
//! {1 + \exp\left(\frac{\Delta H_L}{R}\left(\frac{1}{T_{1/2L}} - \frac{1}{T}\right)\right)
//!    + \exp\left(\frac{\Delta H_H}{R}\left(\frac{1}{T_{1/2H}} - \frac{1}{T}\right)\right)}$$
//!
//! where $R$ is the universal gas constant. All quantities are evaluated in SI:
//! temperatures in K and enthalpies in J/mol. Parameters given in other units
//! (for example cal/mol or degC) are converted once, when the model is built.
//!
//! # Reference
//!
//! Schoolfield, Sharpe & Magnuson (1981), "Non-linear regression of biological
//! temperature-dependent rate models based on absolute reaction-rate theory",
//! Journal of Theoretical Biology 88, 719-731.

use growthmaps_core::errors::{GrowthMapError, GrowthMapResult};
use growthmaps_core::rate_model::{check_parameter_values, Parameter, RateModel};
use growthmaps_core::units::{Unit, UnitConverter};
use serde::{Deserialize, Serialize};

/// Universal gas constant
/// unit: J/(mol K)
pub const GAS_CONSTANT: f64 = 8.314462618;

const MODEL: &str = "SchoolfieldIntrinsicGrowth";

fn default_enthalpy_unit() -> String {
    "J/mol".to_string()
}

fn default_temperature_unit() -> String {
    "K".to_string()
}

/// Parameters for [`SchoolfieldIntrinsicGrowth`]
///
/// Enthalpies share one unit and temperatures share another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolfieldParameters {
    /// Development rate at the reference temperature (p)
    /// unit: rate (for example 1/day)
    pub p: f64,

    /// Enthalpy of activation (ΔH_A)
    /// unit: `enthalpy_unit`
    pub delta_h_a: f64,

    /// Enthalpy of low-temperature inactivation (ΔH_L)
    /// Usually negative
    /// unit: `enthalpy_unit`
    pub delta_h_l: f64,

    /// Enthalpy of high-temperature inactivation (ΔH_H)
    /// unit: `enthalpy_unit`
    pub delta_h_h: f64,

    /// Temperature at which the enzyme is half inactivated by cold (T_1/2L)
    /// unit: `temperature_unit`
    pub t_half_l: f64,

    /// Temperature at which the enzyme is half inactivated by heat (T_1/2H)
    /// unit: `temperature_unit`
    pub t_half_h: f64,

    /// Reference temperature (T_ref)
    /// unit: `temperature_unit`
    pub t_ref: f64,

    /// Unit of the three enthalpies
    /// default: "J/mol"
    #[serde(default = "default_enthalpy_unit")]
    pub enthalpy_unit: String,

    /// Unit of the three temperatures
    /// default: "K"
    #[serde(default = "default_temperature_unit")]
    pub temperature_unit: String,
}

/// Sharpe-Schoolfield growth model, always active.
///
/// Values are held in K and J/mol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchoolfieldParameters", into = "SchoolfieldParameters")]
pub struct SchoolfieldIntrinsicGrowth {
    p: f64,
    delta_h_a: f64,
    delta_h_l: f64,
    delta_h_h: f64,
    t_half_l: f64,
    t_half_h: f64,
    t_ref: f64,
}

impl SchoolfieldIntrinsicGrowth {
    /// Create a model from values in J/mol and K.
    ///
    /// Fails if a temperature is not strictly positive or a value is not finite.
    pub fn new(
        p: f64,
        delta_h_a: f64,
        delta_h_l: f64,
        delta_h_h: f64,
        t_half_l: f64,
        t_half_h: f64,
        t_ref: f64,
    ) -> GrowthMapResult<Self> {
        let values = [p, delta_h_a, delta_h_l, delta_h_h, t_half_l, t_half_h, t_ref];
        check_parameter_values(MODEL, 7, &values)?;
        for (name, t) in [("t_half_l", t_half_l), ("t_half_h", t_half_h), ("t_ref", t_ref)] {
            if t <= 0.0 {
                return Err(GrowthMapError::InvalidParameters {
                    model: MODEL.to_string(),
                    reason: format!("{name} must be above absolute zero, got {t} K"),
                });
            }
        }
        Ok(Self {
            p,
            delta_h_a,
            delta_h_l,
            delta_h_h,
            t_half_l,
            t_half_h,
            t_ref,
        })
    }

    /// Create a model from parameters in any supported enthalpy and temperature units.
    pub fn from_parameters(parameters: SchoolfieldParameters) -> GrowthMapResult<Self> {
        let converter = |from: &str, to: &str| -> GrowthMapResult<UnitConverter> {
            let invalid = |reason: String| GrowthMapError::InvalidParameters {
                model: MODEL.to_string(),
                reason,
            };
            let from = Unit::parse(from).map_err(|e| invalid(e.to_string()))?;
            let to = Unit::parse(to).map_err(|e| invalid(e.to_string()))?;
            from.converter(&to).map_err(|e| invalid(e.to_string()))
        };
        let enthalpy = converter(&parameters.enthalpy_unit, "J/mol")?;
        let temperature = converter(&parameters.temperature_unit, "K")?;

        Self::new(
            parameters.p,
            enthalpy.apply(parameters.delta_h_a),
            enthalpy.apply(parameters.delta_h_l),
            enthalpy.apply(parameters.delta_h_h),
            temperature.apply(parameters.t_half_l),
            temperature.apply(parameters.t_half_h),
            temperature.apply(parameters.t_ref),
        )
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    /// Reference temperature in K.
    pub fn t_ref(&self) -> f64 {
        self.t_ref
    }

    #[inline]
    fn arrhenius(enthalpy: f64, t_half: f64, inv_x: f64) -> f64 {
        (enthalpy / GAS_CONSTANT * (1.0 / t_half - inv_x)).exp()
    }
}

impl TryFrom<SchoolfieldParameters> for SchoolfieldIntrinsicGrowth {
    type Error = GrowthMapError;

    fn try_from(value: SchoolfieldParameters) -> Result<Self, Self::Error> {
        Self::from_parameters(value)
    }
}

impl From<SchoolfieldIntrinsicGrowth> for SchoolfieldParameters {
    fn from(value: SchoolfieldIntrinsicGrowth) -> Self {
        SchoolfieldParameters {
            p: value.p,
            delta_h_a: value.delta_h_a,
            delta_h_l: value.delta_h_l,
            delta_h_h: value.delta_h_h,
            t_half_l: value.t_half_l,
            t_half_h: value.t_half_h,
            t_ref: value.t_ref,
            enthalpy_unit: default_enthalpy_unit(),
            temperature_unit: default_temperature_unit(),
        }
    }
}

#[typetag::serde]
impl RateModel for SchoolfieldIntrinsicGrowth {
    fn rate(&self, x: f64) -> f64 {
        let inv_x = 1.0 / x;
        let activation =
            self.p * (x / self.t_ref) * Self::arrhenius(self.delta_h_a, self.t_ref, inv_x);
        let inactivation = 1.0
            + Self::arrhenius(self.delta_h_l, self.t_half_l, inv_x)
            + Self::arrhenius(self.delta_h_h, self.t_half_h, inv_x);
        activation / inactivation
    }

    fn input_unit(&self) -> &str {
        "K"
    }

    fn parameters(&self) -> Vec<Parameter> {
        let positive = (0.0, f64::INFINITY);
        vec![
            Parameter::new("p", self.p, positive),
            Parameter::unbounded("delta_h_a", self.delta_h_a),
            Parameter::new("delta_h_l", self.delta_h_l, (f64::NEG_INFINITY, 0.0)),
            Parameter::new("delta_h_h", self.delta_h_h, positive),
            Parameter::new("t_half_l", self.t_half_l, positive),
            Parameter::new("t_half_h", self.t_half_h, positive),
            Parameter::new("t_ref", self.t_ref, positive),
        ]
    }

    fn with_parameters(&self, values: &[f64]) -> GrowthMapResult<Box<dyn RateModel>> {
        check_parameter_values(MODEL, 7, values)?;
        Ok(Box::new(Self::new(
            values[0], values[1], values[2], values[3], values[4], values[5], values[6],
        )?))
    }
}
