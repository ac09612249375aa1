use growthmaps_core::errors::GrowthMapResult;
use growthmaps_core::rate_model::{check_parameter_values, Parameter, RateModel};
use serde::{Deserialize, Serialize};

use super::default_unit;

/// Stress applied above a threshold, such as heat or wilting stress.
///
/// `rate = (x - threshold) * mortality_rate` when `x > threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpperStress {
    /// Value above which the stress applies
    /// unit: `unit`
    pub threshold: f64,

    /// Change in growth rate per unit above the threshold
    /// unit: rate per `unit`
    pub mortality_rate: f64,

    /// Unit of `threshold` and of the input
    /// default: "1"
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl UpperStress {
    pub fn new(threshold: f64, mortality_rate: f64, unit: &str) -> Self {
        Self {
            threshold,
            mortality_rate,
            unit: unit.to_string(),
        }
    }
}

#[typetag::serde]
impl RateModel for UpperStress {
    fn rate(&self, x: f64) -> f64 {
        (x - self.threshold) * self.mortality_rate
    }

    fn condition(&self, x: f64) -> bool {
        x > self.threshold
    }

    fn input_unit(&self) -> &str {
        &self.unit
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::unbounded("threshold", self.threshold),
            Parameter::unbounded("mortality_rate", self.mortality_rate),
        ]
    }

    fn with_parameters(&self, values: &[f64]) -> GrowthMapResult<Box<dyn RateModel>> {
        check_parameter_values("UpperStress", 2, values)?;
        Ok(Box::new(Self::new(values[0], values[1], &self.unit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_above_threshold() {
        let stress = UpperStress::new(6.0, -2.0, "K");
        assert!(stress.condition(6.001));
        assert!(!stress.condition(6.0));
        assert!(!stress.condition(0.0));
    }

    #[test]
    fn conditional_rate() {
        let stress = UpperStress::new(6.0, -2.0, "K");
        assert_eq!(stress.conditional_rate(9.0), -6.0);
        assert_eq!(stress.conditional_rate(0.0), 0.0);
        // The ungated rate is positive below the threshold
        assert_eq!(stress.rate(0.0), 12.0);
    }

    #[test]
    fn nan_input_is_inactive() {
        let stress = UpperStress::new(6.0, -2.0, "K");
        assert_eq!(stress.conditional_rate(f64::NAN), 0.0);
    }
}
