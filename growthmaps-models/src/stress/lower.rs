use growthmaps_core::errors::GrowthMapResult;
use growthmaps_core::rate_model::{check_parameter_values, Parameter, RateModel};
use serde::{Deserialize, Serialize};

use super::default_unit;

/// Stress applied below a threshold, such as cold or drought stress.
///
/// `rate = (threshold - x) * mortality_rate` when `x < threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowerStress {
    /// Value below which the stress applies
    /// unit: `unit`
    pub threshold: f64,

    /// Change in growth rate per unit below the threshold
    /// unit: rate per `unit`
    pub mortality_rate: f64,

    /// Unit of `threshold` and of the input
    /// default: "1"
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl LowerStress {
    pub fn new(threshold: f64, mortality_rate: f64, unit: &str) -> Self {
        Self {
            threshold,
            mortality_rate,
            unit: unit.to_string(),
        }
    }
}

#[typetag::serde]
impl RateModel for LowerStress {
    fn rate(&self, x: f64) -> f64 {
        (self.threshold - x) * self.mortality_rate
    }

    fn condition(&self, x: f64) -> bool {
        x < self.threshold
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
        check_parameter_values("LowerStress", 2, values)?;
        Ok(Box::new(Self::new(values[0], values[1], &self.unit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_below_threshold() {
        let stress = LowerStress::new(5.0, -1.0, "K");
        for x in [-100.0, 0.0, 4.999] {
            assert!(stress.condition(x));
        }
        for x in [5.0, 5.001, 300.0] {
            assert!(!stress.condition(x));
        }
    }

    #[test]
    fn conditional_rate() {
        let stress = LowerStress::new(5.0, -1.0, "K");
        assert_eq!(stress.conditional_rate(1.0), -4.0);
        assert_eq!(stress.conditional_rate(6.0), 0.0);
    }

    #[test]
    fn refit_keeps_the_unit() {
        let stress = LowerStress::new(5.0, -1.0, "degC");
        let refit = stress.with_parameters(&[2.0, -0.5]).unwrap();
        assert_eq!(refit.input_unit(), "degC");
        assert_eq!(refit.conditional_rate(0.0), -1.0);
        assert!(stress.with_parameters(&[2.0]).is_err());
    }

    #[test]
    fn unit_defaults_to_dimensionless() {
        let stress: LowerStress =
            serde_json::from_str(r#"{"threshold": 0.2, "mortality_rate": -3.0}"#).unwrap();
        assert_eq!(stress.unit, "1");
    }
}
