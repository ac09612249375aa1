//! Minimal rate models used by the unit tests of this crate.

use crate::errors::GrowthMapResult;
use crate::rate_model::{check_parameter_values, Parameter, RateModel};
use serde::{Deserialize, Serialize};

/// `rate = slope * x`, always active, on dimensionless input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Linear {
    pub slope: f64,
}

#[typetag::serde]
impl RateModel for Linear {
    fn rate(&self, x: f64) -> f64 {
        self.slope * x
    }

    fn input_unit(&self) -> &str {
        "1"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![Parameter::unbounded("slope", self.slope)]
    }

    fn with_parameters(&self, values: &[f64]) -> GrowthMapResult<Box<dyn RateModel>> {
        check_parameter_values("Linear", 1, values)?;
        Ok(Box::new(Linear { slope: values[0] }))
    }
}

/// `rate = (threshold - x) * slope`, active below `threshold`, on input in kelvin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Threshold {
    pub threshold: f64,
    pub slope: f64,
}

#[typetag::serde]
impl RateModel for Threshold {
    fn rate(&self, x: f64) -> f64 {
        (self.threshold - x) * self.slope
    }

    fn condition(&self, x: f64) -> bool {
        x < self.threshold
    }

    fn input_unit(&self) -> &str {
        "K"
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            Parameter::unbounded("threshold", self.threshold),
            Parameter::unbounded("slope", self.slope),
        ]
    }

    fn with_parameters(&self, values: &[f64]) -> GrowthMapResult<Box<dyn RateModel>> {
        check_parameter_values("Threshold", 2, values)?;
        Ok(Box::new(Threshold {
            threshold: values[0],
            slope: values[1],
        }))
    }
}
