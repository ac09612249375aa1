//! The rate model protocol.
//!
//! A rate model maps one environmental value to a contribution to the population
//! growth rate. Growth models are always active. Stress models only contribute when
//! their [`RateModel::condition`] holds, and contribute exactly zero otherwise, so
//! growth and stress contributions can be summed with zero as the neutral element.
//!
//! Rate models are stateless: `rate` and `condition` depend only on the model's
//! parameters and the input value. A new parameter set produces a new model via
//! [`RateModel::with_parameters`] rather than mutating an existing one.
//!
//! No domain checks are made on the input. A value outside a formula's domain
//! (for example 0 K in an absolute-temperature formula) yields NaN or infinity,
//! which propagates unchanged into the output.

use crate::errors::{GrowthMapError, GrowthMapResult};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Describes one fittable parameter of a rate model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    /// Current value, in the model's internal units
    pub value: f64,
    /// Inclusive `(lower, upper)` bounds for an optimiser
    pub bounds: (f64, f64),
}

impl Parameter {
    pub fn new(name: &str, value: f64, bounds: (f64, f64)) -> Self {
        Self {
            name: name.to_string(),
            value,
            bounds,
        }
    }

    /// A parameter with no bounds.
    pub fn unbounded(name: &str, value: f64) -> Self {
        Self::new(name, value, (f64::NEG_INFINITY, f64::INFINITY))
    }
}

/// A process that contributes to the growth rate of a population.
///
/// Implementations are registered with `typetag` so that layers holding a
/// `dyn RateModel` can be serialised, tagged by the implementation's type name.
#[typetag::serde(tag = "type")]
pub trait RateModel: Debug + Send + Sync {
    /// Contribution to the growth rate for input `x`, given in [`RateModel::input_unit`].
    fn rate(&self, x: f64) -> f64;

    /// Whether the model applies at `x`.
    fn condition(&self, _x: f64) -> bool {
        true
    }

    /// [`RateModel::rate`] where the condition holds, otherwise zero.
    fn conditional_rate(&self, x: f64) -> f64 {
        if self.condition(x) {
            self.rate(x)
        } else {
            0.0
        }
    }

    /// The unit `x` must be expressed in before evaluation.
    fn input_unit(&self) -> &str;

    /// Ordered descriptors of the model's fittable parameters.
    fn parameters(&self) -> Vec<Parameter>;

    /// A new model of the same kind with parameter values taken from `values`.
    ///
    /// `values` follows the order of [`RateModel::parameters`].
    fn with_parameters(&self, values: &[f64]) -> GrowthMapResult<Box<dyn RateModel>>;
}

/// Checks a parameter vector before a model is rebuilt from it.
///
/// The vector must have `expected` entries, all finite.
pub fn check_parameter_values(model: &str, expected: usize, values: &[f64]) -> GrowthMapResult<()> {
    if values.len() != expected {
        return Err(GrowthMapError::InvalidParameters {
            model: model.to_string(),
            reason: format!("expected {expected} values, got {}", values.len()),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(GrowthMapError::InvalidParameters {
            model: model.to_string(),
            reason: format!("value {index} is not finite ({})", values[index]),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_models::{Linear, Threshold};

    #[test]
    fn conditional_rate_is_zero_when_inactive() {
        let model = Threshold {
            threshold: 5.0,
            slope: -1.0,
        };
        assert_eq!(model.conditional_rate(1.0), -4.0);
        assert_eq!(model.conditional_rate(5.0), 0.0);
        assert_eq!(model.conditional_rate(6.0), 0.0);
        // `rate` itself is not gated
        assert_eq!(model.rate(6.0), 1.0);
    }

    #[test]
    fn growth_models_are_always_active() {
        let model = Linear { slope: 2.0 };
        assert!(model.condition(-1e9));
        assert_eq!(model.conditional_rate(3.0), 6.0);
    }

    #[test]
    fn with_parameters_builds_a_new_model() {
        let model = Linear { slope: 2.0 };
        let rebuilt = model.with_parameters(&[0.5]).unwrap();
        assert_eq!(rebuilt.rate(4.0), 2.0);
        assert_eq!(model.rate(4.0), 8.0);
        assert_eq!(rebuilt.parameters()[0].value, 0.5);
    }

    #[test]
    fn parameter_vector_is_checked() {
        assert!(check_parameter_values("Linear", 1, &[1.0]).is_ok());
        assert!(matches!(
            check_parameter_values("Linear", 2, &[1.0]),
            Err(GrowthMapError::InvalidParameters { .. })
        ));
        let err = check_parameter_values("Linear", 1, &[f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("not finite"));
    }

    #[test]
    fn trait_objects_serialise_with_a_type_tag() {
        let model: Box<dyn RateModel> = Box::new(Linear { slope: 2.0 });
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#"{"type":"Linear","slope":2.0}"#);

        let back: Box<dyn RateModel> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rate(1.5), 3.0);
    }
}
