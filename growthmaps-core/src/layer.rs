use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::rate_model::RateModel;
use crate::units::{Unit, UnitConverter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn dimensionless() -> String {
    "1".to_string()
}

/// Serialised form of a [`Layer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDefinition {
    /// Name of the raster in the data source
    pub key: String,
    /// Unit of the raw raster values
    ///
    /// default: `"1"` (dimensionless)
    #[serde(default = "dimensionless")]
    pub unit: String,
    pub model: Arc<dyn RateModel>,
}

/// A rate model bound to a named input raster and the unit of its raw values.
///
/// Raw values are converted into the model's input unit before every evaluation.
/// The conversion is resolved when the layer is built, so a unit that cannot be
/// converted is reported before any data is read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LayerDefinition", into = "LayerDefinition")]
pub struct Layer {
    key: String,
    unit: Unit,
    model: Arc<dyn RateModel>,
    converter: UnitConverter,
}

impl Layer {
    /// Bind `model` to the raster `key` whose values are in `unit`.
    pub fn new<M: RateModel + 'static>(
        key: impl Into<String>,
        unit: &str,
        model: M,
    ) -> GrowthMapResult<Self> {
        Self::from_arc(key, unit, Arc::new(model))
    }

    pub fn from_arc(
        key: impl Into<String>,
        unit: &str,
        model: Arc<dyn RateModel>,
    ) -> GrowthMapResult<Self> {
        let key = key.into();
        let parse = |unit: &str| {
            Unit::parse(unit).map_err(|source| GrowthMapError::UnitParse {
                unit: unit.to_string(),
                source,
            })
        };
        let unit = parse(unit)?;
        let target = parse(model.input_unit())?;
        let converter =
            unit.converter(&target)
                .map_err(|source| GrowthMapError::IncompatibleUnits {
                    key: key.clone(),
                    from: unit.original().to_string(),
                    to: target.original().to_string(),
                    source,
                })?;

        Ok(Self {
            key,
            unit,
            model,
            converter,
        })
    }

    /// The data key this layer reads.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn model(&self) -> &dyn RateModel {
        self.model.as_ref()
    }

    pub fn converter(&self) -> UnitConverter {
        self.converter
    }

    #[inline]
    fn convert(&self, raw: f64) -> f64 {
        self.converter.apply(raw)
    }

    pub fn rate(&self, raw: f64) -> f64 {
        self.model.rate(self.convert(raw))
    }

    pub fn condition(&self, raw: f64) -> bool {
        self.model.condition(self.convert(raw))
    }

    #[inline]
    pub fn conditional_rate(&self, raw: f64) -> f64 {
        self.model.conditional_rate(self.convert(raw))
    }

    /// The conditional rate of this layer's model rebuilt with `params`, for each raw value.
    ///
    /// Values in `xs` are in the layer's unit and are converted like raster data.
    pub fn evaluate(&self, params: &[f64], xs: &[f64]) -> GrowthMapResult<Vec<f64>> {
        let model = self.model.with_parameters(params)?;
        Ok(xs
            .iter()
            .map(|&x| model.conditional_rate(self.convert(x)))
            .collect())
    }

    /// A copy of this layer with the model rebuilt from `params`.
    pub fn with_parameters(&self, params: &[f64]) -> GrowthMapResult<Self> {
        Ok(Self {
            model: Arc::from(self.model.with_parameters(params)?),
            ..self.clone()
        })
    }
}

impl TryFrom<LayerDefinition> for Layer {
    type Error = GrowthMapError;

    fn try_from(value: LayerDefinition) -> Result<Self, Self::Error> {
        Layer::from_arc(value.key, &value.unit, value.model)
    }
}

impl From<Layer> for LayerDefinition {
    fn from(value: Layer) -> Self {
        LayerDefinition {
            key: value.key,
            unit: value.unit.original().to_string(),
            model: value.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_models::{Linear, Threshold};
    use approx::assert_relative_eq;

    #[test]
    fn converts_celsius_before_evaluation() {
        let layer = Layer::new(
            "tas",
            "degC",
            Threshold {
                threshold: 278.15,
                slope: -1.0,
            },
        )
        .unwrap();
        // 1 degC is 274.15 K, 4 K below the threshold
        assert_relative_eq!(layer.conditional_rate(1.0), -4.0, epsilon = 1e-9);
        assert!(layer.condition(4.9));
        assert!(!layer.condition(5.0));
        assert_eq!(layer.conditional_rate(6.0), 0.0);
    }

    #[test]
    fn same_unit_is_identity() {
        let layer = Layer::new("tas", "K", Threshold {
            threshold: 5.0,
            slope: -1.0,
        })
        .unwrap();
        assert!(layer.converter().is_identity());
        assert_eq!(layer.rate(1.0), -4.0);
    }

    #[test]
    fn incompatible_units_are_rejected() {
        let err = Layer::new("tas", "J/mol", Threshold {
            threshold: 5.0,
            slope: -1.0,
        })
        .unwrap_err();
        assert!(matches!(err, GrowthMapError::IncompatibleUnits { ref key, .. } if key == "tas"));

        let err = Layer::new("swc", "furlong", Linear { slope: 1.0 }).unwrap_err();
        assert!(matches!(err, GrowthMapError::UnitParse { .. }));
    }

    #[test]
    fn oversized_exponents_are_parse_errors() {
        for unit in ["J^64", "m^200"] {
            let err = Layer::new("swc", unit, Linear { slope: 1.0 }).unwrap_err();
            assert!(
                matches!(err, GrowthMapError::UnitParse { unit: ref u, .. } if u == unit),
                "{unit}: {err}"
            );
        }
    }

    #[test]
    fn evaluate_with_new_parameters() {
        let layer = Layer::new("swc", "percent", Linear { slope: 1.0 }).unwrap();
        let ys = layer.evaluate(&[2.0], &[50.0, 100.0]).unwrap();
        assert_relative_eq!(ys[0], 1.0);
        assert_relative_eq!(ys[1], 2.0);

        assert!(layer.evaluate(&[1.0, 2.0], &[1.0]).is_err());

        let refit = layer.with_parameters(&[3.0]).unwrap();
        assert_relative_eq!(refit.rate(100.0), 3.0);
        assert_relative_eq!(layer.rate(100.0), 1.0);
    }

    #[test]
    fn serde_roundtrip() {
        let json = r#"{"key":"swc","model":{"type":"Linear","slope":2.0}}"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.key(), "swc");
        assert_eq!(layer.unit().original(), "1");

        let out = serde_json::to_string(&layer).unwrap();
        assert_eq!(
            out,
            r#"{"key":"swc","unit":"1","model":{"type":"Linear","slope":2.0}}"#
        );

        let bad = r#"{"key":"swc","unit":"K","model":{"type":"Linear","slope":2.0}}"#;
        assert!(serde_json::from_str::<Layer>(bad).is_err());
    }
}
