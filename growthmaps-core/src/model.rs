//! Composition of layers into models.
//!
//! A [`Model`] is an ordered list of layers whose conditional rates are summed
//! per grid cell. A [`ModelSet`] groups several named models so they can share one
//! pass over the data source; each model produces its own output.

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::layer::Layer;
use crate::stack::Stack;
use indexmap::{IndexMap, IndexSet};
use ndarray::{Array2, ArrayView2, ArrayViewMut2, Zip};
use serde::{Deserialize, Serialize};

/// An ordered collection of layers defining one growth-rate computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    layers: Vec<Layer>,
}

impl Model {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Append a layer.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The data keys required by this model, deduplicated in layer order.
    pub fn keys(&self) -> IndexSet<&str> {
        self.layers.iter().map(Layer::key).collect()
    }

    /// Sum of the conditional rates of every layer for a single cell.
    ///
    /// `value_of` supplies the raw value for a data key.
    pub fn combine_cell(&self, value_of: impl Fn(&str) -> f64) -> f64 {
        self.layers
            .iter()
            .fold(0.0, |acc, layer| acc + layer.conditional_rate(value_of(layer.key())))
    }

    /// Sum of the conditional rates of every layer, for every cell of `stack`.
    ///
    /// A model without layers produces zeros.
    pub fn combine_layers(&self, stack: &Stack) -> GrowthMapResult<Array2<f64>> {
        let mut out = Array2::zeros(stack.shape().unwrap_or((0, 0)));
        self.combine_into(stack, out.view_mut(), false)?;
        Ok(out)
    }

    /// Add the per-cell sum of conditional rates into `out`.
    ///
    /// Layers are summed in order within each cell before the total is added to `out`.
    /// With `parallel` the cells are evaluated on the current rayon pool; the per-cell
    /// order is unchanged so the result is identical to the serial one.
    pub fn combine_into(
        &self,
        stack: &Stack,
        mut out: ArrayViewMut2<'_, f64>,
        parallel: bool,
    ) -> GrowthMapResult<()> {
        let inputs = self
            .layers
            .iter()
            .map(|layer| {
                let input = stack.layer(layer.key())?;
                if input.dim() != out.dim() {
                    return Err(GrowthMapError::StackShape {
                        key: layer.key().to_string(),
                        expected: out.dim(),
                        found: input.dim(),
                    });
                }
                Ok((layer, input))
            })
            .collect::<GrowthMapResult<Vec<(&Layer, ArrayView2<'_, f64>)>>>()?;

        if inputs.is_empty() {
            return Ok(());
        }

        let cell = |(i, j): (usize, usize), o: &mut f64| {
            let total = inputs
                .iter()
                .fold(0.0, |acc, (layer, input)| {
                    acc + layer.conditional_rate(input[[i, j]])
                });
            *o += total;
        };

        if parallel {
            Zip::indexed(out.view_mut()).par_for_each(cell);
        } else {
            Zip::indexed(out.view_mut()).for_each(cell);
        }
        Ok(())
    }
}

impl From<Layer> for Model {
    fn from(layer: Layer) -> Self {
        Self::new(vec![layer])
    }
}

impl From<Vec<Layer>> for Model {
    fn from(layers: Vec<Layer>) -> Self {
        Self::new(layers)
    }
}

impl FromIterator<Layer> for Model {
    fn from_iter<T: IntoIterator<Item = Layer>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Named models evaluated against one shared data load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSet {
    models: IndexMap<String, Model>,
}

impl ModelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named model. Names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, model: impl Into<Model>) -> GrowthMapResult<()> {
        let name = name.into();
        if self.models.contains_key(&name) {
            return Err(GrowthMapError::DuplicateModel(name));
        }
        self.models.insert(name, model.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Model)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The union of every model's keys, in first-use order.
    pub fn keys(&self) -> IndexSet<&str> {
        self.models.values().flat_map(Model::keys).collect()
    }
}
