use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::source::DataSource;
use indexmap::IndexMap;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// A named collection of same-shaped 2D arrays for one timestamp.
///
/// Layers keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    layers: IndexMap<String, Array2<f64>>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stack from `(key, array)` pairs, checking that every array has the same shape.
    pub fn from_layers<K, I>(layers: I) -> GrowthMapResult<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Array2<f64>)>,
    {
        let mut stack = Self::new();
        for (key, layer) in layers {
            stack.insert(key, layer)?;
        }
        Ok(stack)
    }

    /// Allocate a memory-backed buffer holding only `keys`, every cell set to NaN.
    ///
    /// The buffer is filled in place with [`Stack::copy_from`] and never resized.
    pub fn allocate<K, I>(keys: I, shape: (usize, usize)) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        Self {
            layers: keys
                .into_iter()
                .map(|key| (key.into(), Array2::from_elem(shape, f64::NAN)))
                .collect(),
        }
    }

    /// Add or replace a layer.
    ///
    /// Fails if the layer's shape differs from the layers already present.
    pub fn insert(&mut self, key: impl Into<String>, layer: Array2<f64>) -> GrowthMapResult<()> {
        let key = key.into();
        if let Some(expected) = self.shape() {
            if layer.dim() != expected {
                return Err(GrowthMapError::StackShape {
                    key,
                    expected,
                    found: layer.dim(),
                });
            }
        }
        self.layers.insert(key, layer);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Array2<f64>> {
        self.layers.get(key)
    }

    /// A view of the layer named `key`.
    pub fn layer(&self, key: &str) -> GrowthMapResult<ArrayView2<'_, f64>> {
        self.layers
            .get(key)
            .map(|layer| layer.view())
            .ok_or_else(|| GrowthMapError::KeyNotInStack(key.to_string()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array2<f64>)> {
        self.layers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Spatial shape shared by every layer, or `None` for an empty stack.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.layers.values().next().map(|layer| layer.dim())
    }

    /// Overwrite every layer of this stack with the source's data at `index`.
    ///
    /// Only the keys already present are copied. Any missing key or shape mismatch is an
    /// error, so stale data from an earlier copy is never silently reused.
    pub fn copy_from<S>(&mut self, source: &S, index: usize) -> GrowthMapResult<()>
    where
        S: DataSource + ?Sized,
    {
        for (key, layer) in self.layers.iter_mut() {
            source.copy_layer(index, key, layer.view_mut())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn insert_checks_shape() {
        let mut stack = Stack::new();
        stack.insert("tas", array![[1.0, 2.0]]).unwrap();
        let err = stack.insert("swc", array![[1.0], [2.0]]).unwrap_err();
        assert!(matches!(
            err,
            GrowthMapError::StackShape {
                expected: (1, 2),
                found: (2, 1),
                ..
            }
        ));
        // Replacing a layer with the same shape is fine
        stack.insert("tas", array![[3.0, 4.0]]).unwrap();
        assert_eq!(stack.get("tas"), Some(&array![[3.0, 4.0]]));
    }

    #[test]
    fn allocate_fills_with_nan() {
        let stack = Stack::allocate(["a", "b"], (2, 3));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.shape(), Some((2, 3)));
        assert!(stack.get("a").unwrap().iter().all(|v| v.is_nan()));
        assert_eq!(stack.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn missing_layer() {
        let stack = Stack::from_layers([("tas", array![[1.0]])]).unwrap();
        assert!(stack.layer("tas").is_ok());
        assert!(matches!(
            stack.layer("swc"),
            Err(GrowthMapError::KeyNotInStack(key)) if key == "swc"
        ));
        assert_eq!(Stack::new().shape(), None);
    }
}
