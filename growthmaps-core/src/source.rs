//! Time-ordered sources of raster stacks.
//!
//! The aggregation engine only ever reads through [`DataSource`], so a source may hold
//! every stack in memory ([`MemorySource`]) or load layers lazily from disk on request.

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::stack::Stack;
use crate::timespan::{window_indices, Timestamp};
use indexmap::{IndexMap, IndexSet};
use ndarray::{ArrayViewMut2, CowArray, Ix2};
use std::ops::Range;

/// A sequence of `(timestamp, stack)` pairs in time order.
///
/// Implementors provide the sorted timestamps and access to one layer of one stack.
/// The remaining methods are built on top of those.
pub trait DataSource {
    /// Timestamps of every stack, sorted ascending.
    fn timestamps(&self) -> &[Timestamp];

    /// Every key that at least one stack provides.
    fn keys_available(&self) -> Vec<String>;

    /// Read the layer `key` of the stack at `index`.
    ///
    /// Returns [`GrowthMapError::MissingKey`] if that stack does not provide `key`.
    fn read_layer(&self, index: usize, key: &str) -> GrowthMapResult<CowArray<'_, f64, Ix2>>;

    /// Sentinel marking missing data in layer `key`, if the source defines one.
    ///
    /// NaN is always treated as missing.
    fn missing_value(&self, _key: &str) -> Option<f64> {
        None
    }

    fn len(&self) -> usize {
        self.timestamps().len()
    }

    fn is_empty(&self) -> bool {
        self.timestamps().is_empty()
    }

    fn timestamp(&self, index: usize) -> GrowthMapResult<Timestamp> {
        self.timestamps().get(index).copied().ok_or_else(|| {
            GrowthMapError::Error(format!(
                "stack index {index} is out of range for a source of {} stacks",
                self.len()
            ))
        })
    }

    /// Overwrite `out` with layer `key` of the stack at `index`.
    fn copy_layer(
        &self,
        index: usize,
        key: &str,
        mut out: ArrayViewMut2<'_, f64>,
    ) -> GrowthMapResult<()> {
        let layer = self.read_layer(index, key)?;
        if layer.dim() != out.dim() {
            return Err(GrowthMapError::ShapeMismatch {
                key: key.to_string(),
                timestamp: self.timestamp(index)?,
                expected: out.dim(),
                found: layer.dim(),
            });
        }
        out.assign(&layer);
        Ok(())
    }

    /// Indices of the stacks with `start <= t < end`.
    fn window(&self, start: Timestamp, end: Timestamp) -> Range<usize> {
        window_indices(start, end, self.timestamps())
    }

    /// Load the stack at `index`, restricted to `keys`.
    fn read_stack(&self, index: usize, keys: &[String]) -> GrowthMapResult<Stack> {
        let mut stack = Stack::new();
        for key in keys {
            stack.insert(key.clone(), self.read_layer(index, key)?.into_owned())?;
        }
        Ok(stack)
    }

    /// Every `(timestamp, stack)` pair with `start <= t < end`, restricted to `keys`.
    fn stacks_in_window(
        &self,
        start: Timestamp,
        end: Timestamp,
        keys: &[String],
    ) -> GrowthMapResult<Vec<(Timestamp, Stack)>> {
        self.window(start, end)
            .map(|index| -> GrowthMapResult<(Timestamp, Stack)> {
                Ok((self.timestamp(index)?, self.read_stack(index, keys)?))
            })
            .collect()
    }
}

/// An in-memory series of stacks.
///
/// Stacks are kept sorted by timestamp; stacks sharing a timestamp keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    timestamps: Vec<Timestamp>,
    stacks: Vec<Stack>,
    missing_values: IndexMap<String, f64>,
}

impl MemorySource {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Timestamp, Stack)>,
    {
        let mut source = Self::default();
        for (timestamp, stack) in entries {
            source.push(timestamp, stack);
        }
        source
    }

    /// Insert a stack at its sorted position.
    pub fn push(&mut self, timestamp: Timestamp, stack: Stack) {
        let index = self.timestamps.partition_point(|t| *t <= timestamp);
        self.timestamps.insert(index, timestamp);
        self.stacks.insert(index, stack);
    }

    /// Declare the sentinel used for missing cells in layer `key`.
    pub fn with_missing_value(mut self, key: impl Into<String>, value: f64) -> Self {
        self.missing_values.insert(key.into(), value);
        self
    }

    pub fn stacks(&self) -> impl Iterator<Item = (&Timestamp, &Stack)> {
        self.timestamps.iter().zip(self.stacks.iter())
    }
}

impl DataSource for MemorySource {
    fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    fn keys_available(&self) -> Vec<String> {
        let keys: IndexSet<&str> = self.stacks.iter().flat_map(|stack| stack.keys()).collect();
        keys.into_iter().map(str::to_string).collect()
    }

    fn read_layer(&self, index: usize, key: &str) -> GrowthMapResult<CowArray<'_, f64, Ix2>> {
        let timestamp = self.timestamp(index)?;
        self.stacks[index]
            .get(key)
            .map(|layer| CowArray::from(layer.view()))
            .ok_or_else(|| GrowthMapError::MissingKey {
                key: key.to_string(),
                timestamp,
            })
    }

    fn missing_value(&self, key: &str) -> Option<f64> {
        self.missing_values.get(key).copied()
    }
}
