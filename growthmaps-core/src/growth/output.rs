use crate::timespan::Timestamp;
use indexmap::IndexMap;
use ndarray::{Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Mean growth rate per output period for one model.
///
/// The data is shaped `(rows, cols, periods)`. Cells without valid input are NaN in
/// every period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRaster {
    data: Array3<f64>,
    times: Vec<Timestamp>,
    counts: Vec<usize>,
}

impl GrowthRaster {
    pub(crate) fn new(data: Array3<f64>, times: Vec<Timestamp>, counts: Vec<usize>) -> Self {
        Self {
            data,
            times,
            counts,
        }
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    pub fn into_data(self) -> Array3<f64> {
        self.data
    }

    /// Start instant of each period.
    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    /// Number of input timesteps averaged into each period.
    ///
    /// A zero count marks a period without coverage.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Spatial shape `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        let (rows, cols, _) = self.data.dim();
        (rows, cols)
    }

    pub fn n_periods(&self) -> usize {
        self.times.len()
    }

    /// The 2D slice for period `index`.
    pub fn period(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        (index < self.n_periods()).then(|| self.data.index_axis(Axis(2), index))
    }

    /// The slice for the period starting at `time`.
    pub fn at(&self, time: Timestamp) -> Option<ArrayView2<'_, f64>> {
        let index = self.times.iter().position(|t| *t == time)?;
        self.period(index)
    }
}

/// One [`GrowthRaster`] per named model, in the order the models were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowthMaps {
    rasters: IndexMap<String, GrowthRaster>,
}

impl GrowthMaps {
    pub(crate) fn new(rasters: IndexMap<String, GrowthRaster>) -> Self {
        Self { rasters }
    }

    pub fn get(&self, name: &str) -> Option<&GrowthRaster> {
        self.rasters.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GrowthRaster)> {
        self.rasters.iter().map(|(name, raster)| (name.as_str(), raster))
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }

    /// The raster of the only model, or `None` when there is not exactly one.
    pub fn into_single(self) -> Option<GrowthRaster> {
        if self.rasters.len() != 1 {
            return None;
        }
        self.rasters.into_values().next()
    }
}

impl IntoIterator for GrowthMaps {
    type Item = (String, GrowthRaster);
    type IntoIter = indexmap::map::IntoIter<String, GrowthRaster>;

    fn into_iter(self) -> Self::IntoIter {
        self.rasters.into_iter()
    }
}
