//! TOML configuration of an aggregation run.
//!
//! ```toml
//! initial_value = 0.0
//!
//! [timespan]
//! start = "2016-01-03T00:00:00"
//! period = "1 month"
//! count = 12
//!
//! [[models.cold.layers]]
//! key = "tas"
//! unit = "degC"
//! model = { type = "LowerStress", threshold = 5.0, mortality_rate = -1.0, unit = "degC" }
//! ```
//!
//! `start` is a quoted ISO 8601 date-time. Layers are validated while the document is
//! read, so unknown or incompatible units are reported before any data is touched.

use crate::errors::{GrowthMapError, GrowthMapResult};
use crate::growth::{GrowthMapBuilder, GrowthMaps};
use crate::model::ModelSet;
use crate::source::DataSource;
use crate::timespan::Timespan;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthMapConfig {
    pub timespan: Timespan,
    /// Value every output cell starts from
    ///
    /// default: 0.0
    #[serde(default)]
    pub initial_value: f64,
    /// Evaluate grid cells in parallel
    ///
    /// default: false
    #[serde(default)]
    pub parallel: bool,
    /// Size of a dedicated thread pool; implies `parallel`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// Named models, each producing its own output
    pub models: ModelSet,
}

impl GrowthMapConfig {
    pub fn from_toml(document: &str) -> GrowthMapResult<Self> {
        Ok(toml::from_str(document)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> GrowthMapResult<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            GrowthMapError::Config(format!("could not read {}: {e}", path.display()))
        })?;
        Self::from_toml(&document)
    }

    pub fn to_toml(&self) -> GrowthMapResult<String> {
        toml::to_string(self).map_err(|e| GrowthMapError::Config(e.to_string()))
    }

    /// A builder preloaded with this configuration.
    pub fn builder(&self) -> GrowthMapBuilder {
        let mut builder = GrowthMapBuilder::new();
        builder
            .with_models(self.models.clone())
            .with_timespan(self.timespan.clone())
            .with_initial_value(self.initial_value)
            .with_parallel(self.parallel);
        if let Some(threads) = self.threads {
            builder.with_threads(threads);
        }
        builder
    }

    /// Build and run the configured models over `source`.
    pub fn run<S>(&self, source: &S) -> GrowthMapResult<GrowthMaps>
    where
        S: DataSource + ?Sized,
    {
        self.builder().build()?.run(source)
    }
}
