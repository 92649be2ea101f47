//! Transformation of statistics documents into plot-ready series.
//!
//! ## Submodules
//!
//! - [`dates`]: Parsing `end_date` text and formatting axis labels
//! - [`periods`]: Pairing documents with parsed dates in chronological order
//! - [`rolling`]: Rolling means and percentage helpers
//! - [`fields`]: Lenient numeric/text access on documents
//! - [`family`]: [`SeriesFamily`] and [`Cluster`]
//! - [`cluster`], [`service_units`], [`storage`]: One transformer per family
//!
//! ## Data Flow
//!
//! ```text
//! Vec<Document> (one collection)
//!        │
//!        ▼
//! periods::chronological()  ── malformed end_date aborts the series
//!        │
//!        ▼
//! Transformer::transform(family)
//!        │
//!        ├──▶ cluster::transform()        (percent allocated, rolling mean)
//!        ├──▶ service_units::transform()  (cutoff, sentinel, sum over clusters)
//!        └──▶ storage::transform()        (cutoff, pass-through)
//!        │
//!        ▼
//! SeriesBundle
//! ```

pub mod cluster;
pub mod dates;
pub mod family;
pub mod fields;
pub mod periods;
pub mod rolling;
pub mod service_units;
pub mod storage;

pub use dates::DateFormats;
pub use family::{Cluster, SeriesFamily};

use chrono::NaiveDate;
use crc_weekly_types::SeriesBundle;

use crate::error::TransformError;
use crate::source::Document;

/// Title of the shared date axis.
pub const X_AXIS_TITLE: &str = "Week End Date (MM/DD/YY)";

/// Default rolling-mean window, in periods (weeks).
pub const DEFAULT_ROLLING_WINDOW: usize = 6;

/// Settings that shape every transformation.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    pub formats: DateFormats,
    pub rolling_window: usize,
    /// Service-unit periods ending on or before this date are dropped.
    pub sus_cutoff: NaiveDate,
    /// Storage periods ending on or before this date are dropped.
    pub storage_cutoff: NaiveDate,
    /// Service-unit documents with `""` in this field are dropped.
    pub sentinel_field: String,
    /// Storage pools to plot, as field prefixes.
    pub storage_pools: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        let cutoff = NaiveDate::from_ymd_opt(2019, 4, 15).unwrap_or_default();
        Self {
            formats: DateFormats::default(),
            rolling_window: DEFAULT_ROLLING_WINDOW,
            sus_cutoff: cutoff,
            storage_cutoff: cutoff,
            sentinel_field: "smp".to_string(),
            storage_pools: vec!["bgfs".to_string(), "zfs".to_string()],
        }
    }
}

/// Turns a collection's documents into a [`SeriesBundle`] for one family.
///
/// Stateless: the same documents always produce the same bundle.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    config: TransformConfig,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn transform(
        &self,
        family: SeriesFamily,
        docs: &[Document],
    ) -> Result<SeriesBundle, TransformError> {
        match family {
            SeriesFamily::Cluster(cluster) => cluster::transform(cluster, docs, &self.config),
            SeriesFamily::ServiceUnits => service_units::transform(docs, &self.config),
            SeriesFamily::Storage => storage::transform(docs, &self.config),
        }
    }
}
