//! # crc-weekly
//!
//! Backend for the weekly cluster utilization dashboard.
//!
//! An ingestion job stores one document per cluster-week (and one per week
//! for service units and storage). This crate reads those collections, puts
//! the periods in chronological order, derives the plotted columns and
//! publishes one plot-ready [`SeriesBundle`] per panel, refreshed on a timer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           Refresher                              │
//! │  ┌──────────┐    ┌──────────┐    ┌─────────────┐    ┌─────────┐ │
//! │  │  source  │───▶│ pipeline │───▶│    data     │───▶│ publish │ │
//! │  │ (fetch)  │    │ (cycle)  │    │ (transform) │    │ (output)│ │
//! │  └────┬─────┘    └──────────┘    └─────────────┘    └─────────┘ │
//! │       │                                                          │
//! │       ▼                                                          │
//! │  FileStore | ChannelStore | HttpStore                            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DocumentStore`] trait, its implementations, and the
//!   [`Fetcher`] that maps each logical [`Source`] to a store and collection
//! - **[`data`]**: Date normalization, rolling means and one transformer per
//!   [`SeriesFamily`]
//! - **[`pipeline`]**: One fetch-then-transform cycle producing a [`Dashboard`]
//! - **[`publish`]**: Where dashboards go ([`Output`])
//! - **[`refresh`]**: The periodic [`Refresher`]
//! - **[`config`]**: Layered [`DashboardConfig`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # One cycle, written to a file
//! MONGO_URI_STATS=./export MONGO_URI_SUS=./export crc-weekly --once --output dashboard.json
//!
//! # Refresh every ten minutes
//! crc-weekly --config crc-weekly.toml --refresh 600
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::sync::Arc;
//! use crc_weekly::{ChannelStore, Collections, Fetcher, Pipeline, Source, Transformer};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(ChannelStore::with_collections(Collections::new()));
//! let fetcher = Fetcher::builder()
//!     .source(Source::Statistics, store, "statistics")
//!     .build();
//!
//! let dashboard = Pipeline::new(fetcher, Transformer::default()).run().await.unwrap();
//! assert_eq!(dashboard.len(), 4);
//! assert!(dashboard.panel("smp").unwrap().is_empty());
//! # });
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod publish;
pub mod refresh;
pub mod source;

pub use config::DashboardConfig;
pub use data::{Cluster, DateFormats, SeriesFamily, TransformConfig, Transformer};
pub use error::{FetchError, TransformError};
pub use pipeline::Pipeline;
pub use publish::Output;
pub use refresh::{RefreshHandle, Refresher, RefresherBuilder};
#[cfg(feature = "data-api")]
pub use source::HttpStore;
pub use source::{
    open_store, ChannelStore, Collections, Document, DocumentStore, Fetcher, FetcherBuilder,
    FileStore, Snapshot, Source,
};

pub use crc_weekly_types::{Axis, Dashboard, Layout, SeriesBundle, Trace, TraceMode, YAxis};
