//! Document store abstraction for reading statistics collections.
//!
//! This module provides a trait-based abstraction over the places weekly
//! statistics documents can live (a directory of JSON files, an in-process
//! channel, or a remote document database).

mod channel;
#[cfg(feature = "data-api")]
mod data_api;
mod fetcher;
mod file;

pub use channel::{ChannelStore, Collections};
#[cfg(feature = "data-api")]
pub use data_api::HttpStore;
pub use fetcher::{Fetcher, FetcherBuilder, Snapshot};
pub use file::FileStore;

use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::error::FetchError;

/// A semi-structured document (one reporting period).
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Trait for reading whole collections from a document store.
///
/// # Example
///
/// ```
/// use crc_weekly::{ChannelStore, DocumentStore};
///
/// # tokio_test::block_on(async {
/// let (_tx, store) = ChannelStore::create("ingest");
/// let docs = store.find("statistics").await.unwrap();
/// assert!(docs.is_empty());
/// # });
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Return every document of `collection` in insertion order.
    ///
    /// A collection that does not exist is empty, not an error.
    async fn find(&self, collection: &str) -> Result<Vec<Document>, FetchError>;

    /// Returns a human-readable description of the store, for logs.
    fn description(&self) -> &str;
}

/// The logical sources documents are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// Weekly per-cluster utilization.
    Statistics,
    /// Weekly service-unit accounting.
    ServiceUnits,
    /// Weekly storage capacity.
    Storage,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Statistics, Source::ServiceUnits, Source::Storage];

    /// Default collection name for this source.
    pub fn default_collection(&self) -> &'static str {
        match self {
            Source::Statistics => "statistics",
            Source::ServiceUnits => "sus",
            Source::Storage => "storage",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_collection())
    }
}

/// Open a store from a connection string.
///
/// `http://` and `https://` URIs select the Data API store (authenticated with
/// `secret`); `file://` URIs and plain paths select a [`FileStore`].
pub fn open_store(uri: &str, secret: Option<&str>) -> Result<Arc<dyn DocumentStore>> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return open_http_store(uri, secret);
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        if scheme != "file" {
            bail!("Unsupported store scheme {:?} in {}", scheme, uri);
        }
    }
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    Ok(Arc::new(FileStore::new(path)))
}

#[cfg(feature = "data-api")]
fn open_http_store(uri: &str, secret: Option<&str>) -> Result<Arc<dyn DocumentStore>> {
    let store = crc_weekly_adapters::data_api::DataApiStore::from_uri(uri, secret.unwrap_or(""))?;
    Ok(Arc::new(data_api::HttpStore::new(store)))
}

#[cfg(not(feature = "data-api"))]
fn open_http_store(uri: &str, _secret: Option<&str>) -> Result<Arc<dyn DocumentStore>> {
    bail!("{} needs the data-api feature", uri)
}
