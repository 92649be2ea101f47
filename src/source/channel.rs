//! Channel-based document store.
//!
//! Serves collections pushed through a tokio watch channel. Useful when the
//! ingestion job runs in the same process, and for tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::watch;

use super::{Document, DocumentStore};
use crate::error::FetchError;

/// Every collection's documents, keyed by collection name.
pub type Collections = BTreeMap<String, Vec<Document>>;

/// A document store that serves the latest collections sent through a channel.
///
/// The producer replaces the whole set of collections at once, so a pipeline
/// run never observes a half-updated snapshot. The last value stays readable
/// after the sender is dropped.
///
/// # Example
///
/// ```
/// use crc_weekly::{ChannelStore, Collections};
///
/// let (tx, store) = ChannelStore::create("ingest");
/// tx.send(Collections::new()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ChannelStore {
    receiver: watch::Receiver<Collections>,
    description: String,
}

impl ChannelStore {
    /// Create a new channel store.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - Where the collections come from
    pub fn new(receiver: watch::Receiver<Collections>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a channel pair; the sender replaces the served collections.
    pub fn create(source_description: &str) -> (watch::Sender<Collections>, Self) {
        let (tx, rx) = watch::channel(Collections::new());
        (tx, Self::new(rx, source_description))
    }

    /// A store serving a fixed set of collections.
    pub fn with_collections(collections: Collections) -> Self {
        let (_tx, rx) = watch::channel(collections);
        Self::new(rx, "static")
    }
}

#[async_trait]
impl DocumentStore for ChannelStore {
    async fn find(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        Ok(self
            .receiver
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
