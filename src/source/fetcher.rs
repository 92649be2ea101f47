//! Maps logical sources to stores and collections.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::{Document, DocumentStore, Source};
use crate::error::FetchError;

#[derive(Debug, Clone)]
struct Binding {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl Binding {
    fn same_target(&self, other: &Binding) -> bool {
        Arc::as_ptr(&self.store) as *const () == Arc::as_ptr(&other.store) as *const ()
            && self.collection == other.collection
    }
}

/// Documents for every configured source, fetched within one refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    collections: BTreeMap<Source, Vec<Document>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: Source, docs: Vec<Document>) {
        self.collections.insert(source, docs);
    }

    /// Documents of `source`, or `None` if it was not fetched.
    pub fn documents(&self, source: Source) -> Option<&[Document]> {
        self.collections.get(&source).map(Vec::as_slice)
    }

    pub fn contains(&self, source: Source) -> bool {
        self.collections.contains_key(&source)
    }

    /// Total number of documents across sources.
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads each logical [`Source`] from its configured store and collection.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use crc_weekly::{ChannelStore, Collections, Fetcher, Source};
///
/// let store = Arc::new(ChannelStore::with_collections(Collections::new()));
/// let fetcher = Fetcher::builder()
///     .source(Source::Statistics, store.clone(), "statistics")
///     .source(Source::ServiceUnits, store, "sus")
///     .build();
///
/// assert_eq!(fetcher.sources().count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    bindings: BTreeMap<Source, Binding>,
}

impl Fetcher {
    pub fn builder() -> FetcherBuilder {
        FetcherBuilder::default()
    }

    /// Sources this fetcher can read.
    pub fn sources(&self) -> impl Iterator<Item = Source> + '_ {
        self.bindings.keys().copied()
    }

    /// Fetch all documents of one source.
    pub async fn fetch(&self, source: Source) -> Result<Vec<Document>, FetchError> {
        let binding = self
            .bindings
            .get(&source)
            .ok_or(FetchError::NotConfigured(source))?;
        Self::fetch_binding(source, binding).await
    }

    /// Fetch every configured source.
    ///
    /// Sources bound to the same store and collection are read once. The
    /// first failure aborts the whole snapshot.
    pub async fn fetch_all(&self) -> Result<Snapshot, FetchError> {
        let mut snapshot = Snapshot::new();
        let mut fetched: Vec<(Source, &Binding)> = Vec::new();

        for (source, binding) in &self.bindings {
            let shared = fetched
                .iter()
                .find(|(_, earlier)| earlier.same_target(binding))
                .map(|(earlier, _)| *earlier);

            let docs = match shared.and_then(|earlier| snapshot.documents(earlier)) {
                Some(docs) => {
                    debug!(%source, collection = %binding.collection, "reusing fetched collection");
                    docs.to_vec()
                }
                None => Self::fetch_binding(*source, binding).await?,
            };

            snapshot.insert(*source, docs);
            fetched.push((*source, binding));
        }

        Ok(snapshot)
    }

    async fn fetch_binding(source: Source, binding: &Binding) -> Result<Vec<Document>, FetchError> {
        let started = Instant::now();
        let docs = binding.store.find(&binding.collection).await?;
        info!(
            %source,
            collection = %binding.collection,
            store = binding.store.description(),
            documents = docs.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched collection"
        );
        Ok(docs)
    }
}

/// Builder for [`Fetcher`].
#[derive(Debug, Default)]
pub struct FetcherBuilder {
    bindings: BTreeMap<Source, Binding>,
}

impl FetcherBuilder {
    /// Read `source` from `collection` of `store`.
    pub fn source(
        mut self,
        source: Source,
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
    ) -> Self {
        self.bindings.insert(
            source,
            Binding {
                store,
                collection: collection.into(),
            },
        );
        self
    }

    pub fn build(self) -> Fetcher {
        Fetcher {
            bindings: self.bindings,
        }
    }
}
