//! Document store over the MongoDB Data API.

use async_trait::async_trait;
use crc_weekly_adapters::data_api::DataApiStore;
use crc_weekly_adapters::AdapterError;

use super::{Document, DocumentStore};
use crate::error::FetchError;

/// [`DocumentStore`] wrapper around the adapters crate's [`DataApiStore`].
#[derive(Debug, Clone)]
pub struct HttpStore {
    inner: DataApiStore,
    description: String,
}

impl HttpStore {
    pub fn new(inner: DataApiStore) -> Self {
        let description = format!("data-api: {} ({})", inner.endpoint(), inner.database());
        Self { inner, description }
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn find(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        self.inner
            .find(collection)
            .await
            .map_err(|e| fetch_error(&self.description, e))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn fetch_error(store: &str, err: AdapterError) -> FetchError {
    let store = store.to_string();
    let reason = err.to_string();
    match err {
        e if e.is_unreachable() => FetchError::Unreachable { store, reason },
        AdapterError::Parse(_) => FetchError::Parse { store, reason },
        _ => FetchError::Query { store, reason },
    }
}
