//! MongoDB Data API adapter.
//!
//! Reads whole collections through the HTTPS `action/find` endpoint. The
//! connection string is the endpoint URL with the database and data source
//! given as query parameters:
//!
//! ```text
//! https://data.mongodb-api.com/app/<app-id>/endpoint/data/v1?database=crc&dataSource=Cluster0
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use crc_weekly_adapters::data_api::DataApiStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DataApiStore::from_uri(
//!         "https://data.mongodb-api.com/app/crc-abcde/endpoint/data/v1?database=crc",
//!         "secret",
//!     )?;
//!
//!     for doc in store.find("sus").await? {
//!         println!("{:?}", doc.get("end_date"));
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AdapterError, Document};

const DEFAULT_DATA_SOURCE: &str = "mongodb-atlas";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The server applies a 1000-document limit when none is sent.
const DEFAULT_PAGE_SIZE: u64 = 1000;
/// Largest `limit` the Data API accepts.
const MAX_PAGE_SIZE: u64 = 50_000;

/// Document store backed by the MongoDB Data API.
#[derive(Debug, Clone)]
pub struct DataApiStore {
    client: Client,
    endpoint: String,
    api_key: String,
    data_source: String,
    database: String,
    page_size: u64,
}

impl DataApiStore {
    /// Create a new builder for configuring the store.
    pub fn builder() -> DataApiStoreBuilder {
        DataApiStoreBuilder::default()
    }

    /// Build a store from a connection string and API key.
    ///
    /// The `database` query parameter is required; `dataSource` defaults to
    /// `mongodb-atlas`.
    pub fn from_uri(uri: &str, api_key: &str) -> Result<Self, AdapterError> {
        let mut url = Url::parse(uri).map_err(|e| AdapterError::InvalidUri(e.to_string()))?;

        let mut database = None;
        let mut data_source = None;
        for (key, value) in url.query_pairs() {
            match &*key {
                "database" => database = Some(value.into_owned()),
                "dataSource" => data_source = Some(value.into_owned()),
                _ => {}
            }
        }
        let database = database
            .ok_or_else(|| AdapterError::InvalidUri(format!("{uri}: missing database")))?;

        url.set_query(None);
        let mut builder = Self::builder()
            .endpoint(url.as_str().trim_end_matches('/'))
            .api_key(api_key)
            .database(database);
        if let Some(data_source) = data_source {
            builder = builder.data_source(data_source);
        }
        builder.build()
    }

    /// The base endpoint (without the trailing `/action/...`).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Fetch every document of `collection`, in `_id` (insertion) order.
    ///
    /// Requests pages of `page_size` documents with an increasing `skip`
    /// until a short page comes back.
    pub async fn find(&self, collection: &str) -> Result<Vec<Document>, AdapterError> {
        let mut documents = Vec::new();
        loop {
            let page = self.find_page(collection, documents.len() as u64).await?;
            let full = page.len() as u64 >= self.page_size;
            documents.extend(page);
            if !full {
                break;
            }
        }
        Ok(documents)
    }

    async fn find_page(&self, collection: &str, skip: u64) -> Result<Vec<Document>, AdapterError> {
        let url = format!("{}/action/find", self.endpoint);
        let request = self.find_request(collection, skip);

        debug!(collection, database = %self.database, skip, "querying data api");

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED
            || response.status() == StatusCode::FORBIDDEN
        {
            return Err(AdapterError::Auth("API key rejected".to_string()));
        }

        if !response.status().is_success() {
            return Err(AdapterError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body: FindResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(body.documents)
    }

    fn find_request<'a>(&'a self, collection: &'a str, skip: u64) -> FindRequest<'a> {
        FindRequest {
            data_source: &self.data_source,
            database: &self.database,
            collection,
            filter: Document::new(),
            sort: SortById { id: 1 },
            skip: (skip > 0).then_some(skip),
            limit: self.page_size,
        }
    }
}

/// Builder for [`DataApiStore`].
#[derive(Debug, Default)]
pub struct DataApiStoreBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    data_source: Option<String>,
    database: Option<String>,
    page_size: Option<u64>,
    timeout: Option<Duration>,
}

impl DataApiStoreBuilder {
    /// Set the Data API base URL (ending in `/endpoint/data/v1`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the linked data source name (default: `mongodb-atlas`).
    pub fn data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Documents requested per page (default: 1000, at most 50000).
    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set the request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<DataApiStore, AdapterError> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| AdapterError::InvalidUri("endpoint not set".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| AdapterError::InvalidUri("database not set".to_string()))?;

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        Ok(DataApiStore {
            client,
            endpoint,
            api_key: self.api_key.unwrap_or_default(),
            data_source: self
                .data_source
                .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string()),
            database,
            page_size: self
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        })
    }
}

/// Body of an `action/find` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindRequest<'a> {
    data_source: &'a str,
    database: &'a str,
    collection: &'a str,
    filter: Document,
    sort: SortById,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u64>,
    limit: u64,
}

#[derive(Debug, Serialize)]
struct SortById {
    #[serde(rename = "_id")]
    id: i32,
}

/// Body of an `action/find` response.
#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    documents: Vec<Document>,
}
