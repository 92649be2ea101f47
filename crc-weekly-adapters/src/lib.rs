//! # crc-weekly-adapters
//!
//! Adapters for reading weekly statistics documents out of network document
//! stores.
//!
//! ## Supported Stores
//!
//! - **MongoDB Data API** (`data-api` feature, default) - queries a collection
//!   through the HTTPS `action/find` endpoint, sorted by `_id` so documents
//!   come back in insertion order
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crc_weekly_adapters::data_api::DataApiStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DataApiStore::builder()
//!         .endpoint("https://data.mongodb-api.com/app/crc-abcde/endpoint/data/v1")
//!         .api_key("secret")
//!         .database("crc")
//!         .build()?;
//!
//!     let documents = store.find("statistics").await?;
//!     println!("Fetched {} documents", documents.len());
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "data-api")]
pub mod data_api;

pub use error::AdapterError;

/// A semi-structured document as returned by a store.
pub type Document = serde_json::Map<String, serde_json::Value>;
