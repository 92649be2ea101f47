//! Error types for fetching and transforming statistics.

use thiserror::Error;

use crate::source::Source;

/// Errors raised while reading documents from a store.
///
/// Any of these fails the whole refresh cycle; nothing is published.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The store could not be reached at all.
    #[error("Store unreachable ({store}): {reason}")]
    Unreachable { store: String, reason: String },

    /// The store answered but the payload was not a list of documents.
    #[error("Parse error ({store}): {reason}")]
    Parse { store: String, reason: String },

    /// The store rejected the query.
    #[error("Query failed ({store}): {reason}")]
    Query { store: String, reason: String },

    /// No store was configured for this source.
    #[error("No store configured for {0} documents")]
    NotConfigured(Source),
}

/// Errors that abort the transformation of a single series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// A record has no usable `end_date`.
    #[error("Record {index} has no end_date")]
    MissingDate { index: usize },

    /// An `end_date` does not match the expected format.
    #[error("Malformed end_date {value:?} (expected {format})")]
    MalformedDate { value: String, format: String },
}
