//! Failures reading collections from a remote document store.

use thiserror::Error;

/// Why a collection could not be read from the store.
///
/// [`is_unreachable`](AdapterError::is_unreachable) separates an outage
/// from a store that answered with something unusable.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The store answered a `find` with a non-success status.
    #[error("Data API query failed: {0}")]
    Http(String),

    /// The `find` response did not hold a `documents` array.
    #[error("Unreadable Data API response: {0}")]
    Parse(String),

    #[error("Data API rejected the key: {0}")]
    Auth(String),

    #[error("Cannot reach the document store: {0}")]
    Connection(String),

    #[error("Document store did not answer in time")]
    Timeout,

    /// A store URI without an endpoint or a `database` parameter.
    #[error("Invalid store URI: {0}")]
    InvalidUri(String),
}

#[cfg(feature = "data-api")]
impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdapterError::Timeout
        } else if err.is_connect() {
            AdapterError::Connection(err.to_string())
        } else {
            AdapterError::Http(err.to_string())
        }
    }
}

impl AdapterError {
    /// Whether the store could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, AdapterError::Connection(_) | AdapterError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_store() {
        assert_eq!(
            AdapterError::InvalidUri("missing database".into()).to_string(),
            "Invalid store URI: missing database"
        );
        assert_eq!(
            AdapterError::Timeout.to_string(),
            "Document store did not answer in time"
        );
    }
}
