//! File-based document store.
//!
//! Reads each collection from `<root>/<collection>.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{Document, DocumentStore};
use crate::error::FetchError;

/// A document store backed by a directory of JSON files.
///
/// Each collection is a file holding either a JSON array of documents or
/// newline-delimited JSON (one document per line). Documents are returned in
/// file order, which is taken to be insertion order.
///
/// This is the mode used for exports from the ingestion job and for local
/// development against a snapshot of the database.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    description: String,
}

impl FileStore {
    /// Create a new file store rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        let description = format!("file: {}", root.display());
        Self { root, description }
    }

    /// Returns the directory holding the collection files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `collection`.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    fn parse(&self, content: &str) -> Result<Vec<Document>, FetchError> {
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        if trimmed.starts_with('[') {
            return serde_json::from_str(trimmed).map_err(|e| self.parse_error(e));
        }
        trimmed
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| self.parse_error(e)))
            .collect()
    }

    fn parse_error(&self, e: serde_json::Error) -> FetchError {
        FetchError::Parse {
            store: self.description.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn find(&self, collection: &str) -> Result<Vec<Document>, FetchError> {
        if !tokio::fs::metadata(&self.root).await.is_ok_and(|m| m.is_dir()) {
            return Err(FetchError::Unreachable {
                store: self.description.clone(),
                reason: "directory not found".to_string(),
            });
        }

        let path = self.collection_path(collection);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(collection, path = %path.display(), "collection file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FetchError::Unreachable {
                    store: self.description.clone(),
                    reason: format!("Read error: {}", e),
                })
            }
        };

        self.parse(&content)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
