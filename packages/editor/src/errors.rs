//! Error types for the editor

use folio_document::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// An operation inside an apply failed; everything before it was reverted
    #[error("Operation {index} failed: {source}")]
    Operation {
        index: usize,
        #[source]
        source: DocumentError,
    },

    /// Reverting operation `index` after a failure did not succeed, so the
    /// document is left partially edited
    #[error("Rollback of operation {index} failed: {source}")]
    Rollback {
        index: usize,
        #[source]
        source: DocumentError,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
