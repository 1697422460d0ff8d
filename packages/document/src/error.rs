use crate::Path;
use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("No node at path {0}")]
    PathNotFound(Path),

    #[error("Path {path} is out of range: parent has {len} children")]
    IndexOutOfRange { path: Path, len: usize },

    #[error("The document root cannot be inserted, deleted or replaced")]
    RootPath,

    #[error("Node at {0} was removed by an earlier operation")]
    Removed(Path),

    #[error("Node at {0} does not carry text")]
    NotText(Path),

    #[error("Delta reaches position {position} but the text is only {length} long")]
    DeltaOutOfBounds { position: usize, length: usize },

    #[error("Expected a document delta made only of inserts")]
    NotDocumentDelta,
}

impl DocumentError {
    pub fn index_out_of_range(path: &Path, len: usize) -> Self {
        Self::IndexOutOfRange {
            path: path.clone(),
            len,
        }
    }

    pub fn delta_out_of_bounds(position: usize, length: usize) -> Self {
        Self::DeltaOutOfBounds { position, length }
    }
}
