//! # Folio Document
//!
//! The tree substrate edited by `folio-editor`: path-addressed nodes with
//! attribute maps, child lists and delta-encoded text.
//!
//! ```text
//! document (root, path [])
//! ├── text      [0]   delta: [insert "Title"]
//! ├── list      [1]
//! │   ├── text  [1, 0]
//! │   └── text  [1, 1]
//! └── text      [2]
//! ```

pub mod attributes;
pub mod delta;
pub mod document;
pub mod error;
pub mod node;
pub mod path;

pub use attributes::{compose_attributes, invert_attributes, Attributes};
pub use delta::{Delta, DeltaOp};
pub use document::Document;
pub use error::{DocumentError, DocumentResult};
pub use node::{Node, ROOT_TYPE, TEXT_TYPE};
pub use path::Path;
