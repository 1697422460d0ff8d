use crate::attributes::Attributes;
use crate::delta::Delta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag of the root node
pub const ROOT_TYPE: &str = "document";

/// Type tag of editable text nodes
pub const TEXT_TYPE: &str = "text";

/// A single element of the document tree.
///
/// Nodes exclusively own their children. Text-bearing nodes carry a
/// document [`Delta`]; structural nodes leave it unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
}

impl Node {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            delta: None,
        }
    }

    /// Text node holding `text` as a single unformatted run
    pub fn text(text: impl Into<String>) -> Self {
        Self::text_with_delta(Delta::from_text(text))
    }

    pub fn text_with_delta(delta: Delta) -> Self {
        Self {
            delta: Some(delta),
            ..Self::new(TEXT_TYPE)
        }
    }

    /// Empty text node
    pub fn empty_text() -> Self {
        Self::text_with_delta(Delta::new())
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn is_text(&self) -> bool {
        self.delta.is_some()
    }

    /// A text node the user can type into
    pub fn is_editable_text(&self) -> bool {
        self.node_type == TEXT_TYPE && self.is_text()
    }

    /// Plain text of this node, empty for structural nodes
    pub fn plain_text(&self) -> String {
        self.delta
            .as_ref()
            .map(Delta::to_plain_text)
            .unwrap_or_default()
    }
}
