use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Editor behavior switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// When false every apply is a silent no-op
    pub editable: bool,

    /// Run structural rules after each apply
    pub rules_enabled: bool,

    /// How many nested corrective applies rules may trigger
    pub max_rule_depth: usize,

    /// Coalesce undo-recorded applies until the document goes quiet.
    /// When off, every apply becomes its own undo step.
    pub seal_timer_enabled: bool,

    /// Quiet period before the open history item is sealed
    pub seal_delay_ms: u64,

    /// Maximum items kept on each history stack (0 = unlimited)
    pub max_undo_levels: usize,
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        serde_json::from_str(json).map_err(EditorError::Config)
    }

    /// Load config from a directory, falling back to defaults when the
    /// file does not exist
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn seal_delay(&self) -> Duration {
        Duration::from_millis(self.seal_delay_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            editable: true,
            rules_enabled: true,
            max_rule_depth: 5,
            seal_timer_enabled: true,
            seal_delay_ms: 1000,
            max_undo_levels: 20,
        }
    }
}
