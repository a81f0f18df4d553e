//! Editor configuration
//!
//! Loaded from `sitebuilder.config.json` in the project root. Every field is
//! optional; a missing file means defaults.

use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "sitebuilder.config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub toolbar: ToolbarMetrics,

    /// Undo levels kept per edit session (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Field ids edited as rich text. Everything else is a plain text field.
    #[serde(default)]
    pub rich_text_fields: Vec<String>,
}

/// Floating toolbar geometry, in the host's pixel units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolbarMetrics {
    pub width: f32,
    pub height: f32,
    /// Gap between the selection and the toolbar
    pub offset: f32,
    /// Horizontal inset from the editable region's edges
    pub margin: f32,
}

impl Default for ToolbarMetrics {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 40.0,
            offset: 8.0,
            margin: 0.0,
        }
    }
}

fn default_history_depth() -> usize {
    100
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            toolbar: ToolbarMetrics::default(),
            history_depth: default_history_depth(),
            rich_text_fields: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Load from `<cwd>/sitebuilder.config.json`, or defaults if absent
    pub fn load(cwd: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = cwd.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn is_rich(&self, eid: &str) -> bool {
        self.rich_text_fields.iter().any(|field| field == eid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = EditorConfig::from_json("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history_depth, 100);
    }

    #[test]
    fn test_partial_toolbar_metrics() {
        let config = EditorConfig::from_json(
            r#"{"toolbar": {"width": 200}, "richTextFields": ["hero.title"]}"#,
        )
        .unwrap();

        assert_eq!(config.toolbar.width, 200.0);
        assert_eq!(config.toolbar.height, 40.0);
        assert!(config.is_rich("hero.title"));
        assert!(!config.is_rich("hero.image"));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = std::env::temp_dir().join("sitebuilder-config-missing");
        let config = EditorConfig::load(&dir).unwrap();
        assert_eq!(config, EditorConfig::default());
    }
}
