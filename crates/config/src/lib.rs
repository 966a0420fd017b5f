//! Shared configuration for Facecut
//!
//! This crate provides the single source of truth for editor behaviour that
//! the host may want to tune: how face adjacency is answered, whether seam
//! vertices are welded for adjacency, which modifier switches to connected
//! selection, and how saved assets are named and encoded.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default asset name offered when the host asks where to save
pub const DEFAULT_ASSET_NAME: &str = "NewMesh";

/// Default file extension for saved mesh assets
pub const DEFAULT_ASSET_EXTENSION: &str = "asset";

/// Default quantization scale used when welding seam vertices
pub const DEFAULT_WELD_SCALE: f32 = 1_000_000.0;

/// How adjacency queries are answered.
///
/// Both strategies use the same "two or more shared vertex indices" rule and
/// produce identical results; they differ only in cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyStrategy {
    /// Scan every triangle for each query
    BruteForce,
    /// Build a vertex → faces index once per mesh revision
    #[default]
    VertexIndex,
}

/// Modifier key that switches a click from toggle to connected selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectModifier {
    #[default]
    Ctrl,
    Shift,
    Meta,
}

/// On-disk encoding of saved mesh assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFormat {
    #[default]
    Json,
    Binary,
}

/// Opt-in welding of positionally identical vertices for adjacency.
///
/// Welding never changes the mesh itself, only which vertex indices are
/// considered "the same" when testing adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeldConfig {
    /// Whether seam welding is enabled
    pub enabled: bool,
    /// Positions are multiplied by this and truncated before comparison
    pub scale: f32,
}

impl WeldConfig {
    /// Whether `scale` can quantize positions
    pub fn scale_is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }
}

impl Default for WeldConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            scale: DEFAULT_WELD_SCALE,
        }
    }
}

/// Asset persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Name suggested to the host's save dialog
    pub default_name: String,
    /// Extension appended to paths that have none
    pub extension: String,
    /// Encoding used by the file persister
    pub format: AssetFormat,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_ASSET_NAME.to_string(),
            extension: DEFAULT_ASSET_EXTENSION.to_string(),
            format: AssetFormat::default(),
        }
    }
}

impl SaveConfig {
    /// Suggested file name, e.g. `NewMesh.asset`
    pub fn suggested_file_name(&self) -> String {
        if self.extension.is_empty() {
            self.default_name.clone()
        } else {
            format!("{}.{}", self.default_name, self.extension)
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Weld scale must be finite and positive, got {scale}")]
    InvalidWeldScale { scale: f32 },
}

/// Editor configuration for a face editing session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub adjacency: AdjacencyStrategy,
    pub weld: WeldConfig,
    pub select_modifier: SelectModifier,
    pub save: SaveConfig,
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields fall back to defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no session can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.weld.scale_is_valid() {
            return Err(ConfigError::InvalidWeldScale {
                scale: self.weld.scale,
            });
        }
        Ok(())
    }

    /// Load a config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
