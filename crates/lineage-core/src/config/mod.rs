//! Configuration management for Lineage.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `lineage.toml` file
//! 3. User config `~/.config/lineage/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::layout::LayoutMode;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Layout configuration.
    pub layout: LayoutConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./lineage.toml` (project local)
    /// 2. `~/.config/lineage/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("lineage.toml").exists() {
            return Self::from_file("lineage.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lineage").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `LINEAGE_*` overrides read through `var`.
    ///
    /// A value that does not parse is an error, never silently ignored.
    pub fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(dir) = var("LINEAGE_DATA_DIR") {
            self.storage.data_dir = dir;
        }
        if let Some(mode) = var("LINEAGE_LAYOUT_MODE") {
            self.layout.mode = parse_override("LINEAGE_LAYOUT_MODE", &mode)?;
        }
        if let Some(width) = var("LINEAGE_VIEW_WIDTH") {
            self.layout.view_width = parse_override("LINEAGE_VIEW_WIDTH", &width)?;
        }
        if let Some(height) = var("LINEAGE_VIEW_HEIGHT") {
            self.layout.view_height = parse_override("LINEAGE_VIEW_HEIGHT", &height)?;
        }

        Ok(())
    }

    /// Checks values that would make layouts meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.view_width <= 0.0 || self.layout.view_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "layout viewport must have a positive size".to_string(),
            ));
        }
        let h = &self.layout.hierarchical;
        if h.node_width <= 0.0 || h.node_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "hierarchical node size must be positive".to_string(),
            ));
        }
        if h.sibling_separation <= 0.0 || h.cousin_separation <= 0.0 {
            return Err(ConfigError::Invalid(
                "hierarchical separations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}: cannot parse '{value}'")))
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the collections (default: ".lineage").
    pub data_dir: String,

    /// Person collection file name.
    pub persons_file: String,

    /// Ancestry tree collection file name.
    pub trees_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: DEFAULT_DATA_DIR.to_string(),
            persons_file: DEFAULT_PERSONS_FILE.to_string(),
            trees_file: DEFAULT_TREES_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Uses `dir` as the data directory, other settings default.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: dir.as_ref().to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    /// Get the full path to the person collection.
    pub fn persons_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.persons_file)
    }

    /// Get the full path to the tree collection.
    pub fn trees_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.trees_file)
    }
}

/// Layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Layout used when the caller does not pick one.
    pub mode: LayoutMode,

    /// Viewport width used when the caller does not give one.
    pub view_width: f64,

    /// Viewport height used when the caller does not give one.
    pub view_height: f64,

    /// Hierarchical (tidy tree) tuning.
    pub hierarchical: HierarchicalConfig,

    /// Generation-banded tuning.
    pub generational: GenerationalConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::default(),
            view_width: DEFAULT_VIEW_WIDTH,
            view_height: DEFAULT_VIEW_HEIGHT,
            hierarchical: HierarchicalConfig::default(),
            generational: GenerationalConfig::default(),
        }
    }
}

/// Tuning for the hierarchical layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalConfig {
    /// Horizontal footprint of a node.
    pub node_width: f64,

    /// Distance between depth levels.
    pub node_height: f64,

    /// Separation for nodes sharing a display parent, in node widths.
    pub sibling_separation: f64,

    /// Separation for nodes with different display parents, in node widths.
    pub cousin_separation: f64,

    /// Scale the result down to fit the viewport.
    pub fit_to_viewport: bool,

    /// Share of the viewport to fit into.
    pub viewport_fraction: f64,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self {
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            sibling_separation: DEFAULT_SIBLING_SEPARATION,
            cousin_separation: DEFAULT_COUSIN_SEPARATION,
            fit_to_viewport: true,
            viewport_fraction: DEFAULT_VIEWPORT_FRACTION,
        }
    }
}

/// Tuning for the generation-banded layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationalConfig {
    /// Share of the viewport height covered by the bands.
    pub band_height_fraction: f64,

    /// Widening factor applied to band spacing.
    pub band_spacing_factor: f64,

    /// Offset of each parent from the centre, as a width fraction.
    pub parent_offset: f64,

    /// Grandparent slots as width fractions.
    pub grandparent_slots: [f64; 4],

    /// Great-grandparent slots as width fractions.
    pub great_grandparent_slots: [f64; 8],

    /// Offset for nodes without a slot, as a width fraction.
    pub fallback_side_offset: f64,
}

impl Default for GenerationalConfig {
    fn default() -> Self {
        Self {
            band_height_fraction: DEFAULT_BAND_HEIGHT_FRACTION,
            band_spacing_factor: DEFAULT_BAND_SPACING_FACTOR,
            parent_offset: DEFAULT_PARENT_OFFSET,
            grandparent_slots: DEFAULT_GRANDPARENT_SLOTS,
            great_grandparent_slots: DEFAULT_GREAT_GRANDPARENT_SLOTS,
            fallback_side_offset: DEFAULT_FALLBACK_SIDE_OFFSET,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVER_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, DEFAULT_DATA_DIR);
        assert_eq!(config.layout.mode, LayoutMode::Generational);
        assert_eq!(config.server.port, DEFAULT_SERVER_PORT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[layout.hierarchical]"));
        assert!(toml_str.contains("[layout.generational]"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[storage]
data_dir = ".custom-lineage"

[layout]
mode = "hierarchical"
view_width = 1600.0

[layout.generational]
parent_offset = 0.2
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.data_dir, ".custom-lineage");
        assert_eq!(config.storage.persons_file, DEFAULT_PERSONS_FILE);
        assert_eq!(config.layout.mode, LayoutMode::Hierarchical);
        assert_eq!(config.layout.view_width, 1600.0);
        assert_eq!(config.layout.view_height, DEFAULT_VIEW_HEIGHT);
        assert_eq!(config.layout.generational.parent_offset, 0.2);
        assert_eq!(
            config.layout.generational.grandparent_slots,
            DEFAULT_GRANDPARENT_SLOTS
        );
    }

    #[test]
    fn test_validate_rejects_empty_viewport() {
        let mut config = Config::default();
        config.layout.view_width = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let vars = |key: &str| match key {
            "LINEAGE_LAYOUT_MODE" => Some("hierarchical".to_string()),
            "LINEAGE_VIEW_WIDTH" => Some("1600".to_string()),
            "LINEAGE_VIEW_HEIGHT" => Some(" 900.5 ".to_string()),
            _ => None,
        };
        let mut config = Config::default();
        config.apply_overrides(vars).unwrap();
        assert_eq!(config.layout.mode, LayoutMode::Hierarchical);
        assert_eq!(config.layout.view_width, 1600.0);
        assert_eq!(config.layout.view_height, 900.5);
        assert_eq!(config.storage.data_dir, DEFAULT_DATA_DIR);
    }

    #[test]
    fn test_bad_overrides_are_errors() {
        for (key, value) in [
            ("LINEAGE_LAYOUT_MODE", "radial"),
            ("LINEAGE_VIEW_WIDTH", "wide"),
            ("LINEAGE_VIEW_HEIGHT", ""),
        ] {
            let mut config = Config::default();
            let err = config
                .apply_overrides(|k| (k == key).then(|| value.to_string()))
                .unwrap_err();
            assert!(err.to_string().contains(key), "{err}");
        }
    }

    #[test]
    fn test_zero_width_override_fails_validation() {
        let mut config = Config::default();
        config
            .apply_overrides(|k| (k == "LINEAGE_VIEW_WIDTH").then(|| "0".to_string()))
            .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_storage_paths() {
        let config = StorageConfig::in_dir("/tmp/registry");
        assert_eq!(
            config.persons_path(),
            PathBuf::from("/tmp/registry/persons.json")
        );
        assert_eq!(config.trees_path(), PathBuf::from("/tmp/registry/trees.json"));
    }
}
