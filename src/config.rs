//! Tool configuration module.
//!
//! Handles loading, validating, and merging `pixmanip.toml`. The file is
//! optional: stock defaults are used when it is absent, and a present file
//! only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [decode]
//! # max_pixels = 100000000  # Refuse larger images (omit for no limit)
//!
//! [pointillism]
//! density_percent = 3       # Chance (1-100) that a pixel seeds a disc
//! max_radius = 5            # Disc radius is drawn from 1..=max_radius
//! # seed = 42               # Fixed RNG seed for reproducible output
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::PointillismParams;
use crate::ppm::DecodeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pixmanip.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pixmanip.toml`.
///
/// All fields have defaults matching the classic behaviour of the tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Input decoding limits.
    pub decode: DecodeConfig,
    /// Pointillism tuning and seeding.
    pub pointillism: PointillismConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decode.max_pixels == Some(0) {
            return Err(ConfigError::Validation(
                "decode.max_pixels must be positive".into(),
            ));
        }
        if !(1..=100).contains(&self.pointillism.density_percent) {
            return Err(ConfigError::Validation(
                "pointillism.density_percent must be 1-100".into(),
            ));
        }
        if self.pointillism.max_radius == 0 {
            return Err(ConfigError::Validation(
                "pointillism.max_radius must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Decoder settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Largest accepted `rows * cols`. When absent, any size that fits in
    /// memory is accepted.
    pub max_pixels: Option<u64>,
}

impl DecodeConfig {
    pub fn options(&self) -> DecodeOptions {
        DecodeOptions {
            max_pixels: self.max_pixels,
        }
    }
}

/// Pointillism settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointillismConfig {
    /// Percent chance that a pixel becomes a disc center.
    pub density_percent: u32,
    /// Upper bound of the uniformly drawn disc radius.
    pub max_radius: u32,
    /// Fixed RNG seed. When absent, each run seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for PointillismConfig {
    fn default() -> Self {
        let params = PointillismParams::default();
        Self {
            density_percent: params.density_percent,
            max_radius: params.max_radius,
            seed: None,
        }
    }
}

impl PointillismConfig {
    pub fn params(&self) -> PointillismParams {
        PointillismParams {
            density_percent: self.density_percent,
            max_radius: self.max_radius,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pixmanip.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixmanip Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# pixmanip reads ./pixmanip.toml unless --config points elsewhere.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Decoding
# ---------------------------------------------------------------------------
[decode]
# Refuse images whose rows * cols exceeds this many pixels.
# Omit for no limit beyond available memory.
# max_pixels = 100000000

# ---------------------------------------------------------------------------
# Pointillism
# ---------------------------------------------------------------------------
[pointillism]
# Chance, in percent (1-100), that any given pixel becomes a disc center.
density_percent = 3

# Each disc radius is drawn uniformly from 1 to this value.
max_radius = 5

# Fixed random seed. With a seed, the same input always produces the same
# output; without one, every run differs. The --seed flag overrides this.
# seed = 42
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_classic_behaviour() {
        let config = ToolConfig::default();
        assert_eq!(config.decode.max_pixels, None);
        assert_eq!(config.pointillism.density_percent, 3);
        assert_eq!(config.pointillism.max_radius, 5);
        assert_eq!(config.pointillism.seed, None);
        assert_eq!(config.pointillism.params(), PointillismParams::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[pointillism]
seed = 42
"#;
        let config: ToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.pointillism.seed, Some(42));
        // Default values preserved
        assert_eq!(config.pointillism.density_percent, 3);
        assert_eq!(config.decode.max_pixels, None);
    }

    #[test]
    fn decode_options_follow_config() {
        let config: ToolConfig = toml::from_str("[decode]\nmax_pixels = 1024\n").unwrap();
        assert_eq!(config.decode.options().max_pixels, Some(1024));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &config_path,
            r#"
[pointillism]
max_radius = 8
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.pointillism.max_radius, 8);
        // Unspecified values should be defaults
        assert_eq!(config.pointillism.density_percent, 3);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = load_config(&config_path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&config_path, "[pointillism]\ndensity_percent = 0\n").unwrap();

        let result = load_config(&config_path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"max_radius = 5"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"max_radius = 2"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("max_radius").unwrap().as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[pointillism]
density_percent = 3
max_radius = 5
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[pointillism]
max_radius = 9
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let table = merged.get("pointillism").unwrap();
        assert_eq!(table.get("max_radius").unwrap().as_integer(), Some(9));
        // density preserved from base
        assert_eq!(table.get("density_percent").unwrap().as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_adds_new_keys() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[decode]\nmax_pixels = 10\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(
            merged
                .get("decode")
                .unwrap()
                .get("max_pixels")
                .unwrap()
                .as_integer(),
            Some(10)
        );
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[pointillism]
max_raduis = 3
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<ToolConfig, _> = toml::from_str("[blur]\nsigma = 2.0\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // validate / resolve_config tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ToolConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_density_bounds() {
        let mut config = ToolConfig::default();
        config.pointillism.density_percent = 100;
        assert!(config.validate().is_ok());
        config.pointillism.density_percent = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_zero_limits() {
        let mut config = ToolConfig::default();
        config.pointillism.max_radius = 0;
        assert!(config.validate().is_err());

        let mut config = ToolConfig::default();
        config.decode.max_pixels = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[pointillism]\nmax_radius = 0\n").unwrap();
        let result = resolve_config(stock_defaults_value(), Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[decode]"));
        assert!(content.contains("[pointillism]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("decode").is_some());
        assert!(val.get("pointillism").is_some());
    }
}
