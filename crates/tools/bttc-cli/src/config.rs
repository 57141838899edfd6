//! Tool configuration
//!
//! Values are resolved in increasing priority: built-in defaults, environment
//! variables, a TOML config file, then command-line flags.

use std::{env, fs, path::Path};

use anyhow::Context;
use bttc::SubdivideConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Face table orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One face per row, six coordinates per face
    #[default]
    Rows,
    /// Column-major: all first coordinates, then all second coordinates, ...
    Columns,
}

/// How results are written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub layout: Layout,
    /// Added to every coordinate and vertex index (0 or 1)
    pub index_base: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            layout: Layout::Rows,
            index_base: 0,
        }
    }
}

/// Complete tool configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub subdivide: SubdivideConfig,
    pub output: OutputConfig,
}

impl ToolConfig {
    /// Defaults overridden by `BTTC_THRESHOLD`, `BTTC_INDEX_BASE` and `BTTC_FORMAT`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`ToolConfig::from_env`] with an explicit variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup("BTTC_THRESHOLD") {
            config.subdivide.threshold = value
                .trim()
                .parse()
                .with_context(|| format!("BTTC_THRESHOLD is not a number: {value:?}"))?;
        }
        if let Some(value) = lookup("BTTC_INDEX_BASE") {
            config.output.index_base = value
                .trim()
                .parse()
                .with_context(|| format!("BTTC_INDEX_BASE is not an integer: {value:?}"))?;
        }
        if let Some(value) = lookup("BTTC_FORMAT") {
            config.output.format = OutputFormat::from_str(value.trim(), true)
                .map_err(|err| anyhow::anyhow!("BTTC_FORMAT: {err}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text).context("invalid config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Environment-based config, replaced by `path` when one is given
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::from_env(),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.subdivide.threshold.is_finite() && self.subdivide.threshold >= 0.0,
            "threshold must be a finite non-negative number, got {}",
            self.subdivide.threshold
        );
        anyhow::ensure!(
            self.output.index_base <= 1,
            "index base must be 0 or 1, got {}",
            self.output.index_base
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ToolConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.subdivide.threshold, 0.0);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_env_overrides() {
        let config = ToolConfig::from_vars(vars(&[
            ("BTTC_THRESHOLD", "60"),
            ("BTTC_INDEX_BASE", "1"),
            ("BTTC_FORMAT", "CSV"),
        ]))
        .unwrap();
        assert_eq!(config.subdivide.threshold, 60.0);
        assert_eq!(config.output.index_base, 1);
        assert_eq!(config.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_env_rejects_garbage() {
        assert!(ToolConfig::from_vars(vars(&[("BTTC_THRESHOLD", "lots")])).is_err());
        assert!(ToolConfig::from_vars(vars(&[("BTTC_THRESHOLD", "-3")])).is_err());
        assert!(ToolConfig::from_vars(vars(&[("BTTC_INDEX_BASE", "2")])).is_err());
        assert!(ToolConfig::from_vars(vars(&[("BTTC_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_toml_partial_document() {
        let config = ToolConfig::from_toml_str(
            r#"
            [subdivide]
            threshold = 12.5

            [output]
            layout = "columns"
            "#,
        )
        .unwrap();
        assert_eq!(config.subdivide.threshold, 12.5);
        assert_eq!(config.subdivide.initial_capacity, bttc::INITIAL_CAPACITY);
        assert_eq!(config.output.layout, Layout::Columns);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_toml_rejects_unknown_format() {
        assert!(ToolConfig::from_toml_str("[output]\nformat = \"yaml\"\n").is_err());
    }
}
