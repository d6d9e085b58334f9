use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{NetworkError, Result};

pub const DEFAULT_SEPARATOR: &str = ";,.";

/// What ingestion does with a line that does not split into two fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Log the line and keep going.
    #[default]
    Skip,
    /// Fail the whole ingestion with `MalformedRecord`.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    pub separator: String,
    /// Cap on files read, in discovery order. `None` reads every file.
    pub num_files: Option<usize>,
    /// Sort discovered paths so a `num_files` cap picks the same files on
    /// every platform.
    pub sort_files: bool,
    pub on_malformed: MalformedPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            num_files: None,
            sort_files: false,
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub scale_by_degree: bool,
    pub top_n_hubs: usize,
    pub width: f64,
    pub height: f64,
    pub svg_output: Option<PathBuf>,
    pub dot_output: Option<PathBuf>,
    pub hubs_output: Option<PathBuf>,
    pub layout_output: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale_by_degree: true,
            top_n_hubs: 10,
            width: 800.0,
            height: 800.0,
            svg_output: Some(PathBuf::from("network.svg")),
            dot_output: None,
            hubs_output: Some(PathBuf::from("hubs.csv")),
            layout_output: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: String,
    pub ingest: IngestOptions,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            ingest: IngestOptions::default(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| NetworkError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Rejects values ingestion or rendering could not work with.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.separator.is_empty() {
            return Err(NetworkError::InvalidArgument(
                "separator must not be empty".to_string(),
            ));
        }
        if !(self.render.width > 0.0 && self.render.height > 0.0) {
            return Err(NetworkError::InvalidArgument(
                "render width and height must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.ingest.separator, DEFAULT_SEPARATOR);
        assert_eq!(config.ingest.num_files, None);
        assert_eq!(config.ingest.on_malformed, MalformedPolicy::Skip);
        assert_eq!(config.layout.iterations, 50);
        assert!(config.render.scale_by_degree);
        assert_eq!(config.render.top_n_hubs, 10);
    }

    #[test]
    fn test_partial_toml() {
        let text = r#"
            data_dir = "tweets/"

            [ingest]
            num_files = 3
            on_malformed = "abort"

            [render]
            top_n_hubs = 5
            dot_output = "graph.dot"
        "#;
        let config = Config::from_toml_str(text).unwrap();
        assert_eq!(config.data_dir, "tweets/");
        assert_eq!(config.ingest.num_files, Some(3));
        assert_eq!(config.ingest.separator, DEFAULT_SEPARATOR);
        assert_eq!(config.ingest.on_malformed, MalformedPolicy::Abort);
        assert_eq!(config.render.top_n_hubs, 5);
        assert_eq!(config.render.dot_output, Some(PathBuf::from("graph.dot")));
        assert_eq!(config.layout.seed, 42);
    }

    #[test]
    fn test_empty_separator_rejected() {
        let err = Config::from_toml_str("[ingest]\nseparator = \"\"\n").unwrap_err();
        assert!(matches!(err, NetworkError::InvalidArgument(_)));
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = Config::from_toml_str("data_dir = 3").unwrap_err();
        assert!(matches!(err, NetworkError::Config(_)));
    }
}
