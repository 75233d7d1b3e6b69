//! Configuration management for the fraud dashboard

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Serialization format of the model artifact
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Logistic pipeline serialized as JSON
    #[default]
    Json,
    /// Exported ONNX estimator plus a JSON preprocessor (needs the `onnx` feature)
    Onnx,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Artifact format
    #[serde(default)]
    pub kind: ModelKind,
    /// Path to the model artifact
    pub model_path: String,
    /// Path to the explainer artifact
    pub explainer_path: String,
    /// Path to the preprocessing step, for ONNX models only
    #[serde(default)]
    pub preprocessor_path: Option<String>,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_onnx_threads() -> usize {
    1
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
            },
            models: ModelsConfig {
                kind: ModelKind::Json,
                model_path: "models/model.json".to_string(),
                explainer_path: "models/explainer.json".to_string(),
                preprocessor_path: None,
                onnx_threads: 1,
            },
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8501");
        assert_eq!(config.models.kind, ModelKind::Json);
        assert_eq!(config.models.model_path, "models/model.json");
        assert_eq!(config.models.explainer_path, "models/explainer.json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_path() {
        let path = std::env::temp_dir().join(format!("{}-config.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9000

[models]
kind = "onnx"
model_path = "m.onnx"
explainer_path = "e.json"
preprocessor_path = "p.json"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.server.addr(), "127.0.0.1:9000");
        assert_eq!(config.models.kind, ModelKind::Onnx);
        assert_eq!(config.models.preprocessor_path.as_deref(), Some("p.json"));
        assert_eq!(config.models.onnx_threads, 1);
        assert_eq!(config.logging.format, "pretty");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_config_file() {
        assert!(AppConfig::load_from_path("does/not/exist.toml").is_err());
    }
}
