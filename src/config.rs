//! Configuration management for the credit default prediction service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub artifacts: ArtifactsConfig,
    pub pipeline: PipelineConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Request-reply subject for prediction requests
    pub predict_subject: String,
    /// Request-reply subject for health checks
    pub health_subject: String,
}

/// Frozen artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Directory containing the training artifacts
    pub dir: String,
    /// ONNX classifier file name
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// Scaler parameter file name
    #[serde(default = "default_scaler_file")]
    pub scaler_file: String,
    /// Ordered feature column file name
    #[serde(default = "default_features_file")]
    pub features_file: String,
    /// Number of threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
}

fn default_model_file() -> String {
    "model.onnx".to_string()
}

fn default_scaler_file() -> String {
    "scaler.json".to_string()
}

fn default_features_file() -> String {
    "feature_columns.json".to_string()
}

fn default_onnx_threads() -> usize {
    1
}

/// Request handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Number of concurrently processed requests
    pub workers: usize,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
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
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                predict_subject: "credit.predict".to_string(),
                health_subject: "credit.health".to_string(),
            },
            artifacts: ArtifactsConfig {
                dir: "artifacts".to_string(),
                model_file: default_model_file(),
                scaler_file: default_scaler_file(),
                features_file: default_features_file(),
                onnx_threads: 1,
            },
            pipeline: PipelineConfig { workers: 4 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.nats.predict_subject, "credit.predict");
        assert_eq!(config.artifacts.model_file, "model.onnx");
        assert_eq!(config.artifacts.onnx_threads, 1);
        assert_eq!(config.pipeline.workers, 4);
    }
}
