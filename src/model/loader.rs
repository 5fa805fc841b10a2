//! Artifact loading for the frozen classifier, scaler and column schema

use crate::config::ArtifactsConfig;
use crate::model::scaler::StandardScaler;
use crate::model::scorer::{OnnxClassifier, ScoringContext};
use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::Path;
use tracing::info;

/// Loader for the three frozen training artifacts.
///
/// Every load failure is fatal: the service must never reach a
/// request-accepting state with a missing or corrupt artifact.
pub struct ArtifactLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ArtifactLoader {
    /// Create a new artifact loader with default settings (1 thread)
    pub fn new() -> Result<Self> {
        Self::with_threads(1)
    }

    /// Create a new artifact loader with the given ONNX thread count
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        // Initialize ONNX Runtime
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the ONNX classifier from file
    pub fn load_classifier<P: AsRef<Path>>(&self, path: P) -> Result<OnnxClassifier> {
        let path = path.as_ref();

        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX classifier");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load classifier from {:?}", path))?;

        let classifier = OnnxClassifier::from_session(session);

        info!(
            input = %classifier.input_name(),
            output = %classifier.output_name(),
            "Classifier loaded successfully"
        );

        Ok(classifier)
    }

    /// Load the fitted scaler parameters from a JSON artifact
    pub fn load_scaler<P: AsRef<Path>>(path: P) -> Result<StandardScaler> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .context(format!("Failed to read scaler artifact from {:?}", path))?;
        let scaler: StandardScaler = serde_json::from_str(&raw)
            .context(format!("Failed to parse scaler artifact {:?}", path))?;

        if scaler.mean.len() != scaler.scale.len() {
            bail!(
                "scaler artifact {:?} is inconsistent: {} mean values, {} scale values",
                path,
                scaler.mean.len(),
                scaler.scale.len()
            );
        }

        info!(path = %path.display(), columns = scaler.len(), "Scaler loaded successfully");
        Ok(scaler)
    }

    /// Load the ordered training column schema from a JSON artifact
    pub fn load_feature_columns<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .context(format!("Failed to read feature columns from {:?}", path))?;
        let columns: Vec<String> = serde_json::from_str(&raw)
            .context(format!("Failed to parse feature columns {:?}", path))?;

        if columns.is_empty() {
            bail!("feature column artifact {:?} is empty", path);
        }

        info!(path = %path.display(), columns = columns.len(), "Feature columns loaded successfully");
        Ok(columns)
    }

    /// Load all three artifacts and assemble the scoring context.
    ///
    /// Cross-checks that the scaler was fitted on exactly the schema's
    /// columns; artifacts from different training runs fail here instead
    /// of producing silent garbage at inference.
    pub fn load_context(&self, config: &ArtifactsConfig) -> Result<ScoringContext> {
        let dir = Path::new(&config.dir);

        let feature_columns = Self::load_feature_columns(dir.join(&config.features_file))?;
        let scaler = Self::load_scaler(dir.join(&config.scaler_file))?;

        if scaler.len() != feature_columns.len() {
            bail!(
                "artifacts disagree on the feature schema: scaler fitted on {} columns, schema lists {}",
                scaler.len(),
                feature_columns.len()
            );
        }

        let classifier = self.load_classifier(dir.join(&config.model_file))?;

        info!(
            features = feature_columns.len(),
            dir = %dir.display(),
            "All artifacts loaded"
        );

        Ok(ScoringContext::new(
            Box::new(classifier),
            scaler,
            feature_columns,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_artifact(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("cds_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_scaler_from_artifact() {
        let path = temp_artifact("scaler.json", r#"{"mean": [1.0, 2.0], "scale": [3.0, 4.0]}"#);
        let scaler = ArtifactLoader::load_scaler(&path).unwrap();
        assert_eq!(scaler.mean, vec![1.0, 2.0]);
        assert_eq!(scaler.scale, vec![3.0, 4.0]);
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_scaler_missing_file_fails() {
        let path = std::env::temp_dir().join("cds_no_such_scaler.json");
        assert!(ArtifactLoader::load_scaler(path).is_err());
    }

    #[test]
    fn test_load_scaler_inconsistent_lengths_fail() {
        let path = temp_artifact("bad_scaler.json", r#"{"mean": [1.0, 2.0], "scale": [3.0]}"#);
        assert!(ArtifactLoader::load_scaler(&path).is_err());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_feature_columns_from_artifact() {
        let path = temp_artifact(
            "features.json",
            r#"["LIMIT_BAL", "AGE", "SEX_M", "SEX_F"]"#,
        );
        let columns = ArtifactLoader::load_feature_columns(&path).unwrap();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0], "LIMIT_BAL");
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_feature_columns_missing_file_fails() {
        let path = std::env::temp_dir().join("cds_no_such_features.json");
        assert!(ArtifactLoader::load_feature_columns(path).is_err());
    }

    #[test]
    fn test_empty_feature_columns_fail() {
        let path = temp_artifact("empty_features.json", "[]");
        assert!(ArtifactLoader::load_feature_columns(&path).is_err());
        fs::remove_file(path).ok();
    }
}
