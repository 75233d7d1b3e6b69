//! Model and explainer artifact loader

use crate::config::{ModelKind, ModelsConfig};
use crate::models::explainer::LinearExplainer;
use crate::models::logistic::LogisticPipeline;
use crate::models::{Classifier, Explainer};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Loader for the two dashboard artifacts
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of ONNX threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self { onnx_threads }
    }

    /// Load the classifier configured in `models`
    pub fn load_classifier(&self, models: &ModelsConfig) -> Result<Box<dyn Classifier>> {
        match models.kind {
            ModelKind::Json => {
                let model = self.load_logistic(&models.model_path)?;
                Ok(Box::new(model))
            }
            ModelKind::Onnx => self.load_onnx(models),
        }
    }

    /// Load a logistic pipeline from a JSON model artifact
    pub fn load_logistic<P: AsRef<Path>>(&self, path: P) -> Result<LogisticPipeline> {
        let path = path.as_ref();
        let model: LogisticPipeline = read_artifact(path, "model")?;
        model
            .validate()
            .with_context(|| format!("Invalid model artifact {}", path.display()))?;

        info!(
            model = %model.name,
            path = %path.display(),
            features = model.prep.feature_count(),
            "Model loaded successfully"
        );

        Ok(model)
    }

    /// Load the explainer artifact
    pub fn load_explainer<P: AsRef<Path>>(&self, path: P) -> Result<Box<dyn Explainer>> {
        let path = path.as_ref();
        let explainer: LinearExplainer = read_artifact(path, "explainer")?;
        explainer
            .validate()
            .with_context(|| format!("Invalid explainer artifact {}", path.display()))?;

        info!(
            path = %path.display(),
            features = explainer.feature_count(),
            expected_value = explainer.expected_value(),
            "Explainer loaded successfully"
        );

        Ok(Box::new(explainer))
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, models: &ModelsConfig) -> Result<Box<dyn Classifier>> {
        let prep_path = models
            .preprocessor_path
            .as_deref()
            .context("models.preprocessor_path is required for ONNX models")?;
        let prep: crate::preprocessor::Preprocessor = read_artifact(Path::new(prep_path), "preprocessor")?;
        prep.validate()
            .with_context(|| format!("Invalid preprocessor artifact {}", prep_path))?;

        let model = crate::models::onnx::OnnxPipeline::load(&models.model_path, prep, self.onnx_threads)?;
        Ok(Box::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, models: &ModelsConfig) -> Result<Box<dyn Classifier>> {
        bail!(
            "Model {} is an ONNX artifact but this build has no `onnx` feature (threads: {})",
            models.model_path,
            self.onnx_threads
        )
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and deserialize a JSON artifact. A missing file is an error.
fn read_artifact<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        bail!("{} artifact not found at {}", what, path.display());
    }

    info!(artifact = what, path = %path.display(), "Loading artifact");

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} artifact {}", what, path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} artifact {}", what, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::logistic::LogisticRegression;
    use crate::preprocessor::Preprocessor;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_missing_artifact_fails() {
        let loader = ModelLoader::new();
        let err = loader.load_logistic(temp_path("missing.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));

        assert!(loader.load_explainer(temp_path("missing.json")).is_err());
    }

    #[test]
    fn test_load_roundtrip() {
        let model = LogisticPipeline::new(
            Preprocessor::new(),
            LogisticRegression {
                coefficients: vec![0.1; 10],
                intercept: -1.0,
            },
        );
        let path = temp_path("model.json");
        std::fs::write(&path, serde_json::to_string(&model).unwrap()).unwrap();

        let loaded = ModelLoader::new().load_logistic(&path).unwrap();
        assert_eq!(loaded, model);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_corrupt_artifact_fails() {
        let path = temp_path("explainer.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ModelLoader::new().load_explainer(&path).err().unwrap();
        assert!(err.to_string().contains("Failed to parse explainer artifact"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_explainer_rejected() {
        let path = temp_path("explainer.json");
        let explainer = LinearExplainer::new(vec![1.0, 2.0], 0.0, vec![0.0]);
        std::fs::write(&path, serde_json::to_string(&explainer).unwrap()).unwrap();

        assert!(ModelLoader::new().load_explainer(&path).is_err());

        std::fs::remove_file(path).ok();
    }
}
