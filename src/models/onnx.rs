//! ONNX estimator behind the shared preprocessing step

use crate::error::ModelError;
use crate::models::Classifier;
use crate::preprocessor::Preprocessor;
use crate::types::{ClassProbabilities, TransactionRecord};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor};
use std::path::Path;
use std::sync::RwLock;
use tracing::{debug, info};

/// Preprocessor + ONNX Runtime session
pub struct OnnxPipeline {
    name: String,
    prep: Preprocessor,
    /// Session runs need exclusive access
    session: RwLock<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxPipeline {
    /// Load an exported estimator from file
    pub fn load<P: AsRef<Path>>(path: P, prep: Preprocessor, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("model artifact not found at {}", path.display());
        }

        ort::init().commit()?;
        info!(model = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .map(|o| o.name.clone())
            .unwrap_or_else(|| {
                session
                    .outputs
                    .last()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "probabilities".to_string())
            });

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features = prep.feature_count(),
            "Model loaded successfully"
        );

        Ok(Self {
            name,
            prep,
            session: RwLock::new(session),
            input_name,
            output_name,
        })
    }

    fn run(&self, features: &[f64]) -> Result<ClassProbabilities, ModelError> {
        let input: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let shape = vec![1_i64, input.len() as i64];
        let tensor = Tensor::from_array((shape, input))
            .map_err(|e| ModelError::Backend(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .write()
            .map_err(|e| ModelError::Backend(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| ModelError::Backend(e.to_string()))?;

        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            ModelError::MalformedOutput(format!("missing output {}", self.output_name))
        })?;

        // Plain tensor first, then the seq(map(int64, float)) layout of ZipMap exports
        let probs = if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            probabilities_from_tensor(&dims, data)?
        } else if DynSequenceValueType::can_downcast(&output.dtype()) {
            let pairs = extract_sequence_map(output)?;
            probabilities_from_class_map(&pairs)?
        } else {
            return Err(ModelError::MalformedOutput(format!(
                "output {} is neither a tensor nor a sequence of maps",
                self.output_name
            )));
        };

        debug!(model = %self.name, fraud = probs.fraud(), "ONNX inference complete");
        Ok(probs)
    }
}

/// Read `[p0, p1]` from a probability tensor of shape `[1, 2]`, `[2]` or `[1, 1]`
pub(crate) fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> Result<ClassProbabilities, ModelError> {
    let classes = match dims {
        [1, n] => *n,
        [n] => *n,
        other => {
            return Err(ModelError::MalformedOutput(format!(
                "unexpected probability shape {:?}",
                other
            )))
        }
    };

    match (classes, data) {
        (2, [p0, p1, ..]) => Ok(ClassProbabilities::new(*p0 as f64, *p1 as f64)),
        (1, [p1, ..]) => Ok(ClassProbabilities::from_fraud(*p1 as f64)),
        _ => Err(ModelError::MalformedOutput(format!(
            "expected 2 class probabilities, got shape {:?} with {} values",
            dims,
            data.len()
        ))),
    }
}

/// Key-value pairs of the first map in a seq(map(int64, float)) output
fn extract_sequence_map(output: &DynValue) -> Result<Vec<(i64, f32)>, ModelError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ModelError::MalformedOutput(format!("Failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| ModelError::MalformedOutput(e.to_string()))?;

    // Batch size is always 1
    let first = maps
        .first()
        .ok_or_else(|| ModelError::MalformedOutput("empty probability sequence".to_string()))?;

    first
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| ModelError::MalformedOutput(e.to_string()))
}

/// Read `[p0, p1]` from a class-id to probability map
pub(crate) fn probabilities_from_class_map(pairs: &[(i64, f32)]) -> Result<ClassProbabilities, ModelError> {
    let mut legitimate = None;
    let mut fraud = None;

    for &(class_id, prob) in pairs {
        match class_id {
            0 => legitimate = Some(prob as f64),
            1 => fraud = Some(prob as f64),
            other => {
                return Err(ModelError::MalformedOutput(format!(
                    "unexpected class {} in probability map",
                    other
                )))
            }
        }
    }

    match (legitimate, fraud) {
        (Some(p0), Some(p1)) => Ok(ClassProbabilities::new(p0, p1)),
        (None, Some(p1)) => Ok(ClassProbabilities::from_fraud(p1)),
        (Some(p0), None) => Ok(ClassProbabilities::from_fraud(1.0 - p0)),
        (None, None) => Err(ModelError::MalformedOutput(
            "no class probabilities in map".to_string(),
        )),
    }
}

impl Classifier for OnnxPipeline {
    fn predict_proba(&self, record: &TransactionRecord) -> Result<ClassProbabilities, ModelError> {
        let features = self.prep.transform(record)?;
        self.run(&features)
    }

    fn feature_transform(&self, record: &TransactionRecord) -> Result<Vec<f64>, ModelError> {
        self.prep.transform(record)
    }

    fn feature_names(&self) -> Vec<String> {
        self.prep.feature_names_out()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_from_tensor() {
        let probs = probabilities_from_tensor(&[1, 2], &[0.25, 0.75]).unwrap();
        assert_eq!(probs.fraud(), 0.75);

        let probs = probabilities_from_tensor(&[2], &[0.5, 0.5]).unwrap();
        assert_eq!(probs.legitimate(), 0.5);

        let probs = probabilities_from_tensor(&[1, 1], &[0.25]).unwrap();
        assert_eq!(probs.fraud(), 0.25);
        assert_eq!(probs.legitimate(), 0.75);
    }

    #[test]
    fn test_probabilities_from_class_map() {
        let probs = probabilities_from_class_map(&[(0, 0.25), (1, 0.75)]).unwrap();
        assert_eq!(probs.legitimate(), 0.25);
        assert_eq!(probs.fraud(), 0.75);

        // Order of entries does not matter
        let probs = probabilities_from_class_map(&[(1, 0.5), (0, 0.5)]).unwrap();
        assert_eq!(probs.argmax(), 0);

        let probs = probabilities_from_class_map(&[(0, 0.75)]).unwrap();
        assert_eq!(probs.fraud(), 0.25);
    }

    #[test]
    fn test_malformed_class_map() {
        assert!(probabilities_from_class_map(&[]).is_err());
        assert!(probabilities_from_class_map(&[(0, 0.2), (1, 0.3), (2, 0.5)]).is_err());
    }

    #[test]
    fn test_malformed_probabilities() {
        assert!(probabilities_from_tensor(&[1, 3], &[0.1, 0.2, 0.7]).is_err());
        assert!(probabilities_from_tensor(&[1, 2], &[0.1]).is_err());
        assert!(probabilities_from_tensor(&[1, 1, 2], &[0.1, 0.9]).is_err());
    }
}
