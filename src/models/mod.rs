//! Model components: the predictor and explainer seams and their backends

pub mod explainer;
pub mod inference;
pub mod loader;
pub mod logistic;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use explainer::LinearExplainer;
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
pub use logistic::LogisticPipeline;

use crate::error::ModelError;
use crate::types::{ClassProbabilities, Explanation, TransactionRecord};

/// Trained fraud classifier with an embedded preprocessing step
pub trait Classifier: Send + Sync {
    /// Class probabilities `[p(legitimate), p(fraud)]` for one record
    fn predict_proba(&self, record: &TransactionRecord) -> Result<ClassProbabilities, ModelError>;

    /// Binary label for one record (1 = fraud, 0 = legitimate)
    fn predict(&self, record: &TransactionRecord) -> Result<i64, ModelError> {
        Ok(self.predict_proba(record)?.argmax())
    }

    /// Numeric features produced by the preprocessing step
    fn feature_transform(&self, record: &TransactionRecord) -> Result<Vec<f64>, ModelError>;

    /// Names of the features returned by `feature_transform`
    fn feature_names(&self) -> Vec<String>;

    /// Model name for logs
    fn name(&self) -> &str;
}

/// Produces per-feature attributions for transformed features
pub trait Explainer: Send + Sync {
    fn explain(&self, features: &[f64], feature_names: &[String]) -> Result<Explanation, ModelError>;

    /// Number of features the explainer was fitted on, if fixed
    fn expected_features(&self) -> Option<usize> {
        None
    }
}

/// Logistic function
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
