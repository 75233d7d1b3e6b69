//! Logistic regression pipeline loaded from a JSON artifact

use crate::error::ModelError;
use crate::models::{sigmoid, Classifier};
use crate::preprocessor::Preprocessor;
use crate::types::{ClassProbabilities, TransactionRecord};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Linear estimator head
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    /// Log-odds of the fraud class
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        let dot: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.intercept)
    }
}

fn default_model_name() -> String {
    "logistic_regression".to_string()
}

/// Preprocessor + logistic regression, the serialized form of the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticPipeline {
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Preprocessing step
    pub prep: Preprocessor,

    /// Estimator step
    pub classifier: LogisticRegression,
}

impl LogisticPipeline {
    pub fn new(prep: Preprocessor, classifier: LogisticRegression) -> Self {
        Self {
            name: default_model_name(),
            prep,
            classifier,
        }
    }

    /// Check the preprocessing step and estimator agree on the feature count
    pub fn validate(&self) -> Result<()> {
        self.prep.validate()?;

        if self.classifier.coefficients.len() != self.prep.feature_count() {
            bail!(
                "Model has {} coefficients but preprocessing produces {} features",
                self.classifier.coefficients.len(),
                self.prep.feature_count()
            );
        }
        if !self.classifier.intercept.is_finite()
            || self.classifier.coefficients.iter().any(|w| !w.is_finite())
        {
            bail!("Model parameters must be finite");
        }

        Ok(())
    }

    /// Log-odds for a record
    pub fn decision_function(&self, record: &TransactionRecord) -> Result<f64, ModelError> {
        let features = self.prep.transform(record)?;
        self.classifier.decision_function(&features)
    }
}

impl Classifier for LogisticPipeline {
    fn predict_proba(&self, record: &TransactionRecord) -> Result<ClassProbabilities, ModelError> {
        let z = self.decision_function(record)?;
        Ok(ClassProbabilities::from_fraud(sigmoid(z)))
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
