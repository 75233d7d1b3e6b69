//! Linear attribution explainer.
//!
//! For a linear model in log-odds space the exact Shapley value of feature
//! `i` against an independent background is `coef_i * (x_i - mean_i)`, and the
//! base value is the model output at the background mean. The attributions
//! then add up to the model's log-odds for the record.

use crate::error::ModelError;
use crate::models::Explainer;
use crate::types::Explanation;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Serialized form of the explainer artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearExplainer {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Mean of each transformed feature over the background data
    pub background_mean: Vec<f64>,
}

impl LinearExplainer {
    pub fn new(coefficients: Vec<f64>, intercept: f64, background_mean: Vec<f64>) -> Self {
        Self {
            coefficients,
            intercept,
            background_mean,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != self.background_mean.len() {
            bail!(
                "Explainer has {} coefficients but {} background means",
                self.coefficients.len(),
                self.background_mean.len()
            );
        }
        if self.coefficients.is_empty() {
            bail!("Explainer has no features");
        }
        Ok(())
    }

    /// `E[f(X)]` over the background data
    pub fn expected_value(&self) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(&self.background_mean)
                .map(|(w, m)| w * m)
                .sum::<f64>()
    }

    pub fn feature_count(&self) -> usize {
        self.coefficients.len()
    }
}

impl Explainer for LinearExplainer {
    fn explain(&self, features: &[f64], feature_names: &[String]) -> Result<Explanation, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }
        if feature_names.len() != features.len() {
            return Err(ModelError::DimensionMismatch {
                expected: features.len(),
                actual: feature_names.len(),
            });
        }

        let values = features
            .iter()
            .zip(&self.coefficients)
            .zip(&self.background_mean)
            .map(|((x, w), m)| w * (x - m))
            .collect();

        Ok(Explanation {
            base_value: self.expected_value(),
            feature_names: feature_names.to_vec(),
            data: features.to_vec(),
            values,
        })
    }

    fn expected_features(&self) -> Option<usize> {
        Some(self.feature_count())
    }
}
