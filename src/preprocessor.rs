//! Preprocessing step of the fraud model pipeline.
//!
//! Turns a transaction record into the numeric feature vector the estimator
//! was trained on: a one-hot block for the transaction type followed by the
//! numeric columns, optionally standardized. Feature names follow the
//! column-transformer convention (`cat__type_CASH_OUT`, `num__amount`).

use crate::error::ModelError;
use crate::types::transaction::{NumericField, TransactionRecord, TransactionType};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Per-column standardization, `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on columns of samples (population standard deviation)
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());

        for column in columns {
            let n = column.len().max(1) as f64;
            let m = column.iter().sum::<f64>() / n;
            let variance = column.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
            mean.push(m);
            scale.push(variance.sqrt());
        }

        Self { mean, scale }
    }

    fn apply(&self, index: usize, value: f64) -> f64 {
        let scale = self.scale[index];
        // Zero-variance columns are only centered
        let scale = if scale == 0.0 { 1.0 } else { scale };
        (value - self.mean[index]) / scale
    }
}

fn default_categories() -> Vec<TransactionType> {
    // Sorted, as the encoder learns them during fit
    vec![
        TransactionType::CashIn,
        TransactionType::CashOut,
        TransactionType::Deposit,
        TransactionType::Payment,
        TransactionType::Transfer,
    ]
}

fn default_numeric() -> Vec<NumericField> {
    NumericField::ALL.to_vec()
}

/// Feature preprocessor shared by every estimator backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    /// One-hot categories for the transaction type, in output order
    #[serde(default = "default_categories")]
    pub categories: Vec<TransactionType>,

    /// Numeric columns, in output order
    #[serde(default = "default_numeric")]
    pub numeric: Vec<NumericField>,

    /// Optional standardization of the numeric columns
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl Preprocessor {
    /// Create a preprocessor with the default layout and no scaling.
    pub fn new() -> Self {
        Self {
            categories: default_categories(),
            numeric: default_numeric(),
            scaler: None,
        }
    }

    /// Attach a fitted scaler
    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    /// Check that the layout is usable. Run once after loading an artifact.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() && self.numeric.is_empty() {
            bail!("Preprocessor produces no features");
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != self.numeric.len() || scaler.scale.len() != self.numeric.len() {
                bail!(
                    "Scaler has {} means and {} scales for {} numeric columns",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    self.numeric.len()
                );
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s < 0.0) {
                bail!("Scaler scales must be finite and non-negative");
            }
        }

        Ok(())
    }

    /// Transform a record into model input features.
    ///
    /// Unknown categories encode as an all-zero block.
    pub fn transform(&self, record: &TransactionRecord) -> Result<Vec<f64>, ModelError> {
        let mut features = Vec::with_capacity(self.feature_count());

        for category in &self.categories {
            let hot = if *category == record.transaction_type { 1.0 } else { 0.0 };
            features.push(hot);
        }

        for (index, field) in self.numeric.iter().enumerate() {
            let raw = record.numeric(*field);
            let value = match &self.scaler {
                Some(scaler) => {
                    if index >= scaler.mean.len() || index >= scaler.scale.len() {
                        return Err(ModelError::DimensionMismatch {
                            expected: self.numeric.len(),
                            actual: scaler.mean.len().min(scaler.scale.len()),
                        });
                    }
                    scaler.apply(index, raw)
                }
                None => raw,
            };
            features.push(value);
        }

        Ok(features)
    }

    /// Number of features produced
    pub fn feature_count(&self) -> usize {
        self.categories.len() + self.numeric.len()
    }

    /// Output feature names, matching `transform` order
    pub fn feature_names_out(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("cat__type_{}", c.as_str()))
            .chain(self.numeric.iter().map(|f| format!("num__{}", f.column())))
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
