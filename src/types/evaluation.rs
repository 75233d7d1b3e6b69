//! Outcome of one Predict trigger

use crate::error::ModelError;
use crate::types::transaction::TransactionRecord;
use crate::types::verdict::{ClassProbabilities, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-feature attributions for a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Output-space value of the model over the background data, `E[f(X)]`
    pub base_value: f64,

    /// Transformed feature names, in model input order
    pub feature_names: Vec<String>,

    /// Transformed feature values for this record
    pub data: Vec<f64>,

    /// Attribution of each feature to the model output
    pub values: Vec<f64>,
}

impl Explanation {
    /// Model output this explanation adds up to, `f(x)`
    pub fn output_value(&self) -> f64 {
        self.base_value + self.values.iter().sum::<f64>()
    }

    /// Feature indices ordered by absolute attribution, largest first.
    ///
    /// Equal magnitudes keep input order so plots are stable.
    pub fn order_by_magnitude(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| self.values[b].abs().total_cmp(&self.values[a].abs()));
        order
    }

    /// Check that names, data and attributions all cover `features` features
    pub fn check_shape(&self, features: usize) -> Result<(), ModelError> {
        for actual in [self.feature_names.len(), self.data.len(), self.values.len()] {
            if actual != features {
                return Err(ModelError::DimensionMismatch {
                    expected: features,
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything rendered for one trigger.
///
/// Built from a fresh record, never stored past the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Unique identifier, used to correlate log lines
    pub evaluation_id: String,

    pub record: TransactionRecord,

    /// Raw predictor label (1 = fraud, 0 = legitimate)
    pub label: i64,

    pub verdict: Verdict,

    pub probabilities: ClassProbabilities,

    pub explanation: Explanation,

    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    pub fn new(
        record: TransactionRecord,
        verdict: Verdict,
        probabilities: ClassProbabilities,
        explanation: Explanation,
    ) -> Self {
        Self {
            evaluation_id: uuid::Uuid::new_v4().to_string(),
            record,
            label: verdict.label(),
            verdict,
            probabilities,
            explanation,
            evaluated_at: Utc::now(),
        }
    }

    /// Fraud probability as shown in the metric widget
    pub fn fraud_percent(&self) -> String {
        self.probabilities.fraud_percent()
    }
}
