//! Verdict and class probability types

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// Styling of the verdict alert box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStyle {
    Error,
    Success,
}

/// Binary verdict derived from the predictor's label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Fraud,
    Legitimate,
}

impl Verdict {
    /// Map a predictor label (1 = fraud, 0 = legitimate) to a verdict
    pub fn from_label(label: i64) -> Result<Self, ModelError> {
        match label {
            1 => Ok(Verdict::Fraud),
            0 => Ok(Verdict::Legitimate),
            other => Err(ModelError::InvalidLabel(other)),
        }
    }

    /// Label this verdict was built from
    pub fn label(&self) -> i64 {
        match self {
            Verdict::Fraud => 1,
            Verdict::Legitimate => 0,
        }
    }

    /// Alert text shown under "Prediction"
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Fraud => "This transaction can be a fraud",
            Verdict::Legitimate => "This transaction looks like safe",
        }
    }

    pub fn style(&self) -> AlertStyle {
        match self {
            Verdict::Fraud => AlertStyle::Error,
            Verdict::Legitimate => AlertStyle::Success,
        }
    }
}

/// Class probability vector `[p(legitimate), p(fraud)]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities(pub [f64; 2]);

impl ClassProbabilities {
    pub fn new(legitimate: f64, fraud: f64) -> Self {
        Self([legitimate, fraud])
    }

    /// Build from a binary classifier's positive-class probability
    pub fn from_fraud(fraud: f64) -> Self {
        Self([1.0 - fraud, fraud])
    }

    pub fn legitimate(&self) -> f64 {
        self.0[0]
    }

    pub fn fraud(&self) -> f64 {
        self.0[1]
    }

    /// Label with the highest probability. Ties go to the legitimate class.
    pub fn argmax(&self) -> i64 {
        if self.fraud() > self.legitimate() {
            1
        } else {
            0
        }
    }

    /// Fraud probability as a percentage with two decimals, e.g. `"73.00%"`
    pub fn fraud_percent(&self) -> String {
        format!("{:.2}%", self.fraud() * 100.0)
    }
}
