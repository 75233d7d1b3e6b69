//! Smart Fraud Detector Library
//!
//! An interactive dashboard that scores a manually entered transaction with a
//! pre-trained fraud model and explains the prediction with per-feature
//! attributions.

pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod models;
pub mod preprocessor;
pub mod render;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{InputError, ModelError};
pub use input::TransactionForm;
pub use models::inference::InferenceEngine;
pub use models::{Classifier, Explainer};
pub use preprocessor::Preprocessor;
pub use types::{Evaluation, Explanation, TransactionRecord, TransactionType, Verdict};
