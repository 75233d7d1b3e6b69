//! Type definitions for the fraud dashboard

pub mod evaluation;
pub mod transaction;
pub mod verdict;

pub use evaluation::{Evaluation, Explanation};
pub use transaction::{NumericField, TransactionRecord, TransactionType};
pub use verdict::{AlertStyle, ClassProbabilities, Verdict};
