//! Input collector: sidebar controls and the record they produce

use crate::error::InputError;
use crate::types::transaction::{NumericField, TransactionRecord, TransactionType};
use serde::Deserialize;

/// Label of the transaction type selector
pub const TYPE_LABEL: &str = "Select Transaction Type";

/// A numeric entry control in the sidebar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericControl {
    pub field: NumericField,
    pub label: &'static str,
    pub min: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericControl {
    const fn new(field: NumericField, label: &'static str) -> Self {
        Self {
            field,
            label,
            min: 0.0,
            step: 10.0,
            default: 0.0,
        }
    }

    /// Form field name
    pub fn name(&self) -> &'static str {
        self.field.column()
    }

    /// Parse and range-check a submitted value. Blank input takes the default.
    pub fn parse(&self, raw: &str) -> Result<f64, InputError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(self.default);
        }

        let value: f64 = raw.parse().map_err(|_| InputError::NotANumber {
            field: self.name(),
            value: raw.to_string(),
        })?;

        self.check(value)
    }

    /// Range-check a value
    pub fn check(&self, value: f64) -> Result<f64, InputError> {
        if !value.is_finite() {
            return Err(InputError::NotFinite { field: self.name() });
        }
        if value < self.min {
            return Err(InputError::BelowMinimum {
                field: self.name(),
                min: self.min,
                value,
            });
        }
        Ok(value)
    }
}

/// Numeric controls in sidebar order
pub const NUMERIC_CONTROLS: [NumericControl; 5] = [
    NumericControl::new(NumericField::Amount, "Transaction Amount"),
    NumericControl::new(NumericField::OldBalanceOrig, "Old Balance (Sender)"),
    NumericControl::new(NumericField::NewBalanceOrig, "New Balance (Sender)"),
    NumericControl::new(NumericField::OldBalanceDest, "Old Balance (Receiver)"),
    NumericControl::new(NumericField::NewBalanceDest, "New Balance (Receiver)"),
];

/// Raw sidebar submission.
///
/// Numbers arrive as text so a blank field can fall back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub amount: String,
    #[serde(rename = "oldbalanceOrg", default)]
    pub old_balance_orig: String,
    #[serde(rename = "newbalanceOrig", default)]
    pub new_balance_orig: String,
    #[serde(rename = "oldbalanceDest", default)]
    pub old_balance_dest: String,
    #[serde(rename = "newbalanceDest", default)]
    pub new_balance_dest: String,
}

impl TransactionForm {
    /// Submitted text for a numeric field
    pub fn raw(&self, field: NumericField) -> &str {
        match field {
            NumericField::Amount => &self.amount,
            NumericField::OldBalanceOrig => &self.old_balance_orig,
            NumericField::NewBalanceOrig => &self.new_balance_orig,
            NumericField::OldBalanceDest => &self.old_balance_dest,
            NumericField::NewBalanceDest => &self.new_balance_dest,
        }
    }

    /// Assemble the single-row record from the current control values
    pub fn collect(&self) -> Result<TransactionRecord, InputError> {
        let mut values = [0.0; 5];
        for (slot, control) in values.iter_mut().zip(NUMERIC_CONTROLS.iter()) {
            *slot = control.parse(self.raw(control.field))?;
        }

        Ok(TransactionRecord {
            transaction_type: self.transaction_type,
            amount: values[0],
            old_balance_orig: values[1],
            new_balance_orig: values[2],
            old_balance_dest: values[3],
            new_balance_dest: values[4],
        })
    }
}

impl From<&TransactionRecord> for TransactionForm {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            transaction_type: record.transaction_type,
            amount: record.amount.to_string(),
            old_balance_orig: record.old_balance_orig.to_string(),
            new_balance_orig: record.new_balance_orig.to_string(),
            old_balance_dest: record.old_balance_dest.to_string(),
            new_balance_dest: record.new_balance_dest.to_string(),
        }
    }
}

/// Range-check a record that did not come through the sidebar
pub fn validate_record(record: &TransactionRecord) -> Result<(), InputError> {
    for control in &NUMERIC_CONTROLS {
        control.check(record.numeric(control.field))?;
    }
    Ok(())
}
