//! Transaction record entered on the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transaction type, one of the five categories the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[default]
    Payment,
    Transfer,
    CashOut,
    Deposit,
    CashIn,
}

impl TransactionType {
    /// All types in the order the selector lists them
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Payment,
        TransactionType::Transfer,
        TransactionType::CashOut,
        TransactionType::Deposit,
        TransactionType::CashIn,
    ];

    /// Literal category string used by the model and the form
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::CashOut => "CASH_OUT",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::CashIn => "CASH_IN",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown transaction type: {}", s))
    }
}

/// Numeric columns of a record, in model input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    #[serde(rename = "amount")]
    Amount,
    #[serde(rename = "oldbalanceOrg")]
    OldBalanceOrig,
    #[serde(rename = "newbalanceOrig")]
    NewBalanceOrig,
    #[serde(rename = "oldbalanceDest")]
    OldBalanceDest,
    #[serde(rename = "newbalanceDest")]
    NewBalanceDest,
}

impl NumericField {
    pub const ALL: [NumericField; 5] = [
        NumericField::Amount,
        NumericField::OldBalanceOrig,
        NumericField::NewBalanceOrig,
        NumericField::OldBalanceDest,
        NumericField::NewBalanceDest,
    ];

    /// Column name as used in the training data
    pub fn column(&self) -> &'static str {
        match self {
            NumericField::Amount => "amount",
            NumericField::OldBalanceOrig => "oldbalanceOrg",
            NumericField::NewBalanceOrig => "newbalanceOrig",
            NumericField::OldBalanceDest => "oldbalanceDest",
            NumericField::NewBalanceDest => "newbalanceDest",
        }
    }
}

/// One transaction to be scored.
///
/// Built fresh from the sidebar controls on every trigger and dropped once the
/// page is rendered. Field names on the wire match the training columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction type
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Transaction amount
    pub amount: f64,

    /// Sender balance before the transaction
    #[serde(rename = "oldbalanceOrg")]
    pub old_balance_orig: f64,

    /// Sender balance after the transaction
    #[serde(rename = "newbalanceOrig")]
    pub new_balance_orig: f64,

    /// Receiver balance before the transaction
    #[serde(rename = "oldbalanceDest")]
    pub old_balance_dest: f64,

    /// Receiver balance after the transaction
    #[serde(rename = "newbalanceDest")]
    pub new_balance_dest: f64,
}

impl TransactionRecord {
    /// Create a record with the given type and amount and zero balances
    pub fn new(transaction_type: TransactionType, amount: f64) -> Self {
        Self {
            transaction_type,
            amount,
            old_balance_orig: 0.0,
            new_balance_orig: 0.0,
            old_balance_dest: 0.0,
            new_balance_dest: 0.0,
        }
    }

    /// Set the sender balances
    pub fn with_sender_balances(mut self, old: f64, new: f64) -> Self {
        self.old_balance_orig = old;
        self.new_balance_orig = new;
        self
    }

    /// Set the receiver balances
    pub fn with_receiver_balances(mut self, old: f64, new: f64) -> Self {
        self.old_balance_dest = old;
        self.new_balance_dest = new;
        self
    }

    /// Value of a numeric column
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Amount => self.amount,
            NumericField::OldBalanceOrig => self.old_balance_orig,
            NumericField::NewBalanceOrig => self.new_balance_orig,
            NumericField::OldBalanceDest => self.old_balance_dest,
            NumericField::NewBalanceDest => self.new_balance_dest,
        }
    }
}

impl Default for TransactionRecord {
    fn default() -> Self {
        Self::new(TransactionType::default(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_has_exactly_six_columns() {
        for tx_type in TransactionType::ALL {
            let record = TransactionRecord::new(tx_type, 250.0)
                .with_sender_balances(1000.0, 750.0)
                .with_receiver_balances(0.0, 250.0);

            let json = serde_json::to_string(&record).unwrap();
            assert_eq!(
                json,
                format!(
                    "{{\"type\":\"{}\",\"amount\":250.0,\"oldbalanceOrg\":1000.0,\
                     \"newbalanceOrig\":750.0,\"oldbalanceDest\":0.0,\"newbalanceDest\":250.0}}",
                    tx_type.as_str()
                )
            );

            let value = serde_json::to_value(&record).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 6);
            assert_eq!(object["type"], tx_type.as_str());
            assert_eq!(object["amount"], 250.0);
        }
    }

    #[test]
    fn test_transaction_type_parsing() {
        assert_eq!("CASH_OUT".parse::<TransactionType>(), Ok(TransactionType::CashOut));
        assert!("WIRE".parse::<TransactionType>().is_err());

        let parsed: TransactionType = serde_json::from_str("\"CASH_IN\"").unwrap();
        assert_eq!(parsed, TransactionType::CashIn);
    }

    #[test]
    fn test_numeric_accessor() {
        let record = TransactionRecord::new(TransactionType::Transfer, 10.0)
            .with_sender_balances(20.0, 30.0)
            .with_receiver_balances(40.0, 50.0);

        let values: Vec<f64> = NumericField::ALL.iter().map(|f| record.numeric(*f)).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }
}
