//! Transfer request, form and workflow state

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{ErrorKind, ValidationError};

/// Raw text fields entered by the user before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
}

impl TransferForm {
    pub fn clear(&mut self) {
        self.recipient.clear();
        self.amount.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.recipient.is_empty() && self.amount.is_empty()
    }
}

/// A validated peer-to-peer transfer, ready to be submitted once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub recipient_username: String,
    pub amount: Decimal,
}

impl TransferRequest {
    /// Validate user input into a request
    ///
    /// Checks run in order: recipient present, amount present, amount
    /// numeric, amount positive.
    pub fn parse(recipient: &str, amount_text: &str) -> Result<Self, ValidationError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(ValidationError::MissingRecipient);
        }

        let amount_text = amount_text.trim();
        if amount_text.is_empty() {
            return Err(ValidationError::MissingAmount);
        }

        let amount = Decimal::from_str(amount_text)
            .or_else(|_| Decimal::from_scientific(amount_text))
            .map_err(|_| classify_unparsed(amount_text))?;

        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        Ok(Self {
            recipient_username: recipient.to_string(),
            amount: amount.normalize(),
        })
    }

    /// Query parameters for POST /transfer
    pub fn query_params(&self) -> Vec<(String, String)> {
        vec![
            ("recipient_username".to_string(), self.recipient_username.clone()),
            ("amount".to_string(), self.amount.to_string()),
        ]
    }
}

/// Why text that is not a `Decimal` was rejected: numbers beyond its range
/// are reported as such, anything else is not a number at all.
fn classify_unparsed(amount_text: &str) -> ValidationError {
    let has_digits = amount_text.chars().any(|c| c.is_ascii_digit());
    match amount_text.parse::<f64>() {
        Ok(value) if has_digits && !value.is_nan() => {
            if value <= 0.0 {
                ValidationError::NonPositiveAmount
            } else {
                ValidationError::AmountOutOfRange
            }
        }
        _ => ValidationError::NonNumericAmount,
    }
}

/// Transfer workflow phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "reason", rename_all = "snake_case")]
pub enum TransferPhase {
    #[default]
    Idle,
    /// Form open for entry
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed(String),
}

impl TransferPhase {
    /// A submission holds the claim. It keeps it through Succeeded (the
    /// post-transfer refresh is still running) and Failed until it returns
    /// the workflow to Idle.
    pub fn is_in_flight(&self) -> bool {
        !matches!(self, TransferPhase::Idle | TransferPhase::Editing)
    }

    /// A submission has resolved and is waiting to return to Idle
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferPhase::Succeeded | TransferPhase::Failed(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPhase::Idle => "IDLE",
            TransferPhase::Editing => "EDITING",
            TransferPhase::Validating => "VALIDATING",
            TransferPhase::Submitting => "SUBMITTING",
            TransferPhase::Succeeded => "SUCCEEDED",
            TransferPhase::Failed(_) => "FAILED",
        }
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confirmation of an accepted transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub recipient_username: String,
    pub amount: Decimal,
    pub message: String,
}

/// Result of the last completed submission, kept after the phase returns to Idle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    Succeeded(TransferReceipt),
    Failed { kind: ErrorKind, reason: String },
}
