//! Response schemas for each remote endpoint
//!
//! Success payloads are decoded into these types; a payload that does not
//! match is reported as a decode error instead of being read field by field.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::transaction::{deserialize_amount, Transaction};

pub const LOGIN_ENDPOINT: &str = "/login";
pub const REGISTER_ENDPOINT: &str = "/register";
pub const BALANCE_ENDPOINT: &str = "/balance";
pub const TRANSACTIONS_ENDPOINT: &str = "/transactions";
pub const TRANSFER_ENDPOINT: &str = "/transfer";

/// POST /login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// POST /register
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user_id: Option<JsonValue>,
}

/// GET /balance
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    #[serde(deserialize_with = "deserialize_amount")]
    pub balance: Decimal,
}

/// GET /transactions
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default)]
    transactions: Option<Vec<Transaction>>,
}

impl TransactionsResponse {
    /// Missing or null `transactions` means an empty page
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions.unwrap_or_default()
    }
}

/// POST /transfer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned with non-2xx statuses
///
/// FastAPI reports `detail` as a string, or as a list of `{msg}` entries
/// for request validation failures. The rate limiter uses `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    detail: Option<JsonValue>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    /// Parse an error body, if it is a JSON object
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// The human-readable message, in order: detail, message, error
    pub fn message(&self) -> Option<String> {
        self.detail_text()
            .or_else(|| non_empty(self.message.as_deref()))
            .or_else(|| non_empty(self.error.as_deref()))
    }

    fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            JsonValue::String(s) => non_empty(Some(s)),
            JsonValue::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if msgs.is_empty() {
                    None
                } else {
                    Some(msgs.join("; "))
                }
            }
            _ => None,
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
