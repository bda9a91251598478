//! Core domain entities
//!
//! All client-side entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod api;
mod slice;
mod transaction;
mod transfer;
pub mod result;

pub use slice::{FetchFailure, SliceSnapshot, SliceState};
pub use transaction::{Transaction, TransactionPage, TransactionType};
pub use transfer::{TransferForm, TransferOutcome, TransferPhase, TransferReceipt, TransferRequest};
