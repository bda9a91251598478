//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod account;
mod auth;
mod gateway;
pub mod logging;
mod transfer;

pub use account::{AccountService, BalanceSlice, Slice, TransactionsSlice, DEFAULT_PAGE_SIZE};
pub use auth::AuthService;
pub use gateway::{ApiRequest, Gateway, Payload};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use transfer::TransferWorkflow;
