//! Teller Core - client core for a session-authenticated banking service
//!
//! This crate implements the client logic following hexagonal architecture:
//!
//! - **domain**: Core entities (Transaction, TransferRequest, slice states, errors)
//! - **ports**: Trait definitions for external dependencies (CredentialStore, HttpTransport)
//! - **services**: Business logic orchestration (Gateway, AccountService, TransferWorkflow, ...)
//! - **adapters**: Concrete implementations (file/memory credential stores, reqwest transport)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use adapters::{FileCredentialStore, ReqwestTransport};
use config::Config;
use ports::{CredentialStore, HttpTransport};
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    SliceState, Transaction, TransactionPage, TransactionType, TransferOutcome, TransferPhase,
    TransferReceipt,
};
pub use domain::result::{Error, ErrorKind, OperationResult, ValidationError};

/// Main context for Teller operations
///
/// Holds the configuration, the credential store and all services, wired
/// to one shared gateway.
pub struct TellerContext {
    pub config: Config,
    pub app_dir: PathBuf,
    pub credentials: Arc<dyn CredentialStore>,
    pub gateway: Arc<Gateway>,
    pub accounts: Arc<AccountService>,
    pub auth: AuthService,
    pub transfers: TransferWorkflow,
}

impl TellerContext {
    /// Create a context backed by the app directory and the network
    pub fn new(app_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(app_dir)?;
        let credentials = Arc::new(FileCredentialStore::new(app_dir));
        let transport = Arc::new(ReqwestTransport::new(config.timeout())?);

        Ok(Self::with_parts(config, app_dir, credentials, transport)?)
    }

    /// Create a context from explicit parts (alternate stores, fake transports)
    pub fn with_parts(
        config: Config,
        app_dir: &Path,
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> domain::result::Result<Self> {
        let gateway = Arc::new(Gateway::new(
            &config.base_url,
            Arc::clone(&credentials),
            transport,
        )?);
        let accounts = Arc::new(AccountService::new(Arc::clone(&gateway), config.page_size));
        let auth = AuthService::new(
            Arc::clone(&gateway),
            Arc::clone(&credentials),
            Arc::clone(&accounts),
        );
        let transfers = TransferWorkflow::new(Arc::clone(&gateway), Arc::clone(&accounts));

        Ok(Self {
            config,
            app_dir: app_dir.to_path_buf(),
            credentials,
            gateway,
            accounts,
            auth,
            transfers,
        })
    }
}
