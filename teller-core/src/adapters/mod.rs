//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - File and in-memory holders for the CredentialStore port
//! - reqwest HTTP client for the HttpTransport port
//! - Scripted in-process transport for tests and offline demos

pub mod file_store;
pub mod http;
pub mod memory;
pub mod scripted;

#[cfg(test)]
pub mod mock_server;

pub use file_store::FileCredentialStore;
pub use http::ReqwestTransport;
pub use memory::MemoryCredentialStore;
pub use scripted::ScriptedTransport;
