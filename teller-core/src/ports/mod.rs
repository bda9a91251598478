//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod credential_store;
mod transport;

pub use credential_store::CredentialStore;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
