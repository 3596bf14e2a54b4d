//! Secret store clients and setup for secretd.
//!
//! This crate provides the pieces the server wires together at startup:
//!
//! - [`config`]: environment-driven gateway configuration
//! - [`credential`]: credential loading, inline or from a file
//! - [`memory`]: a process-local [`SecretStore`](secretd_http::SecretStore)
//! - [`remote`]: the HTTP client for the remote secret store
//! - [`store`]: picks a client from the configuration
//!
//! Both clients run the same write checks from [`guard`] before a write is
//! accepted.

pub mod config;
pub mod credential;
pub mod error;
pub mod guard;
pub mod memory;
pub mod remote;
pub mod store;

pub use config::{GatewayConfig, StoreBackend};
pub use credential::Credential;
pub use error::{CoreError, CoreResult};
pub use memory::MemorySecretStore;
pub use remote::RemoteSecretStore;
pub use store::build_store;
