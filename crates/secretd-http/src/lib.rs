//! HTTP layer for secretd.
//!
//! This crate exposes a secret store's read and write operations as a small
//! REST-like API:
//!
//! - **Router** ([`router`]): strips the `/v1/secrets/` prefix and decodes the path
//! - **Store boundary** ([`dispatch::SecretStore`]): the two operations the gateway needs
//! - **Dispatcher** ([`dispatch::SecretDispatcher`]): validation, method branching, store calls
//! - **Classifier** ([`classify`]): store errors to status codes
//! - **Service** ([`service`]): hyper `Service` with health probes and common headers
//!
//! # Architecture
//!
//! ```text
//! HTTP Request
//!   -> SecretsHttpService (hyper Service)
//!     -> Health probe interception
//!     -> SecretRouter (prefix strip + percent-decoding)
//!     -> SecretDispatcher
//!       -> SecretPath::parse (400 on rejection, store never called)
//!       -> GET: read_latest / POST: write_new_version / other: 405
//!       -> classify on store error
//!     -> Common response headers (x-request-id, server)
//!   <- HTTP Response
//! ```

pub mod classify;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use classify::{ClassifiedError, classify};
pub use dispatch::{SecretDispatcher, SecretStore, StoreFuture};
pub use response::SecretResponse;
pub use router::{Route, SecretRouter};
pub use service::{SecretsHttpConfig, SecretsHttpService};
