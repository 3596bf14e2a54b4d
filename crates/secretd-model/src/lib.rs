//! Model types for secretd.
//!
//! This crate holds the vocabulary shared by the HTTP layer and the store
//! implementations:
//!
//! - **Paths**: [`SecretPath`] and the path grammar the store enforces
//! - **Versions**: [`SecretVersion`] and [`VersionMeta`]
//! - **Errors**: [`StoreError`], the closed set of outcomes a store call can fail with

pub mod error;
pub mod path;
pub mod version;

pub use error::StoreError;
pub use path::{PathError, SecretPath, VersionRef, validate_secret_path};
pub use version::{MAX_SECRET_SIZE, SecretVersion, VersionMeta};
