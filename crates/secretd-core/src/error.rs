//! Error types for secretd setup.
//!
//! These cover everything that can go wrong before the server accepts its
//! first connection. Request-time failures are [`secretd_model::StoreError`].

use std::path::PathBuf;

/// Error raised while loading configuration, credentials or store clients.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// The selected backend needs a credential and none was given.
    #[error("credential is required")]
    CredentialRequired,

    /// The credential resolved to an empty value.
    #[error("credential is empty")]
    EmptyCredential,

    /// The credential file could not be read.
    #[error("cannot read credential file {path}: {source}")]
    CredentialRead {
        /// Path of the credential file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The HTTP client for the remote store could not be built.
    #[error("cannot create secret store client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Convenience result type for secretd setup.
pub type CoreResult<T> = Result<T, CoreError>;
