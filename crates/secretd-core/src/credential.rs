//! Credential loading.
//!
//! A credential is either given inline or as the path of a file holding it.
//! It is handed to the store client as-is; unlocking it with the passphrase is
//! the store's job.

use std::fmt;
use std::path::Path;

use crate::error::{CoreError, CoreResult};

/// Credential used to authenticate against the secret store.
///
/// `Debug` never prints the credential or the passphrase.
#[derive(Clone)]
pub struct Credential {
    token: String,
    passphrase: Option<String>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credential {
    /// Create a credential from a value already in memory.
    pub fn new(token: impl Into<String>, passphrase: Option<String>) -> CoreResult<Self> {
        let token = token.into().trim().to_owned();
        if token.is_empty() {
            return Err(CoreError::EmptyCredential);
        }
        Ok(Self {
            token,
            passphrase: passphrase.filter(|p| !p.is_empty()),
        })
    }

    /// Load a credential from `source`.
    ///
    /// If `source` names an existing file, the credential is read from it;
    /// otherwise `source` itself is the credential.
    pub fn load(source: &str, passphrase: Option<String>) -> CoreResult<Self> {
        let path = Path::new(source);
        if path.is_file() {
            let contents =
                std::fs::read_to_string(path).map_err(|source| CoreError::CredentialRead {
                    path: path.to_path_buf(),
                    source,
                })?;
            tracing::debug!(path = %path.display(), "loaded credential from file");
            return Self::new(contents, passphrase);
        }
        Self::new(source, passphrase)
    }

    /// The credential value.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The passphrase, if one was given.
    #[must_use]
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }
}
