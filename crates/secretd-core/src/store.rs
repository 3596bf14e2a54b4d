//! Store client selection.

use std::sync::Arc;
use std::time::Duration;

use secretd_http::SecretStore;

use crate::config::{GatewayConfig, StoreBackend};
use crate::credential::Credential;
use crate::error::{CoreError, CoreResult};
use crate::memory::MemorySecretStore;
use crate::remote::RemoteSecretStore;

/// Build the store client selected by `config.backend`.
///
/// # Errors
///
/// Returns [`CoreError::CredentialRequired`] when the remote backend is
/// selected without a credential, or [`CoreError::Client`] when the HTTP
/// client cannot be created.
pub fn build_store(
    config: &GatewayConfig,
    credential: Option<Credential>,
) -> CoreResult<Arc<dyn SecretStore>> {
    match config.backend {
        StoreBackend::Remote => {
            let credential = credential.ok_or(CoreError::CredentialRequired)?;
            let store = RemoteSecretStore::new(
                &config.store_endpoint,
                credential,
                Duration::from_secs(config.store_timeout_secs),
            )?
            .with_max_secret_size(config.max_secret_size);
            tracing::debug!(endpoint = %config.store_endpoint, "using remote secret store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory secret store, secrets are lost on exit");
            Ok(Arc::new(MemorySecretStore::with_max_secret_size(
                config.max_secret_size,
            )))
        }
    }
}
