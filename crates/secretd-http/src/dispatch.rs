//! Secret store boundary and request dispatch.
//!
//! [`SecretStore`] is the boundary between the HTTP layer and whatever talks
//! to the actual secret store. [`SecretDispatcher`] validates the path, picks
//! the operation from the method, calls the store, and renders exactly one
//! response.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use tracing::{debug, warn};

use secretd_model::{SecretPath, SecretVersion, StoreError, VersionMeta};

use crate::classify::classify;
use crate::response::{
    SecretResponse, created_response, error_to_response, method_not_allowed_response,
    secret_response, text_response,
};

/// Boxed future returned by [`SecretStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// An authenticated client for the secret store.
///
/// Implementations are shared by every in-flight request and must support
/// concurrent calls without external synchronization. Neither operation is
/// retried or timed out by the caller.
pub trait SecretStore: Send + Sync + 'static {
    /// Read the latest version of the secret at `path`.
    fn read_latest<'a>(&'a self, path: &'a SecretPath) -> StoreFuture<'a, SecretVersion>;

    /// Write `data` as a new version of the secret at `path`.
    fn write_new_version<'a>(
        &'a self,
        path: &'a SecretPath,
        data: Bytes,
    ) -> StoreFuture<'a, VersionMeta>;
}

/// Turns a method, a secret path and a request body into a response.
#[derive(Clone)]
pub struct SecretDispatcher {
    store: Arc<dyn SecretStore>,
}

impl fmt::Debug for SecretDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDispatcher")
            .field("store", &"...")
            .finish()
    }
}

impl SecretDispatcher {
    /// Create a dispatcher around a store client.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Handle one request against the secret at `path`.
    ///
    /// The body is only read for `POST`.
    pub async fn handle<B>(
        &self,
        method: &http::Method,
        path: &str,
        body: B,
    ) -> SecretResponse
    where
        B: http_body::Body<Data = Bytes> + Send,
        B::Error: fmt::Display + Send,
    {
        let secret_path = match SecretPath::parse(path) {
            Ok(p) => p,
            Err(err) => {
                debug!(path, error = %err, "rejected secret path");
                return text_response(http::StatusCode::BAD_REQUEST, err.reason());
            }
        };

        match *method {
            http::Method::GET => self.read(&secret_path).await,
            http::Method::POST => {
                let data = match body.collect().await {
                    Ok(collected) => collected.to_bytes(),
                    Err(err) => {
                        warn!(path = %secret_path, error = %err, "failed to read request body");
                        return text_response(
                            http::StatusCode::INTERNAL_SERVER_ERROR,
                            err.to_string(),
                        );
                    }
                };
                self.write(&secret_path, data).await
            }
            _ => method_not_allowed_response(),
        }
    }

    async fn read(&self, path: &SecretPath) -> SecretResponse {
        debug!(%path, "reading latest secret version");
        match self.store.read_latest(path).await {
            Ok(secret) => {
                debug!(%path, version = secret.version, size = secret.data.len(), "read secret");
                secret_response(secret.data)
            }
            Err(err) => store_error_response(path, &err),
        }
    }

    async fn write(&self, path: &SecretPath, data: Bytes) -> SecretResponse {
        debug!(%path, size = data.len(), "writing new secret version");
        match self.store.write_new_version(path, data).await {
            Ok(meta) => {
                debug!(%path, version = meta.version, "wrote secret version");
                created_response()
            }
            Err(err) => store_error_response(path, &err),
        }
    }
}

fn store_error_response(path: &SecretPath, err: &StoreError) -> SecretResponse {
    let classified = classify(err);
    if classified.status.is_server_error() {
        warn!(%path, status = classified.status.as_u16(), error = %err, "secret store error");
    } else {
        debug!(%path, status = classified.status.as_u16(), error = %err, "secret store rejected request");
    }
    error_to_response(classified)
}
