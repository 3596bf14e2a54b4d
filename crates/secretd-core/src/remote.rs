//! Secret store client over HTTP.
//!
//! Talks to the remote store's versioned secrets resource:
//!
//! ```text
//! GET  <endpoint>/v1/secrets/<path>   -> 200, body = secret bytes
//! POST <endpoint>/v1/secrets/<path>   -> 2xx, optional JSON `VersionMeta`
//! ```
//!
//! Requests carry `Authorization: Bearer <credential>` and, when configured,
//! the credential passphrase in `x-credential-passphrase`. Any non-2xx reply
//! becomes a [`StoreError::PublicStatus`] with the store's status and message;
//! transport failures become [`StoreError::Opaque`].

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use secretd_http::{SecretStore, StoreFuture};
use secretd_model::{MAX_SECRET_SIZE, SecretPath, SecretVersion, StoreError, VersionMeta};

use crate::credential::Credential;
use crate::error::CoreResult;
use crate::guard::check_write;

/// Header carrying the version number of a read or written secret.
pub const VERSION_HEADER: &str = "x-secret-version";

/// Header carrying the credential passphrase.
pub const PASSPHRASE_HEADER: &str = "x-credential-passphrase";

/// Path prefix of the secrets resource on the remote store.
const REMOTE_PREFIX: &str = "/v1/secrets";

/// Characters escaped inside a single URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// HTTP client for the remote secret store.
///
/// `reqwest::Client` pools connections internally and is safe to share, so a
/// single instance serves every request.
#[derive(Debug, Clone)]
pub struct RemoteSecretStore {
    client: reqwest::Client,
    endpoint: String,
    credential: Credential,
    max_secret_size: usize,
}

impl RemoteSecretStore {
    /// Create a client for the store at `endpoint`.
    pub fn new(endpoint: &str, credential: Credential, timeout: Duration) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("secretd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            credential,
            max_secret_size: MAX_SECRET_SIZE,
        })
    }

    /// Override the largest payload accepted before a write is sent.
    #[must_use]
    pub fn with_max_secret_size(mut self, max_secret_size: usize) -> Self {
        self.max_secret_size = max_secret_size;
        self
    }

    /// URL of `path` on the remote store.
    ///
    /// Each segment is escaped on its own, so a segment can never add path
    /// levels, a query or a fragment to the URL.
    #[must_use]
    pub fn secret_url(&self, path: &SecretPath) -> String {
        let mut url = format!("{}{REMOTE_PREFIX}", self.endpoint);
        for segment in path.as_str().split('/') {
            url.push('/');
            url.extend(utf8_percent_encode(segment, SEGMENT));
        }
        url
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.bearer_auth(self.credential.token());
        match self.credential.passphrase() {
            Some(passphrase) => request.header(PASSPHRASE_HEADER, passphrase),
            None => request,
        }
    }

    async fn read(&self, path: &SecretPath) -> Result<SecretVersion, StoreError> {
        let url = self.secret_url(path);
        tracing::debug!(%url, "reading secret from remote store");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(StoreError::from_source)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let version = version_header(&response).unwrap_or_default();
        let data = response.bytes().await.map_err(StoreError::from_source)?;

        Ok(SecretVersion {
            version,
            data,
            created_at: Utc::now(),
        })
    }

    async fn write(&self, path: &SecretPath, data: Bytes) -> Result<VersionMeta, StoreError> {
        check_write(path, &data, self.max_secret_size)?;

        let url = self.secret_url(path);
        tracing::debug!(%url, size = data.len(), "writing secret to remote store");

        let response = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(StoreError::from_source)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let version = version_header(&response).unwrap_or_default();
        let body = response.bytes().await.map_err(StoreError::from_source)?;

        Ok(
            serde_json::from_slice::<VersionMeta>(&body).unwrap_or_else(|_| VersionMeta {
                version,
                created_at: Utc::now(),
            }),
        )
    }
}

impl SecretStore for RemoteSecretStore {
    fn read_latest<'a>(&'a self, path: &'a SecretPath) -> StoreFuture<'a, SecretVersion> {
        Box::pin(self.read(path))
    }

    fn write_new_version<'a>(
        &'a self,
        path: &'a SecretPath,
        data: Bytes,
    ) -> StoreFuture<'a, VersionMeta> {
        Box::pin(self.write(path, data))
    }
}

fn version_header(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(VERSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Turn a non-success reply into a public status error.
///
/// The store's body is its message; an empty body falls back to the
/// status reason phrase.
async fn error_from_response(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(%status, error = %e, "failed to read error body from secret store");
            String::new()
        }
    };
    let message = match text.trim() {
        "" => status
            .canonical_reason()
            .unwrap_or("unexpected response from secret store")
            .to_owned(),
        msg => msg.to_owned(),
    };
    StoreError::public(status, message)
}
