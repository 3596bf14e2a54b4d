//! Process-local secret store.
//!
//! Keeps every version of every secret in a [`DashMap`] keyed by the secret
//! path without its version suffix. Versions are numbered from 1 and never
//! modified once written. Nothing is persisted.

use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;

use secretd_http::{SecretStore, StoreFuture};
use secretd_model::{
    MAX_SECRET_SIZE, SecretPath, SecretVersion, StoreError, VersionMeta, VersionRef,
};

use crate::guard::check_write;

/// Thread-safe in-memory secret store.
///
/// # Examples
///
/// ```
/// use secretd_core::memory::MemorySecretStore;
///
/// let store = MemorySecretStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug)]
pub struct MemorySecretStore {
    secrets: DashMap<String, Vec<SecretVersion>>,
    max_secret_size: usize,
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySecretStore {
    /// Create an empty store with the default size limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_secret_size(MAX_SECRET_SIZE)
    }

    /// Create an empty store accepting secrets up to `max_secret_size` bytes.
    #[must_use]
    pub fn with_max_secret_size(max_secret_size: usize) -> Self {
        Self {
            secrets: DashMap::new(),
            max_secret_size,
        }
    }

    /// Number of secrets held, regardless of how many versions each has.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Whether the store holds no secrets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Read the version of `path` named by its suffix, or the latest one.
    pub fn get(&self, path: &SecretPath) -> Result<SecretVersion, StoreError> {
        let versions = self
            .secrets
            .get(path.without_version())
            .ok_or_else(|| StoreError::not_found(format!("secret not found: {path}")))?;

        let found = match path.version() {
            None | Some(VersionRef::Latest) => versions.last(),
            Some(VersionRef::Number(n)) => usize::try_from(n)
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| versions.get(idx)),
        };

        found
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("secret version not found: {path}")))
    }

    /// Append `data` as a new version of `path`.
    pub fn put(&self, path: &SecretPath, data: Bytes) -> Result<VersionMeta, StoreError> {
        check_write(path, &data, self.max_secret_size)?;

        let mut versions = self
            .secrets
            .entry(path.without_version().to_owned())
            .or_default();
        let secret = SecretVersion {
            version: versions.len() as u64 + 1,
            data,
            created_at: Utc::now(),
        };
        let meta = secret.meta();
        versions.push(secret);

        tracing::debug!(%path, version = meta.version, "stored secret version");
        Ok(meta)
    }
}

impl SecretStore for MemorySecretStore {
    fn read_latest<'a>(&'a self, path: &'a SecretPath) -> StoreFuture<'a, SecretVersion> {
        Box::pin(async move { self.get(path) })
    }

    fn write_new_version<'a>(
        &'a self,
        path: &'a SecretPath,
        data: Bytes,
    ) -> StoreFuture<'a, VersionMeta> {
        Box::pin(async move { self.put(path, data) })
    }
}
