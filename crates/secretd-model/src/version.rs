//! Secret versions.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum size of a secret payload accepted by the store (512 KiB).
pub const MAX_SECRET_SIZE: usize = 512 * 1024;

/// An immutable snapshot of a secret's content.
///
/// Writes always create a new version; existing versions are never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretVersion {
    /// Version number, starting at 1. Zero when the store did not report one.
    pub version: u64,
    /// Raw secret bytes.
    pub data: Bytes,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}

impl SecretVersion {
    /// Metadata describing this version, without its data.
    #[must_use]
    pub fn meta(&self) -> VersionMeta {
        VersionMeta {
            version: self.version,
            created_at: self.created_at,
        }
    }
}

/// Metadata returned by a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMeta {
    /// Version number of the new version.
    pub version: u64,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
}
