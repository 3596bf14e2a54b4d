//! Store error types.
//!
//! Every failure a secret store call can produce is one of four variants.
//! The HTTP layer classifies them by a single match instead of inspecting
//! error types at runtime:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `PublicStatus` | The store tagged the error with a caller-facing status |
//! | `CannotWriteToVersion` / `EmptySecret` / `SecretTooBig` | Known write-validation sentinels |
//! | `Opaque` | Anything else, including transport failures |

/// Error returned by a secret store operation.
///
/// The `Display` output of every variant is the message the caller receives.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An error the store explicitly classified with a public HTTP status.
    #[error("{message}")]
    PublicStatus {
        /// The status the store attached to the error.
        status: http::StatusCode,
        /// Caller-safe message.
        message: String,
    },

    /// A write targeted an explicit, immutable version.
    #[error("cannot write to a specific version of a secret; remove the version suffix from the path")]
    CannotWriteToVersion,

    /// A write submitted an empty payload.
    #[error("secret is empty")]
    EmptySecret,

    /// A write submitted a payload larger than the store accepts.
    #[error("secret is too big: {size} bytes exceeds the maximum of {max} bytes")]
    SecretTooBig {
        /// Size of the submitted payload in bytes.
        size: usize,
        /// Maximum payload size in bytes.
        max: usize,
    },

    /// Any other failure.
    #[error("{message}")]
    Opaque {
        /// Description of the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Create a [`StoreError::PublicStatus`].
    #[must_use]
    pub fn public(status: http::StatusCode, message: impl Into<String>) -> Self {
        Self::PublicStatus {
            status,
            message: message.into(),
        }
    }

    /// Secret or version not found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::public(http::StatusCode::NOT_FOUND, message)
    }

    /// Create an opaque error from a message.
    #[must_use]
    pub fn opaque(message: impl Into<String>) -> Self {
        Self::Opaque {
            message: message.into(),
            source: None,
        }
    }

    /// Create an opaque error wrapping a source error. The message is the
    /// source's `Display` output.
    #[must_use]
    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Opaque {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this is one of the write-validation sentinels.
    #[must_use]
    pub fn is_write_validation(&self) -> bool {
        matches!(
            self,
            Self::CannotWriteToVersion | Self::EmptySecret | Self::SecretTooBig { .. }
        )
    }

    /// The public status attached by the store, if any.
    #[must_use]
    pub fn public_status(&self) -> Option<http::StatusCode> {
        match self {
            Self::PublicStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
