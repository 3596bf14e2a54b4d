//! Client-side write checks.
//!
//! Every store client runs these before a write leaves the process, and
//! reports failures with the write-validation sentinels.

use secretd_model::{SecretPath, StoreError};

/// Check that `data` may be written to `path`.
///
/// # Errors
///
/// - [`StoreError::CannotWriteToVersion`] if `path` has a version suffix
/// - [`StoreError::EmptySecret`] if `data` is empty
/// - [`StoreError::SecretTooBig`] if `data` is larger than `max_size`
pub fn check_write(path: &SecretPath, data: &[u8], max_size: usize) -> Result<(), StoreError> {
    if path.has_version() {
        return Err(StoreError::CannotWriteToVersion);
    }
    if data.is_empty() {
        return Err(StoreError::EmptySecret);
    }
    if data.len() > max_size {
        return Err(StoreError::SecretTooBig {
            size: data.len(),
            max: max_size,
        });
    }
    Ok(())
}
