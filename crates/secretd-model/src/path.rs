//! Secret path grammar.
//!
//! A secret path names a secret inside a repository:
//!
//! ```text
//! namespace/repo[/dir...]/secret[:version]
//! ```
//!
//! The grammar mirrors the one the store enforces, so a path accepted here is
//! always syntactically acceptable to the store. Rules:
//!
//! - at least 3 segments, no empty segments, no leading or trailing `/`
//! - namespace: 2-32 characters of `[A-Za-z0-9_-]`
//! - repository and directories: 2-32 characters of `[A-Za-z0-9_.-]`
//! - secret name: 1-128 characters of `[A-Za-z0-9_.-]`
//! - no segment made only of dots (`.`, `..`)
//! - optional version suffix: `:latest` or `:<n>` with `n >= 1`

use std::fmt;

/// Minimum number of `/`-separated segments in a secret path.
const MIN_SEGMENTS: usize = 3;

/// Minimum namespace, repository and directory name length.
const MIN_NAME_LEN: usize = 2;

/// Maximum namespace, repository and directory name length.
const MAX_NAME_LEN: usize = 32;

/// Maximum secret name length.
const MAX_SECRET_NAME_LEN: usize = 128;

/// Separator between a secret name and its version.
const VERSION_SEPARATOR: char = ':';

/// The version suffix that resolves to the newest version.
const LATEST: &str = "latest";

/// Rejection produced by the path validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path does not match the secret path grammar.
    #[error("{reason}")]
    Rejected {
        /// The path as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },
}

impl PathError {
    fn rejected(path: &str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            path: path.to_owned(),
            reason: reason.into(),
        }
    }

    /// The human-readable rejection reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected { reason, .. } => reason,
        }
    }
}

/// An explicit version suffix on a secret path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionRef {
    /// `:latest`.
    Latest,
    /// `:<n>`.
    Number(u64),
}

impl fmt::Display for VersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A syntactically valid secret path.
///
/// Store operations take `&SecretPath`, so a string that failed validation can
/// never reach a store call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath {
    raw: String,
    /// Byte length of `raw` without the version suffix.
    base_len: usize,
    version: Option<VersionRef>,
}

impl SecretPath {
    /// Parse and validate a secret path.
    ///
    /// # Examples
    ///
    /// ```
    /// use secretd_model::path::SecretPath;
    ///
    /// let path = SecretPath::parse("alice/app/db-password").unwrap();
    /// assert_eq!(path.namespace(), "alice");
    /// assert!(!path.has_version());
    ///
    /// assert!(SecretPath::parse("").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::rejected(raw, "secret path is empty"));
        }

        if raw.starts_with('/') || raw.ends_with('/') {
            return Err(PathError::rejected(
                raw,
                format!("secret path must not start or end with a slash: {raw}"),
            ));
        }

        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(PathError::rejected(
                raw,
                format!(
                    "secret path must have at least {MIN_SEGMENTS} segments \
                     (namespace/repo/secret): {raw}"
                ),
            ));
        }

        let (last, dirs) = segments
            .split_last()
            .ok_or_else(|| PathError::rejected(raw, "secret path is empty"))?;

        for (idx, segment) in dirs.iter().enumerate() {
            if segment.is_empty() {
                return Err(PathError::rejected(
                    raw,
                    format!("secret path contains an empty segment: {raw}"),
                ));
            }
            let (kind, allow_dot) = match idx {
                0 => ("namespace", false),
                1 => ("repository name", true),
                _ => ("directory name", true),
            };
            validate_name(raw, kind, segment, MIN_NAME_LEN, MAX_NAME_LEN, allow_dot)?;
        }

        let (name, version) = match last.split_once(VERSION_SEPARATOR) {
            Some((name, suffix)) => (name, Some(parse_version(raw, suffix)?)),
            None => (*last, None),
        };

        validate_name(raw, "secret name", name, 1, MAX_SECRET_NAME_LEN, true)?;

        let base_len = raw.len() - (last.len() - name.len());

        Ok(Self {
            raw: raw.to_owned(),
            base_len,
            version,
        })
    }

    /// The full path as supplied, including any version suffix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The path without its version suffix.
    #[must_use]
    pub fn without_version(&self) -> &str {
        &self.raw[..self.base_len]
    }

    /// The explicit version suffix, if any.
    #[must_use]
    pub fn version(&self) -> Option<VersionRef> {
        self.version
    }

    /// Whether the path carries an explicit version suffix.
    #[must_use]
    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// The first segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.raw.split('/').next().unwrap_or_default()
    }

    /// The second segment.
    #[must_use]
    pub fn repo(&self) -> &str {
        self.raw.split('/').nth(1).unwrap_or_default()
    }

    /// The secret name, without its version suffix.
    #[must_use]
    pub fn secret_name(&self) -> &str {
        let base = self.without_version();
        base.rsplit('/').next().unwrap_or(base)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl std::str::FromStr for SecretPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Validate a secret path without keeping the parsed result.
///
/// # Errors
///
/// Returns [`PathError::Rejected`] carrying the reason if the path does not
/// match the grammar.
pub fn validate_secret_path(raw: &str) -> Result<(), PathError> {
    SecretPath::parse(raw).map(|_| ())
}

fn validate_name(
    path: &str,
    kind: &str,
    name: &str,
    min: usize,
    max: usize,
    allow_dot: bool,
) -> Result<(), PathError> {
    let len = name.chars().count();
    if !(min..=max).contains(&len) {
        return Err(PathError::rejected(
            path,
            format!("{kind} must be between {min} and {max} characters long: {name:?}"),
        ));
    }

    let allowed =
        |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_dot && c == '.');
    if let Some(bad) = name.chars().find(|&c| !allowed(c)) {
        let charset = if allow_dot {
            "letters, numbers, '-', '_' and '.'"
        } else {
            "letters, numbers, '-' and '_'"
        };
        return Err(PathError::rejected(
            path,
            format!(
                "{kind} contains invalid character {bad:?}; only {charset} are allowed: {name:?}"
            ),
        ));
    }

    if name.chars().all(|c| c == '.') {
        return Err(PathError::rejected(
            path,
            format!("{kind} must not consist only of dots: {name:?}"),
        ));
    }

    Ok(())
}

fn parse_version(path: &str, suffix: &str) -> Result<VersionRef, PathError> {
    if suffix == LATEST {
        return Ok(VersionRef::Latest);
    }

    let invalid = || {
        PathError::rejected(
            path,
            format!("secret version must be '{LATEST}' or a positive number: {suffix:?}"),
        )
    };

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match suffix.parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(n) => Ok(VersionRef::Number(n)),
    }
}
