//! Request routing.
//!
//! The API has a single resource:
//!
//! ```text
//! /v1/secrets/<namespace>/<repo>/.../<secret>[:version]
//! ```
//!
//! The router only strips the prefix and percent-decodes the tail. Deciding
//! whether the tail is a valid secret path is left to the dispatcher.

use percent_encoding::percent_decode_str;

/// Default prefix under which secrets are served.
pub const SECRETS_PREFIX: &str = "/v1/secrets/";

/// Health probe paths.
const HEALTH_PATHS: [&str; 2] = ["/health", "/_health"];

/// Where a request should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Health probe.
    Health,
    /// The secrets resource, carrying the decoded path after the prefix.
    Secret(String),
}

/// Why a request could not be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route matches the request path.
    NotFound,
    /// The path after the prefix is not valid percent-encoded UTF-8.
    InvalidEncoding(String),
}

impl RouteError {
    /// The status for this routing failure.
    #[must_use]
    pub fn status(&self) -> http::StatusCode {
        match self {
            Self::NotFound => http::StatusCode::NOT_FOUND,
            Self::InvalidEncoding(_) => http::StatusCode::BAD_REQUEST,
        }
    }

    /// The plain-text message for this routing failure.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::NotFound => "404 page not found".to_owned(),
            Self::InvalidEncoding(tail) => {
                format!("secret path is not valid UTF-8 after decoding: {tail}")
            }
        }
    }
}

/// Router binding the secrets prefix to the dispatcher.
#[derive(Debug, Clone)]
pub struct SecretRouter {
    prefix: String,
    health_check: bool,
}

impl Default for SecretRouter {
    fn default() -> Self {
        Self::new(SECRETS_PREFIX, true)
    }
}

impl SecretRouter {
    /// Create a router for `prefix`. A trailing `/` is added if missing.
    #[must_use]
    pub fn new(prefix: &str, health_check: bool) -> Self {
        let prefix = if prefix.ends_with('/') {
            prefix.to_owned()
        } else {
            format!("{prefix}/")
        };
        Self {
            prefix,
            health_check,
        }
    }

    /// The prefix this router strips, always ending in `/`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve a request into a [`Route`].
    pub fn resolve(&self, method: &http::Method, path: &str) -> Result<Route, RouteError> {
        if self.health_check && *method == http::Method::GET && HEALTH_PATHS.contains(&path) {
            return Ok(Route::Health);
        }

        let tail = path.strip_prefix(&self.prefix).ok_or(RouteError::NotFound)?;

        percent_decode_str(tail)
            .decode_utf8()
            .map(|decoded| Route::Secret(decoded.into_owned()))
            .map_err(|_| RouteError::InvalidEncoding(tail.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_strip_prefix() {
        let router = SecretRouter::default();
        let route = router
            .resolve(&http::Method::GET, "/v1/secrets/alice/app/db-password")
            .unwrap();
        assert_eq!(route, Route::Secret("alice/app/db-password".to_owned()));
    }

    #[test]
    fn test_should_yield_empty_tail_for_bare_prefix() {
        let router = SecretRouter::default();
        let route = router.resolve(&http::Method::GET, "/v1/secrets/").unwrap();
        assert_eq!(route, Route::Secret(String::new()));
    }

    #[test]
    fn test_should_percent_decode_tail() {
        let router = SecretRouter::default();
        let route = router
            .resolve(&http::Method::POST, "/v1/secrets/alice/app/db%2Dpassword%3A2")
            .unwrap();
        assert_eq!(route, Route::Secret("alice/app/db-password:2".to_owned()));
    }

    #[test]
    fn test_should_reject_invalid_utf8() {
        let router = SecretRouter::default();
        let err = router
            .resolve(&http::Method::GET, "/v1/secrets/alice/app/%FF")
            .unwrap_err();
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_not_match_outside_prefix() {
        let router = SecretRouter::default();
        for path in ["/", "/v1/secrets", "/v2/secrets/a/b/c", "/v1/other/a/b/c"] {
            let err = router.resolve(&http::Method::GET, path).unwrap_err();
            assert_eq!(err, RouteError::NotFound, "path: {path}");
            assert_eq!(err.message(), "404 page not found");
        }
    }

    #[test]
    fn test_should_route_health_probes() {
        let router = SecretRouter::default();
        assert_eq!(
            router.resolve(&http::Method::GET, "/health").unwrap(),
            Route::Health
        );
        assert_eq!(
            router.resolve(&http::Method::GET, "/_health").unwrap(),
            Route::Health
        );
        assert!(router.resolve(&http::Method::POST, "/health").is_err());

        let router = SecretRouter::new("/v1/secrets", false);
        assert!(router.resolve(&http::Method::GET, "/health").is_err());
    }

    #[test]
    fn test_should_normalize_custom_prefix() {
        let router = SecretRouter::new("/api/secrets", true);
        assert_eq!(router.prefix(), "/api/secrets/");
        let route = router
            .resolve(&http::Method::GET, "/api/secrets/alice/app/key")
            .unwrap();
        assert_eq!(route, Route::Secret("alice/app/key".to_owned()));
    }
}
