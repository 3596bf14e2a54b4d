//! Integration tests for the secretd server.
//!
//! These tests require a running secretd server backed by the in-memory store:
//!
//! ```text
//! SECRETD_BACKEND=memory secretd --port 8080
//! ```
//!
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p secretd-integration -- --ignored
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("SECRETD_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned())
}

/// Create an HTTP client for the local server.
#[must_use]
pub fn client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// URL of the secret at `path` on the local server.
#[must_use]
pub fn secret_url(path: &str) -> String {
    format!("{}/v1/secrets/{path}", endpoint_url())
}

/// URL of an arbitrary server path.
#[must_use]
pub fn server_url(path: &str) -> String {
    format!("{}{path}", endpoint_url())
}

/// Generate a unique secret path for a test.
#[must_use]
pub fn test_secret_path(name: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("it-{id}/repo/{name}")
}

mod test_errors;
mod test_secrets;
