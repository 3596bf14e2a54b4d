//! Hyper `Service` for the secrets API.
//!
//! [`SecretsHttpService`] ties routing, dispatch and common headers together:
//!
//! 1. Health probe interception (`GET /health`, `GET /_health`)
//! 2. Prefix routing via [`SecretRouter`]
//! 3. Dispatch to the [`SecretDispatcher`]
//! 4. Common response headers (`x-request-id`, `server`)

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::service::Service;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dispatch::{SecretDispatcher, SecretStore};
use crate::response::{SecretResponse, text_response};
use crate::router::{Route, SECRETS_PREFIX, SecretRouter};

/// Value of the `server` response header.
const SERVER_NAME: &str = "secretd";

/// Version reported by the health probe.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for the secrets HTTP service.
#[derive(Debug, Clone)]
pub struct SecretsHttpConfig {
    /// Prefix under which secrets are served.
    pub prefix: String,
    /// Whether to answer health probes.
    pub health_check: bool,
}

impl Default for SecretsHttpConfig {
    fn default() -> Self {
        Self {
            prefix: SECRETS_PREFIX.to_owned(),
            health_check: true,
        }
    }
}

/// Hyper `Service` serving the secrets API.
///
/// Cloning is cheap; every connection gets its own clone sharing the same
/// dispatcher and store client.
#[derive(Debug, Clone)]
pub struct SecretsHttpService {
    dispatcher: Arc<SecretDispatcher>,
    router: SecretRouter,
}

impl SecretsHttpService {
    /// Create a service around a store client.
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>, config: &SecretsHttpConfig) -> Self {
        Self {
            dispatcher: Arc::new(SecretDispatcher::new(store)),
            router: SecretRouter::new(&config.prefix, config.health_check),
        }
    }

    /// Process one request to completion.
    pub async fn process<B>(&self, req: http::Request<B>) -> SecretResponse
    where
        B: http_body::Body<Data = Bytes> + Send,
        B::Error: fmt::Display + Send,
    {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let method = parts.method;
        let uri_path = parts.uri.path().to_owned();

        debug!(%method, path = %uri_path, request_id, "processing request");

        let response = match self.router.resolve(&method, &uri_path) {
            Ok(Route::Health) => health_check_response(),
            Ok(Route::Secret(path)) => self.dispatcher.handle(&method, &path, body).await,
            Err(err) => text_response(err.status(), err.message()),
        };

        info!(
            %method,
            path = %uri_path,
            status = response.status().as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            request_id,
            "handled request"
        );

        add_common_headers(response, &request_id)
    }
}

impl<B> Service<http::Request<B>> for SecretsHttpService
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: fmt::Display + Send,
{
    type Response = SecretResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.process(req).await) })
    }
}

/// Produce the health probe response.
fn health_check_response() -> SecretResponse {
    let body = serde_json::json!({
        "status": "running",
        "service": SERVER_NAME,
        "version": VERSION,
    });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("static health response should be valid")
}

/// Add headers common to every response.
fn add_common_headers(mut response: SecretResponse, request_id: &str) -> SecretResponse {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }

    headers.insert(
        http::header::SERVER,
        http::HeaderValue::from_static(SERVER_NAME),
    );

    response
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use http_body_util::{BodyExt, Empty, Full};
    use secretd_model::{SecretPath, SecretVersion, StoreError, VersionMeta};

    use super::*;
    use crate::dispatch::StoreFuture;

    /// Store double answering every read with the path itself.
    struct EchoStore;

    impl SecretStore for EchoStore {
        fn read_latest<'a>(&'a self, path: &'a SecretPath) -> StoreFuture<'a, SecretVersion> {
            Box::pin(async move {
                if path.secret_name() == "missing" {
                    return Err(StoreError::not_found("secret not found"));
                }
                Ok(SecretVersion {
                    version: 1,
                    data: Bytes::from(path.to_string()),
                    created_at: Utc::now(),
                })
            })
        }

        fn write_new_version<'a>(
            &'a self,
            _path: &'a SecretPath,
            data: Bytes,
        ) -> StoreFuture<'a, VersionMeta> {
            Box::pin(async move {
                if data.is_empty() {
                    return Err(StoreError::EmptySecret);
                }
                Ok(VersionMeta {
                    version: 1,
                    created_at: Utc::now(),
                })
            })
        }
    }

    fn service() -> SecretsHttpService {
        SecretsHttpService::new(Arc::new(EchoStore), &SecretsHttpConfig::default())
    }

    fn request(method: http::Method, uri: &str, body: &'static [u8]) -> http::Request<Full<Bytes>> {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    async fn body_string(resp: SecretResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_should_serve_secret_through_prefix() {
        let resp = service()
            .call(request(
                http::Method::GET,
                "/v1/secrets/alice/app/db-password",
                b"",
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), http::StatusCode::OK);
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(resp.headers().get(http::header::SERVER).unwrap(), "secretd");
        assert_eq!(body_string(resp).await, "alice/app/db-password");
    }

    #[tokio::test]
    async fn test_should_reject_bare_prefix_with_validator_reason() {
        let resp = service()
            .call(request(http::Method::GET, "/v1/secrets/", b""))
            .await
            .unwrap();

        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "secret path is empty");
    }

    #[tokio::test]
    async fn test_should_reject_encoded_dot_segments() {
        for uri in [
            "/v1/secrets/alice/%2E%2E/%2E%2E/v2/admin",
            "/v1/secrets/alice/app/%2e%2e",
        ] {
            let resp = service()
                .call(request(http::Method::GET, uri, b""))
                .await
                .unwrap();
            assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST, "{uri}");
            assert!(body_string(resp).await.contains("only of dots"));
        }
    }

    #[tokio::test]
    async fn test_should_map_store_statuses() {
        let resp = service()
            .call(request(http::Method::GET, "/v1/secrets/alice/app/missing", b""))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "secret not found");

        let resp = service()
            .call(request(
                http::Method::POST,
                "/v1/secrets/alice/app/db-password",
                b"",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_should_create_secret_on_post() {
        let resp = service()
            .call(request(
                http::Method::POST,
                "/v1/secrets/alice/app/db-password",
                b"s3cr3t",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::CREATED);
        assert_eq!(body_string(resp).await, "");
    }

    #[tokio::test]
    async fn test_should_return_method_not_allowed_for_put() {
        let resp = service()
            .call(request(
                http::Method::PUT,
                "/v1/secrets/alice/app/db-password",
                b"s3cr3t",
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get(http::header::ALLOW).unwrap(), "GET, POST");
    }

    #[tokio::test]
    async fn test_should_return_not_found_outside_prefix() {
        let req = http::Request::builder()
            .uri("/v1/other")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let resp = service().call(req).await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(body_string(resp).await, "404 page not found");
    }

    #[tokio::test]
    async fn test_should_answer_health_probe() {
        let resp = service()
            .call(request(http::Method::GET, "/health", b""))
            .await
            .unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["status"], "running");
        assert_eq!(body["service"], "secretd");
    }
}
