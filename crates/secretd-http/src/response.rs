//! Response construction.
//!
//! Bodies are never wrapped in an envelope: a read returns the secret bytes,
//! a write returns nothing, and every failure returns its message as plain text.

use bytes::Bytes;
use http_body_util::Full;

use crate::classify::ClassifiedError;

/// Every response the gateway produces is fully buffered.
pub type SecretResponse = http::Response<Full<Bytes>>;

/// Content type for error and informational messages.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type for secret payloads.
pub const SECRET_CONTENT_TYPE: &str = "application/octet-stream";

/// Value of the `Allow` header on `405` responses.
pub const ALLOWED_METHODS: &str = "GET, POST";

/// A `200 OK` carrying the raw secret bytes.
#[must_use]
pub fn secret_response(data: Bytes) -> SecretResponse {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, SECRET_CONTENT_TYPE)
        .body(Full::new(data))
        .expect("valid secret response")
}

/// A `201 Created` with an empty body.
#[must_use]
pub fn created_response() -> SecretResponse {
    http::Response::builder()
        .status(http::StatusCode::CREATED)
        .body(Full::default())
        .expect("valid created response")
}

/// A `405 Method Not Allowed` advertising the supported methods.
#[must_use]
pub fn method_not_allowed_response() -> SecretResponse {
    http::Response::builder()
        .status(http::StatusCode::METHOD_NOT_ALLOWED)
        .header(http::header::ALLOW, ALLOWED_METHODS)
        .body(Full::default())
        .expect("valid method not allowed response")
}

/// A plain-text response with the given status.
#[must_use]
pub fn text_response(
    status: http::StatusCode,
    message: impl Into<String>,
) -> SecretResponse {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, TEXT_CONTENT_TYPE)
        .body(Full::new(Bytes::from(message.into())))
        .expect("valid text response")
}

/// Render a classified store error.
#[must_use]
pub fn error_to_response(error: ClassifiedError) -> SecretResponse {
    text_response(error.status, error.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_build_method_not_allowed_with_allow_header() {
        let resp = method_not_allowed_response();
        assert_eq!(resp.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get(http::header::ALLOW).unwrap(), "GET, POST");
    }

    #[test]
    fn test_should_build_error_response_from_classified_error() {
        let resp = error_to_response(ClassifiedError {
            status: http::StatusCode::NOT_FOUND,
            message: "secret not found".to_owned(),
        });
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            TEXT_CONTENT_TYPE,
        );
    }

    #[test]
    fn test_should_build_created_response_without_content_type() {
        use http_body::Body;

        let resp = created_response();
        assert_eq!(resp.status(), http::StatusCode::CREATED);
        assert!(resp.headers().get(http::header::CONTENT_TYPE).is_none());
        assert_eq!(resp.body().size_hint().exact(), Some(0));
    }

    #[test]
    fn test_should_size_secret_body_exactly() {
        use http_body::Body;

        let resp = secret_response(Bytes::from_static(b"s3cr3t"));
        assert_eq!(resp.body().size_hint().exact(), Some(6));
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            SECRET_CONTENT_TYPE,
        );
    }
}
