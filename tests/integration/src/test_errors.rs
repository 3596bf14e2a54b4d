//! Error mapping integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, secret_url, server_url, test_secret_path};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_invalid_path() {
        let resp = client().get(secret_url("alice/app")).send().await.unwrap();
        assert_eq!(resp.status(), 400);
        assert!(!resp.text().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_not_found_for_missing_secret() {
        let path = test_secret_path("missing");
        let resp = client().get(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsupported_method() {
        let path = test_secret_path("key");
        let resp = client().delete(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers().get("allow").unwrap(), "GET, POST");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_write_to_version() {
        let path = test_secret_path("key");
        let resp = client()
            .post(secret_url(&format!("{path}:1")))
            .body("value")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_empty_secret() {
        let path = test_secret_path("key");
        let resp = client().post(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(resp.text().await.unwrap(), "secret is empty");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_not_found_outside_prefix() {
        let resp = client().get(server_url("/v2/other")).send().await.unwrap();
        assert_eq!(resp.status(), 404);
    }
}
