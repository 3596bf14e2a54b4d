//! Read and write integration tests.

#[cfg(test)]
mod tests {
    use crate::{client, secret_url, server_url, test_secret_path};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_write_then_read_secret() {
        let client = client();
        let path = test_secret_path("db-password");

        let resp = client
            .post(secret_url(&path))
            .body("s3cr3t")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        assert!(resp.bytes().await.unwrap().is_empty());

        let resp = client.get(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/octet-stream"
        );
        assert_eq!(&resp.bytes().await.unwrap()[..], b"s3cr3t");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_preserve_binary_payload() {
        let client = client();
        let path = test_secret_path("blob");
        let payload: Vec<u8> = (0..=255u8).collect();

        let resp = client
            .post(secret_url(&path))
            .body(payload.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let resp = client.get(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.bytes().await.unwrap().to_vec(), payload);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_explicit_version() {
        let client = client();
        let path = test_secret_path("rotated");

        for value in ["one", "two"] {
            let resp = client
                .post(secret_url(&path))
                .body(value)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 201);
        }

        let resp = client
            .get(secret_url(&format!("{path}:1")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.text().await.unwrap(), "one");

        let resp = client.get(secret_url(&path)).send().await.unwrap();
        assert_eq!(resp.text().await.unwrap(), "two");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_answer_health_probe() {
        let resp = client().get(server_url("/health")).send().await.unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers().contains_key("x-request-id"));

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "running");
    }
}
