//! # Gateway End-to-End
//!
//! Real listener on an ephemeral loopback port, real HTTP client. Requests
//! arrive from 127.0.0.1, which is not a trusted proxy by default, so every
//! request is keyed by the loopback address.

#[cfg(test)]
mod tests {
    use axum::{routing::get, Router};
    use reqwest::StatusCode;
    use warden_gateway::{GatewayConfig, GatewayHandle, GatewayService};

    async fn start() -> (GatewayHandle, String) {
        let mut config = GatewayConfig::default();
        config.http.host = "127.0.0.1".parse().unwrap();
        config.http.port = 0;

        let api = Router::new()
            .route("/photos", get(|| async { "[]" }))
            .route("/auth", get(|| async { "{\"valid\": false}" }));

        let handle = GatewayService::new(config)
            .unwrap()
            .spawn(api)
            .await
            .unwrap();
        let base = format!("http://{}", handle.local_addr());
        (handle, base)
    }

    #[tokio::test]
    async fn test_burst_of_requests_is_rate_limited() {
        let (handle, base) = start().await;
        let client = reqwest::Client::new();

        let mut statuses = Vec::new();
        for _ in 0..20 {
            let response = client
                .get(format!("{base}/api/v1/photos"))
                .send()
                .await
                .unwrap();
            statuses.push(response.status());
        }

        assert_eq!(statuses[0], StatusCode::OK);
        assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
        assert!(statuses
            .iter()
            .all(|s| *s == StatusCode::OK || *s == StatusCode::TOO_MANY_REQUESTS));

        let stats: serde_json::Value = client
            .get(format!("{base}/stats"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(stats["tracked_clients"], 1);
        assert_eq!(stats["allowed"].as_u64().unwrap() + stats["rate_limited"].as_u64().unwrap(), 20);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_hammering_gets_banned() {
        let (handle, base) = start().await;
        let client = reqwest::Client::new();

        let mut last = StatusCode::OK;
        for _ in 0..49 {
            last = client
                .get(format!("{base}/api/v1/auth"))
                .send()
                .await
                .unwrap()
                .status();
        }
        assert_eq!(last, StatusCode::FORBIDDEN);

        let response = client
            .get(format!("{base}/api/v1/photos"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.text().await.unwrap(), "Temporarily Banned");

        let health = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_resource_is_bad_request() {
        let (handle, base) = start().await;

        let response = reqwest::get(format!("{base}/api/v1/videos")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        handle.shutdown().await.unwrap();
    }
}
