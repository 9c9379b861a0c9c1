//! # Admission Flows
//!
//! End-to-end behavior of the registry, the sweeper and the gateway router
//! on a manual clock. Each test drives one client story from first request
//! to its outcome.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{body::Body, extract::ConnectInfo, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    use warden_admission::testing::ManualTimeSource;
    use warden_admission::{AdmissionConfig, AdmissionDecision, ClientRegistry, Sweeper};
    use warden_gateway::{GatewayConfig, GatewayService};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn registry_on(clock: &ManualTimeSource) -> Arc<ClientRegistry> {
        Arc::new(
            ClientRegistry::with_time_source(AdmissionConfig::default(), Arc::new(clock.clone()))
                .unwrap(),
        )
    }

    fn score(registry: &ClientRegistry, key: &str) -> u32 {
        registry.snapshot(key).unwrap().trust_score
    }

    fn api() -> Router {
        Router::new()
            .route("/photos", get(|| async { "photos" }))
            .route("/auth", get(|| async { "{\"valid\": false}" }))
    }

    fn request(path: &str, peer: &str) -> Request<Body> {
        let mut req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let addr: SocketAddr = peer.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    // =========================================================================
    // REGISTRY + SWEEPER
    // =========================================================================

    #[test]
    fn test_ordinary_client_burst_then_refill() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);

        for _ in 0..5 {
            assert_eq!(registry.visit("reader", false), AdmissionDecision::Allowed);
        }
        assert_eq!(registry.visit("reader", false), AdmissionDecision::RateLimited);

        clock.advance(Duration::from_millis(100));
        assert_eq!(registry.visit("reader", false), AdmissionDecision::Allowed);
        assert_eq!(registry.visit("reader", false), AdmissionDecision::RateLimited);

        assert_eq!(score(&registry, "reader"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_brute_force_banned_then_forgiven_by_sweeper() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);

        let mut decisions = Vec::new();
        for _ in 0..49 {
            decisions.push(registry.visit("attacker", true));
        }
        assert_eq!(decisions.last(), Some(&AdmissionDecision::Banned));
        assert_eq!(
            decisions.iter().filter(|d| **d == AdmissionDecision::Banned).count(),
            1
        );
        assert_eq!(score(&registry, "attacker"), 50);

        // Ordinary requests are refused as well and do not move the score
        assert_eq!(registry.visit("attacker", false), AdmissionDecision::Banned);
        assert_eq!(score(&registry, "attacker"), 50);

        let sweeper = Sweeper::spawn(Arc::clone(&registry), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(score(&registry, "attacker"), 45);
        // The limiter installed at score 50 starts full
        assert_eq!(registry.visit("attacker", false), AdmissionDecision::Allowed);

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_client_evicted_and_starts_fresh() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);

        for _ in 0..12 {
            registry.visit("returning", true);
        }
        assert_eq!(score(&registry, "returning"), 13);

        clock.advance(Duration::from_secs(5 * 60));
        let sweeper = Sweeper::spawn(Arc::clone(&registry), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(!registry.contains("returning"));
        assert_eq!(registry.stats().evictions, 1);

        assert_eq!(registry.visit("returning", false), AdmissionDecision::Allowed);
        assert_eq!(score(&registry, "returning"), 0);

        sweeper.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_key_never_exceeds_burst_under_contention() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    let mut allowed = 0usize;
                    for _ in 0..50 {
                        if registry.visit("10.0.0.1", false).is_allowed() {
                            allowed += 1;
                        }
                    }
                    allowed
                })
            })
            .collect();

        let mut allowed = 0;
        for task in tasks {
            allowed += task.await.unwrap();
        }

        // Frozen clock: exactly one burst worth of requests gets through
        assert_eq!(allowed, 5);
        let stats = registry.stats();
        assert_eq!(stats.decisions(), 16 * 50);
        assert_eq!(stats.rate_limited, 16 * 50 - 5);
        assert_eq!(stats.tracked_clients, 1);
    }

    // =========================================================================
    // GATEWAY ROUTER
    // =========================================================================

    #[tokio::test]
    async fn test_gateway_rate_limits_and_recovers() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);
        let service =
            GatewayService::with_registry(GatewayConfig::default(), Arc::clone(&registry)).unwrap();
        let router = service.router(api());

        for _ in 0..5 {
            let response = router
                .clone()
                .oneshot(request("/api/v1/photos", "203.0.113.7:5555"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = router
            .clone()
            .oneshot(request("/api/v1/photos", "203.0.113.7:5555"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        clock.advance(Duration::from_millis(100));
        let response = router
            .oneshot(request("/api/v1/photos", "203.0.113.7:5555"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gateway_bans_auth_hammering_client_only() {
        let clock = ManualTimeSource::new();
        let registry = registry_on(&clock);
        let service =
            GatewayService::with_registry(GatewayConfig::default(), Arc::clone(&registry)).unwrap();
        let router = service.router(api());

        let mut last = StatusCode::OK;
        for _ in 0..49 {
            last = router
                .clone()
                .oneshot(request("/api/v1/auth", "198.51.100.9:4000"))
                .await
                .unwrap()
                .status();
        }
        assert_eq!(last, StatusCode::FORBIDDEN);
        assert_eq!(score(&registry, "198.51.100.9"), 50);

        // Another client is unaffected
        let response = router
            .clone()
            .oneshot(request("/api/v1/photos", "198.51.100.10:4000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Ungated endpoints still answer the banned client
        let response = router
            .oneshot(request("/health", "198.51.100.9:4000"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
