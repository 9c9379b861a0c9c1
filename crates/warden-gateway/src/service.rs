//! Gateway service - main entry point.
//!
//! Mounts an application router under the API prefix behind admission,
//! serves `/health` and `/stats` ungated, and owns the sweeper task.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::middleware::{AdmissionLayer, ClientIpResolver, SensitivityClassifier};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};
use warden_admission::{ClientRegistry, Sweeper};

/// Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    registry: Arc<ClientRegistry>,
}

impl GatewayService {
    /// Create a new gateway with a fresh registry
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let registry = Arc::new(ClientRegistry::new(config.admission.clone())?);
        Ok(Self { config, registry })
    }

    /// Create a gateway around an existing registry. The registry's own
    /// admission config wins over `config.admission`.
    pub fn with_registry(
        config: GatewayConfig,
        registry: Arc<ClientRegistry>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        Ok(Self { config, registry })
    }

    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Build the full router with `api` nested under the API prefix.
    pub fn router(&self, api: Router) -> Router {
        let admission = AdmissionLayer::new(
            Arc::clone(&self.registry),
            ClientIpResolver::new(self.config.proxy.clone()),
            SensitivityClassifier::new(self.config.dispatch.sensitive_markers.iter().cloned()),
        )
        .with_exempt(self.config.dispatch.exempt.iter().copied());

        let gated = api.fallback(unknown_resource).layer(admission);

        let registry = Arc::clone(&self.registry);
        let mut router = Router::new()
            .route("/health", get(health_check))
            .route(
                "/stats",
                get(move || {
                    let registry = Arc::clone(&registry);
                    async move { Json(registry.stats()) }
                }),
            )
            .nest(&self.config.api_prefix, gated);

        if let Some(dir) = &self.config.static_dir {
            router = router.fallback_service(ServeDir::new(dir));
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// API router used by the binary: every resource is unknown.
    pub fn default_api() -> Router {
        Router::new()
    }

    /// Bind, start serving and sweeping, and return a handle.
    pub async fn spawn(self, api: Router) -> Result<GatewayHandle, GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| GatewayError::Bind { addr, source })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(self.serve(listener, api, async move {
            let _ = shutdown_rx.await;
        }));

        Ok(GatewayHandle {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(self, api: Router, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind { addr, source })?;
        self.serve(listener, api, shutdown).await
    }

    async fn serve<F>(self, listener: TcpListener, api: Router, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router(api);
        let sweep_period = self.registry.config().sweep_period;
        let sweeper = Sweeper::spawn(Arc::clone(&self.registry), sweep_period);

        match listener.local_addr() {
            Ok(addr) => info!(addr = %addr, prefix = %self.config.api_prefix, "Starting HTTP server"),
            Err(e) => error!(error = %e, "Listener has no local address"),
        }

        let result = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(GatewayError::Serve);

        sweeper.shutdown().await;
        info!("Gateway stopped");
        result
    }
}

/// Handle to a gateway started with [`GatewayService::spawn`].
pub struct GatewayHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), GatewayError>>,
}

impl GatewayHandle {
    /// Address the server is actually listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Trigger graceful shutdown and wait for the server and sweeper to stop.
    pub async fn shutdown(mut self) -> Result<(), GatewayError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(GatewayError::Serve(std::io::Error::other(e))),
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn unknown_resource() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "Bad Request")
}
