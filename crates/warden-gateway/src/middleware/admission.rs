//! Admission middleware.
//!
//! Resolves the client address, classifies the request and asks the
//! [`ClientRegistry`] for a decision. Only `Allowed` requests reach the
//! inner service.

use super::classify::SensitivityClassifier;
use super::client_ip::ClientIpResolver;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{error, warn};
use warden_admission::{AdmissionDecision, ClientRegistry};

struct AdmissionState {
    registry: Arc<ClientRegistry>,
    resolver: ClientIpResolver,
    classifier: SensitivityClassifier,
    exempt: HashSet<IpAddr>,
}

/// Admission layer
#[derive(Clone)]
pub struct AdmissionLayer {
    state: Arc<AdmissionState>,
}

impl AdmissionLayer {
    pub fn new(
        registry: Arc<ClientRegistry>,
        resolver: ClientIpResolver,
        classifier: SensitivityClassifier,
    ) -> Self {
        Self {
            state: Arc::new(AdmissionState {
                registry,
                resolver,
                classifier,
                exempt: HashSet::new(),
            }),
        }
    }

    /// Clients in `exempt` bypass the registry entirely.
    pub fn with_exempt(self, exempt: impl IntoIterator<Item = IpAddr>) -> Self {
        let state = AdmissionState {
            registry: Arc::clone(&self.state.registry),
            resolver: self.state.resolver.clone(),
            classifier: self.state.classifier.clone(),
            exempt: exempt.into_iter().collect(),
        };
        Self {
            state: Arc::new(state),
        }
    }
}

impl<S> Layer<S> for AdmissionLayer {
    type Service = AdmissionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AdmissionService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Admission service
#[derive(Clone)]
pub struct AdmissionService<S> {
    inner: S,
    state: Arc<AdmissionState>,
}

impl<S> Service<Request<Body>> for AdmissionService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        // Take the service that was driven to readiness, leave a fresh clone.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(ip) = state.resolver.resolve(&req) else {
                error!(path = %req.uri().path(), "Request has no peer address");
                return Ok(plain_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                ));
            };

            if state.exempt.contains(&ip) {
                return inner.call(req).await;
            }

            let target = req
                .uri()
                .path_and_query()
                .map_or_else(|| req.uri().path(), |pq| pq.as_str());
            let is_sensitive = state.classifier.is_sensitive(target);
            match state.registry.visit(&ip.to_string(), is_sensitive) {
                AdmissionDecision::Allowed => inner.call(req).await,
                AdmissionDecision::RateLimited => {
                    warn!(ip = %ip, sensitive = is_sensitive, "Rate limit exceeded");
                    Ok(plain_response(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
                }
                AdmissionDecision::Banned => {
                    warn!(ip = %ip, sensitive = is_sensitive, "Rejected banned client");
                    Ok(plain_response(StatusCode::FORBIDDEN, "Temporarily Banned"))
                }
            }
        })
    }
}

fn plain_response(status: StatusCode, message: &'static str) -> Response {
    let mut response = Response::new(Body::from(message));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
