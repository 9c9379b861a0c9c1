//! Client address resolution.
//!
//! The admission key is the peer address of the connection. A forwarding
//! header is honored only when the peer is a trusted proxy, so a client
//! cannot pick its own key by sending `X-Forwarded-For`.

use crate::config::ProxyConfig;
use axum::{extract::ConnectInfo, http::Request};
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, warn};

/// Resolves the address a request is admitted under.
#[derive(Clone, Debug)]
pub struct ClientIpResolver {
    config: ProxyConfig,
}

impl ClientIpResolver {
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    /// Client address of `req`, or `None` when the connection has no peer
    /// address attached.
    pub fn resolve<B>(&self, req: &Request<B>) -> Option<IpAddr> {
        let direct_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip())?;

        if !self.is_trusted_proxy(direct_ip) {
            if req.headers().contains_key("x-forwarded-for") {
                warn!(direct_ip = %direct_ip, "Ignoring X-Forwarded-For from untrusted source");
            }
            return Some(direct_ip);
        }

        Some(self.forwarded_ip(req).unwrap_or(direct_ip))
    }

    fn forwarded_ip<B>(&self, req: &Request<B>) -> Option<IpAddr> {
        if self.config.real_ip_header.is_empty() {
            return None;
        }
        let value = req
            .headers()
            .get(self.config.real_ip_header.as_str())?
            .to_str()
            .ok()?;

        if !self
            .config
            .real_ip_header
            .eq_ignore_ascii_case("x-forwarded-for")
        {
            return value.trim().parse().ok();
        }

        // client, proxy1, proxy2: take the Nth from the right
        let ips: Vec<&str> = value.split(',').map(str::trim).collect();
        let index = ips.len().saturating_sub(self.config.proxy_count + 1);
        let ip = ips.get(index)?.parse::<IpAddr>().ok()?;
        debug!(value, extracted_ip = %ip, "Extracted client IP from header");
        Some(ip)
    }

    fn is_trusted_proxy(&self, ip: IpAddr) -> bool {
        self.config.trusted_proxies.contains(&ip) || (self.config.trust_localhost && ip.is_loopback())
    }
}
