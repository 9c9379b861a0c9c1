//! Gateway configuration with validation.
//!
//! Sources, later wins: built-in defaults, an optional TOML file, then
//! `WARDEN_*` environment overrides.

use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use warden_admission::AdmissionConfig;

/// Main gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path prefix of the admission-gated API
    pub api_prefix: String,
    /// Directory served at `/` outside admission (None = no static files)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Request classification and exemptions
    pub dispatch: DispatchConfig,
    /// Trusted proxy configuration
    pub proxy: ProxyConfig,
    /// Logging configuration
    pub log: LogConfig,
    /// Trust policy and sweep schedule
    pub admission: AdmissionConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/v1".to_string(),
            static_dir: None,
            http: HttpConfig::default(),
            dispatch: DispatchConfig::default(),
            proxy: ProxyConfig::default(),
            log: LogConfig::default(),
            admission: AdmissionConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from an optional TOML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, GatewayError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, GatewayError> {
        let text = std::fs::read_to_string(path).map_err(|source| GatewayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| GatewayError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded gateway configuration");
        Ok(config)
    }

    /// Apply `WARDEN_*` overrides read through `lookup`. Unparseable values
    /// are reported and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("WARDEN_HTTP_HOST") {
            match host.parse::<IpAddr>() {
                Ok(h) => self.http.host = h,
                Err(_) => warn!(value = %host, "WARDEN_HTTP_HOST is not an IP address"),
            }
        }
        if let Some(port) = lookup("WARDEN_HTTP_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.http.port = p,
                Err(_) => warn!(value = %port, "WARDEN_HTTP_PORT is not a port number"),
            }
        }
        if let Some(json) = lookup("WARDEN_LOG_JSON") {
            match json.parse::<bool>() {
                Ok(j) => self.log.json = j,
                Err(_) => warn!(value = %json, "WARDEN_LOG_JSON must be true or false"),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.api_prefix.starts_with('/') || self.api_prefix.len() < 2 {
            return Err(GatewayError::Config(format!(
                "api_prefix must be a non-root path starting with '/', got '{}'",
                self.api_prefix
            )));
        }
        if self.api_prefix.ends_with('/') {
            return Err(GatewayError::Config(format!(
                "api_prefix must not end with '/', got '{}'",
                self.api_prefix
            )));
        }

        if self.dispatch.sensitive_markers.iter().any(|m| m.is_empty()) {
            return Err(GatewayError::Config(
                "sensitive_markers cannot contain an empty marker".into(),
            ));
        }

        if self.proxy.real_ip_header.eq_ignore_ascii_case("x-forwarded-for")
            && self.proxy.proxy_count == 0
        {
            return Err(GatewayError::Config(
                "proxy_count must be at least 1 when reading X-Forwarded-For".into(),
            ));
        }

        self.admission.validate()?;
        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

/// Request classification configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// A request whose path or query contains any of these is sensitive
    pub sensitive_markers: Vec<String>,
    /// Clients that bypass admission entirely
    pub exempt: Vec<IpAddr>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sensitive_markers: vec!["auth".to_string()],
            exempt: Vec::new(),
        }
    }
}

/// Trusted proxy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Peers allowed to set the client address header
    pub trusted_proxies: Vec<IpAddr>,
    /// Treat loopback peers as trusted proxies
    pub trust_localhost: bool,
    /// Header carrying the client address (X-Forwarded-For, X-Real-IP, ...)
    pub real_ip_header: String,
    /// Number of trusted proxies in the X-Forwarded-For chain
    pub proxy_count: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            trusted_proxies: Vec::new(),
            trust_localhost: false,
            real_ip_header: "X-Forwarded-For".to_string(),
            proxy_count: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
