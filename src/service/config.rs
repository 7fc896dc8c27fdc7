// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Service configuration

use std::time::Duration;

use crate::http::{ProxyAuth, Transport, TransportConfig};

/// Prefix of cookie snapshot keys in the cache
pub const DEFAULT_CACHE_PREFIX: &str = "http/";

/// Lifetime of a cookie snapshot in the cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Cache key prefix for cookie snapshots
    pub cache_prefix: String,
    /// How long a snapshot lives after its last write
    pub cache_ttl: Duration,
    /// Connect and exchange timeout (None = no limit)
    pub timeout: Option<Duration>,
    /// SOCKS5 proxy address (`host:port`)
    pub proxy: Option<String>,
    /// SOCKS5 credentials
    pub proxy_auth: Option<ProxyAuth>,
    /// Pool for `auto_user_agent`
    pub user_agents: Vec<String>,
    /// Use this transport instead of building one
    pub transport: Option<Transport>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: None,
            proxy: None,
            proxy_auth: None,
            user_agents: Vec::new(),
            transport: None,
        }
    }
}

impl ServiceConfig {
    /// Create a new service config
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn proxy(mut self, addr: impl Into<String>) -> Self {
        self.proxy = Some(addr.into());
        self
    }

    pub fn proxy_auth(mut self, auth: ProxyAuth) -> Self {
        self.proxy_auth = Some(auth);
        self
    }

    pub fn user_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Transport settings derived from this config
    ///
    /// Certificate verification stays off, see
    /// [`TransportConfig::accept_invalid_certs`].
    pub(crate) fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            proxy: self.proxy.clone(),
            proxy_auth: self.proxy_auth.clone(),
            ..TransportConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.cache_prefix, "http/");
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert!(config.transport_config().accept_invalid_certs);
    }

    #[test]
    fn test_transport_config_carries_proxy() {
        let config = ServiceConfig::new()
            .timeout(Duration::from_secs(3))
            .proxy("127.0.0.1:1080")
            .proxy_auth(ProxyAuth::new("u", "p"));
        let transport = config.transport_config();
        assert_eq!(transport.timeout, Some(Duration::from_secs(3)));
        assert_eq!(transport.proxy.as_deref(), Some("127.0.0.1:1080"));
        assert_eq!(transport.proxy_auth, Some(ProxyAuth::new("u", "p")));
    }
}
