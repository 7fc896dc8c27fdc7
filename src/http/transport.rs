// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared connection-pooling transport

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// Credentials for a SOCKS5 proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

impl ProxyAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Applied to connecting and to each whole exchange (None = no limit)
    pub timeout: Option<Duration>,
    /// SOCKS5 proxy address (`host:port`); None dials directly
    pub proxy: Option<String>,
    /// Optional SOCKS5 credentials
    pub proxy_auth: Option<ProxyAuth>,
    /// Skip TLS certificate verification.
    ///
    /// **Security:** defaults to `true`. Any certificate, including
    /// self-signed, expired and mismatched ones, is accepted, so traffic can
    /// be intercepted without notice. Set to `false` for anything that is not
    /// a scraper of hosts you already trust.
    pub accept_invalid_certs: bool,
    /// Maximum idle connections kept per host
    pub pool_max_idle_per_host: usize,
    /// How long an idle connection stays in the pool
    pub pool_idle_timeout: Duration,
    /// User agent sent when the request sets none
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            proxy: None,
            proxy_auth: None,
            accept_invalid_certs: true,
            pool_max_idle_per_host: 2000,
            pool_idle_timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    /// Create a new transport config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Dial through a SOCKS5 proxy
    pub fn proxy(mut self, addr: impl Into<String>) -> Self {
        self.proxy = Some(addr.into());
        self
    }

    /// Authenticate against the SOCKS5 proxy
    pub fn proxy_auth(mut self, auth: ProxyAuth) -> Self {
        self.proxy_auth = Some(auth);
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn verify_certificates(mut self, verify: bool) -> Self {
        self.accept_invalid_certs = !verify;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the `socks5h://` proxy URL, credentials included
    fn proxy_url(&self) -> Result<Option<Url>> {
        let addr = match self.proxy.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(addr) => addr,
        };

        let mut url = Url::parse(&format!("socks5h://{}", addr))
            .map_err(|e| Error::config(format!("Invalid proxy address '{}': {}", addr, e)))?;
        if let Some(ref auth) = self.proxy_auth {
            url.set_username(&auth.username)
                .and_then(|_| url.set_password(Some(&auth.password)))
                .map_err(|_| Error::config("Proxy address cannot carry credentials"))?;
        }
        Ok(Some(url))
    }
}

/// Reusable dispatcher shared by every request built from the same owner
///
/// Cloning is cheap and keeps the same connection pool. Redirects and cookies
/// are not handled here: the request loop follows redirects itself so that a
/// session jar sees the `Set-Cookie` of every hop.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build a transport
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout);

        if let Some(timeout) = config.timeout {
            builder = builder.connect_timeout(timeout).timeout(timeout);
        }

        match config.proxy_url()? {
            Some(url) => {
                let proxy = reqwest::Proxy::all(url.as_str())
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?;
                builder = builder.proxy(proxy);
            }
            None => builder = builder.no_proxy(),
        }

        if config.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for this transport");
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured reqwest client
    ///
    /// The client should be built with `redirect(Policy::none())`, otherwise
    /// cookies set on intermediate redirects are not recorded.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert!(config.accept_invalid_certs);
        assert_eq!(config.pool_max_idle_per_host, 2000);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_proxy_url_with_auth() {
        let config = TransportConfig::new()
            .proxy("127.0.0.1:1080")
            .proxy_auth(ProxyAuth::new("user", "p@ss"));
        let url = config.proxy_url().unwrap().unwrap();
        assert_eq!(url.scheme(), "socks5h");
        assert_eq!(url.username(), "user");
        assert_eq!(url.password(), Some("p%40ss"));
        assert_eq!(url.port(), Some(1080));
    }

    #[test]
    fn test_empty_proxy_dials_directly() {
        let config = TransportConfig::new().proxy("");
        assert!(config.proxy_url().unwrap().is_none());
    }

    #[test]
    fn test_transport_build() {
        let config = TransportConfig::new()
            .timeout(Duration::from_secs(5))
            .verify_certificates(true);
        assert!(Transport::new(&config).is_ok());
    }

    #[test]
    fn test_transport_build_with_proxy() {
        let config = TransportConfig::new().proxy("127.0.0.1:1080");
        assert!(Transport::new(&config).is_ok());
    }
}
