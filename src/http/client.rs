// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stateless entry points
//!
//! [`HttpClient`] hands out requests that share one transport but no cookie
//! state: each request starts with an empty jar. The free functions use a
//! process-wide client that verifies TLS certificates.

use lazy_static::lazy_static;
use reqwest::Method;

use super::request::Request;
use super::transport::{Transport, TransportConfig};
use crate::error::Result;

lazy_static! {
    static ref DEFAULT_CLIENT: Result<HttpClient> =
        HttpClient::with_config(&TransportConfig::default().verify_certificates(true));
}

/// HTTP client without session state
#[derive(Debug, Clone)]
pub struct HttpClient {
    transport: Transport,
}

impl HttpClient {
    /// Create a client that verifies TLS certificates
    pub fn new() -> Result<Self> {
        Self::with_config(&TransportConfig::default().verify_certificates(true))
    }

    /// Create a client that accepts any TLS certificate
    pub fn insecure() -> Result<Self> {
        Self::with_config(&TransportConfig::default())
    }

    /// Create a client with custom transport configuration
    pub fn with_config(config: &TransportConfig) -> Result<Self> {
        Ok(Self::from_transport(Transport::new(config)?))
    }

    /// Reuse an existing transport
    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Create a request builder
    pub fn request(&self, method: Method, url: impl Into<String>) -> Request {
        Request::new(self.transport.clone())
            .with_method(method)
            .url(url)
    }

    pub fn get(&self, url: impl Into<String>) -> Request {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: impl Into<String>) -> Request {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: impl Into<String>) -> Request {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: impl Into<String>) -> Request {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: impl Into<String>) -> Request {
        self.request(Method::DELETE, url)
    }

    pub fn head(&self, url: impl Into<String>) -> Request {
        self.request(Method::HEAD, url)
    }

    pub fn options(&self, url: impl Into<String>) -> Request {
        self.request(Method::OPTIONS, url)
    }
}

fn default_request(method: Method, url: impl Into<String>) -> Request {
    match &*DEFAULT_CLIENT {
        Ok(client) => client.request(method, url),
        Err(e) => Request::failed(e.clone()).with_method(method).url(url),
    }
}

/// GET `url` through the default client
pub fn get(url: impl Into<String>) -> Request {
    default_request(Method::GET, url)
}

/// POST to `url` through the default client
pub fn post(url: impl Into<String>) -> Request {
    default_request(Method::POST, url)
}

/// PUT to `url` through the default client
pub fn put(url: impl Into<String>) -> Request {
    default_request(Method::PUT, url)
}

/// PATCH `url` through the default client
pub fn patch(url: impl Into<String>) -> Request {
    default_request(Method::PATCH, url)
}

/// DELETE `url` through the default client
pub fn delete(url: impl Into<String>) -> Request {
    default_request(Method::DELETE, url)
}

/// HEAD `url` through the default client
pub fn head(url: impl Into<String>) -> Request {
    default_request(Method::HEAD, url)
}

/// OPTIONS `url` through the default client
pub fn options(url: impl Into<String>) -> Request {
    default_request(Method::OPTIONS, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new().is_ok());
        assert!(HttpClient::insecure().is_ok());
    }

    #[test]
    fn test_free_functions_use_default_client() {
        let req = get("https://example.com/");
        assert!(req.error().is_none());
        assert!(req.jar().is_empty());
    }
}
