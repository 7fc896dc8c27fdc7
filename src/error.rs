// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for sessionhttp
//!
//! A dispatched request never panics or returns early with `?`: whatever goes
//! wrong is captured into the [`Response`](crate::http::Response) and handed
//! back from every accessor. For that reason [`Error`] is `Clone`; sources
//! that are not `Clone` themselves are held behind an `Arc`.

use std::sync::Arc;

use thiserror::Error;

/// Result type alias for sessionhttp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sessionhttp
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Transport failure (DNS, connect, TLS, timeout, proxy)
    #[error("HTTP error: {0}")]
    Http(#[source] Arc<reqwest::Error>),

    /// Response body could not be read to the end
    #[error("Failed to read response body: {0}")]
    Body(#[source] Arc<reqwest::Error>),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Method is not a valid HTTP token
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Header name or value rejected
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Encoding label unknown to the WHATWG registry
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// JSON (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[source] Arc<serde_json::Error>),

    /// Cookie snapshot could not be read or written
    #[error("Cookie error: {0}")]
    Cookie(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[source] Arc<std::io::Error>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a header error
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a body read error
    pub fn body(err: reqwest::Error) -> Self {
        Error::Body(Arc::new(err))
    }

    /// Create a cookie error
    pub fn cookie<S: Into<String>>(msg: S) -> Self {
        Error::Cookie(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Http(e) | Error::Body(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Body(_))
    }

    /// Check if the error was raised while building the request, before any
    /// network activity
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::Url(_)
                | Error::InvalidMethod(_)
                | Error::InvalidHeader { .. }
                | Error::UnknownEncoding(_)
                | Error::Serialization(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(Arc::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_errors() {
        assert!(Error::UnknownEncoding("nope".into()).is_construction());
        assert!(Error::InvalidMethod("BAD METHOD".into()).is_construction());
        assert!(!Error::cookie("broken").is_construction());
    }

    #[test]
    fn test_clone_keeps_message() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert!(!cloned.is_network());
    }
}
