// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # sessionhttp - Fluent HTTP requests with persistent sessions
//!
//! A request builder over a shared reqwest transport. Cookie state can be
//! kept per session id in any expiring key/value [`Cache`], so consecutive
//! requests of one session see each other's cookies.
//!
//! ## Features
//!
//! - Fluent builder: query, form, JSON, raw bodies, headers, cookies
//! - Charset-aware query and form encoding (GB18030 and any WHATWG label)
//! - Session cookie jars persisted through a pluggable cache
//! - SOCKS5 proxies with optional credentials
//! - Redirects followed hop by hop with cookies recorded at each hop
//! - Request/response dumps for debugging
//!
//! ## Example
//!
//! ```rust,no_run
//! use sessionhttp::{HttpService, MemoryCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpService::new(MemoryCache::new());
//!
//!     let login = service
//!         .post("alice")
//!         .url("https://example.com/login")
//!         .form("user", "alice")
//!         .form("password", "secret")
//!         .send()
//!         .await;
//!     println!("login: {}", login.code()?);
//!
//!     // Cookies set by the login are sent here
//!     let profile = service.get("alice").url("https://example.com/me").send().await;
//!     println!("{}", profile.text()?);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod http;
pub mod service;

// Re-exports for convenience

// Cache
pub use cache::{Cache, MemoryCache};

// Error types
pub use error::{Error, Result};

// HTTP
pub use http::{
    Cookie, CookieJar, CookieStoreFn, DumpSink, HttpClient, ProxyAuth, Request, Response,
    SameSite, StderrDump, TextEncoding, Transport, TransportConfig, WriterDump,
    DEFAULT_USER_AGENT,
};

// Stateless entry points
pub use http::{delete, get, head, options, patch, post, put};

// Sessions
pub use service::{CookiePersistence, HttpService, ServiceConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
