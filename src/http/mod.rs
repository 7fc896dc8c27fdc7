// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer
//!
//! Fluent request building on top of a shared reqwest transport, with cookie
//! jar handling, charset-aware encoding and request/response dumps.

mod client;
mod cookie;
pub mod dump;
pub mod encoding;
mod request;
mod response;
mod transport;

pub use client::{delete, get, head, options, patch, post, put, HttpClient};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use dump::{DumpSink, StderrDump, WriterDump};
pub use encoding::TextEncoding;
pub use request::{CookieStoreFn, Request, DEFAULT_MAX_REDIRECTS};
pub use response::Response;
pub use transport::{ProxyAuth, Transport, TransportConfig};

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Safari/537.36";

/// Content types set by the body builders
pub mod content_type {
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json";
}
