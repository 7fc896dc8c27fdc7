// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response wrapper
//!
//! A [`Response`] either holds a complete exchange or the error that stopped
//! it. Every accessor checks for the error first and returns it unchanged, so
//! a failed dispatch never looks like an empty 0-status response.

use bytes::Bytes;
use lazy_static::lazy_static;
use regex::bytes::Regex;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::encoding::TextEncoding;
use crate::error::{Error, Result};

/// How far into the body `<meta charset>` is searched for
const META_PRESCAN_BYTES: usize = 1024;

lazy_static! {
    static ref CHARSET_PARAM: Regex =
        Regex::new(r#"(?i)\bcharset\s*=\s*["']?([\w\-:.]+)"#).expect("valid charset regex");
    static ref META_CHARSET: Regex =
        Regex::new(r#"(?i)<meta[^>]*?\bcharset\s*=\s*["']?([\w\-:.]+)"#).expect("valid meta regex");
}

#[derive(Debug, Clone)]
struct Exchange {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
}

/// HTTP response
#[derive(Debug, Clone)]
pub struct Response {
    inner: std::result::Result<Exchange, Error>,
    encoding: Option<TextEncoding>,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, url: Url) -> Self {
        Self {
            inner: Ok(Exchange {
                status,
                headers,
                body,
                url,
            }),
            encoding: None,
        }
    }

    /// Create a response that only carries `error`
    pub fn failed(error: Error) -> Self {
        Self {
            inner: Err(error),
            encoding: None,
        }
    }

    fn exchange(&self) -> Result<&Exchange> {
        self.inner.as_ref().map_err(Clone::clone)
    }

    /// Declare the charset of the body for [`Response::text`]
    ///
    /// An unknown name turns the whole response into that error.
    pub fn encoding(mut self, name: &str) -> Self {
        if self.inner.is_err() {
            return self;
        }
        match TextEncoding::for_label(name) {
            Ok(encoding) => self.encoding = Some(encoding),
            Err(e) => self.inner = Err(e),
        }
        self
    }

    /// Charset declared through [`Response::encoding`]
    pub fn declared_encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    /// The captured error, if dispatch failed
    pub fn error(&self) -> Option<&Error> {
        self.inner.as_ref().err()
    }

    /// Check if dispatch succeeded (regardless of status)
    pub fn is_ok(&self) -> bool {
        self.inner.is_ok()
    }

    /// Turn a failed dispatch into `Err`
    pub fn into_result(self) -> Result<Self> {
        match self.inner {
            Err(e) => Err(e),
            Ok(_) => Ok(self),
        }
    }

    /// Response status
    pub fn status(&self) -> Result<StatusCode> {
        Ok(self.exchange()?.status)
    }

    /// Response status code as u16
    pub fn code(&self) -> Result<u16> {
        Ok(self.exchange()?.status.as_u16())
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> Result<bool> {
        Ok(self.exchange()?.status.is_success())
    }

    /// Raw body bytes
    pub fn body(&self) -> Result<&Bytes> {
        Ok(&self.exchange()?.body)
    }

    /// Response headers
    pub fn headers(&self) -> Result<&HeaderMap> {
        Ok(&self.exchange()?.headers)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Result<Option<&str>> {
        Ok(self
            .exchange()?
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok()))
    }

    /// Get content type
    pub fn content_type(&self) -> Result<Option<&str>> {
        Ok(self
            .exchange()?
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()))
    }

    /// Final URL (after redirects)
    pub fn url(&self) -> Result<&Url> {
        Ok(&self.exchange()?.url)
    }

    /// Body as text, decoded with the declared encoding if any
    ///
    /// Without a declared encoding the bytes are taken as UTF-8; invalid
    /// sequences become U+FFFD.
    pub fn text(&self) -> Result<String> {
        let exchange = self.exchange()?;
        Ok(match self.encoding {
            Some(encoding) => encoding.decode(&exchange.body),
            None => String::from_utf8_lossy(&exchange.body).into_owned(),
        })
    }

    /// Body as text, decoded with the declared encoding, else the charset
    /// named by the Content-Type header, else a `<meta>` charset near the top
    /// of the body, else UTF-8
    pub fn text_detected(&self) -> Result<String> {
        let exchange = self.exchange()?;
        let encoding = self.encoding.or_else(|| detect_encoding(exchange));
        Ok(encoding
            .unwrap_or(TextEncoding::UTF_8)
            .decode(&exchange.body))
    }

    /// Body decoded as GB18030
    pub fn gb18030(&self) -> Result<String> {
        Ok(TextEncoding::GB18030.decode(&self.exchange()?.body))
    }

    /// Parse body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let exchange = self.exchange()?;
        serde_json::from_slice(&exchange.body).map_err(Error::from)
    }
}

fn detect_encoding(exchange: &Exchange) -> Option<TextEncoding> {
    let from_header = exchange
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| charset_label(&CHARSET_PARAM, value.as_bytes()));
    let prescan = &exchange.body[..exchange.body.len().min(META_PRESCAN_BYTES)];
    let label = from_header.or_else(|| charset_label(&META_CHARSET, prescan))?;

    match TextEncoding::for_label(&label) {
        Ok(encoding) => Some(encoding),
        Err(_) => {
            tracing::debug!(label = %label, "ignoring unknown charset");
            None
        }
    }
}

fn charset_label(pattern: &Regex, haystack: &[u8]) -> Option<String> {
    let captures = pattern.captures(haystack)?;
    let label = captures.get(1)?;
    Some(String::from_utf8_lossy(label.as_bytes()).into_owned())
}
