// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Wire-level request/response dumps for debugging
//!
//! A dump is written once and then closed; closing marks the end of the dump
//! and is where buffering sinks emit their output.

use std::io::{self, Write};

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use url::Url;

/// Destination for one request or response dump
pub trait DumpSink: Send {
    /// Append dump bytes
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Signal the end of the dump
    fn close(&mut self) -> io::Result<()>;
}

/// Buffers a dump and prints it to stderr under a banner line on close
#[derive(Debug)]
pub struct StderrDump {
    banner: &'static str,
    buffer: Vec<u8>,
}

impl StderrDump {
    /// Sink for outbound requests
    pub fn request() -> Self {
        Self {
            banner: ">> request >>",
            buffer: Vec::new(),
        }
    }

    /// Sink for inbound responses
    pub fn response() -> Self {
        Self {
            banner: "<< response <<",
            buffer: Vec::new(),
        }
    }
}

impl DumpSink for StderrDump {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", self.banner)?;
        stderr.write_all(&self.buffer)?;
        if !self.buffer.ends_with(b"\n") {
            stderr.write_all(b"\n")?;
        }
        self.buffer.clear();
        stderr.flush()
    }
}

/// Adapts any writer; closing flushes it
#[derive(Debug)]
pub struct WriterDump<W> {
    inner: W,
}

impl<W: Write + Send> WriterDump<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Send> DumpSink for WriterDump<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Render an outbound request in HTTP/1.1 form
pub fn format_request(method: &Method, url: &Url, headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut out = format!("{} {} HTTP/1.1\r\n", method, target).into_bytes();
    if !headers.contains_key(reqwest::header::HOST) {
        if let Some(host) = url.host_str() {
            match url.port() {
                Some(port) => out.extend_from_slice(format!("Host: {}:{}\r\n", host, port).as_bytes()),
                None => out.extend_from_slice(format!("Host: {}\r\n", host).as_bytes()),
            }
        }
    }
    write_headers(&mut out, headers);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

/// Render an inbound response in HTTP/1.1 form
pub fn format_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .into_bytes();
    write_headers(&mut out, headers);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out
}

fn write_headers(out: &mut Vec<u8>, headers: &HeaderMap) {
    for (name, value) in headers {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
}

/// Write a whole dump and close the sink
pub fn emit(sink: &mut dyn DumpSink, data: &[u8]) -> io::Result<()> {
    sink.write(data)?;
    sink.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_format_request() {
        let url = Url::parse("http://example.com:8080/search?q=rust").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));

        let dump = format_request(&Method::POST, &url, &headers, b"hello");
        let text = String::from_utf8(dump).unwrap();
        assert!(text.starts_with("POST /search?q=rust HTTP/1.1\r\n"));
        assert!(text.contains("Host: example.com:8080\r\n"));
        assert!(text.contains("content-type: text/plain\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn test_format_response() {
        let dump = format_response(StatusCode::NOT_FOUND, &HeaderMap::new(), b"");
        assert_eq!(dump, b"HTTP/1.1 404 Not Found\r\n\r\n");
    }

    #[test]
    fn test_writer_dump() {
        let mut sink = WriterDump::new(Vec::new());
        emit(&mut sink, b"GET / HTTP/1.1").unwrap();
        assert_eq!(sink.into_inner(), b"GET / HTTP/1.1");
    }
}
