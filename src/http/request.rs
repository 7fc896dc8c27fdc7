// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fluent request builder and dispatch
//!
//! A [`Request`] collects everything about one call and is consumed by
//! [`Request::send`]. Mistakes made while building (bad method, unknown
//! encoding, unserializable JSON) are recorded rather than returned; `send`
//! then hands them back inside the [`Response`] without touching the network.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE,
    HOST, LOCATION, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use super::cookie::{Cookie, CookieJar};
use super::dump::{self, DumpSink, StderrDump};
use super::encoding::{self, TextEncoding};
use super::response::Response;
use super::transport::Transport;
use super::{content_type, DEFAULT_USER_AGENT};
use crate::error::{Error, Result};

/// Redirect hops followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Callback receiving a session's jar after each completed request
pub type CookieStoreFn = Arc<dyn Fn(&str, &CookieJar) + Send + Sync>;

/// What ends up on the wire as the request body
#[derive(Debug, Clone, Default)]
enum Body {
    #[default]
    Empty,
    /// Form fields in insertion order, each with one or more values
    Form(Vec<(String, Vec<String>)>),
    /// Already serialized JSON
    Json(Bytes),
    Raw(Bytes),
}

/// Fully resolved request, ready for the first hop
#[derive(Debug)]
pub(crate) struct Prepared {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Bytes>,
}

struct DumpSinks {
    request: Box<dyn DumpSink>,
    response: Box<dyn DumpSink>,
}

/// Fluent HTTP request
pub struct Request {
    transport: Option<Transport>,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Body,
    cookies: Vec<Cookie>,
    encoding: Option<TextEncoding>,
    jar: CookieJar,
    session_id: String,
    user_agents: Arc<[String]>,
    store_cookie: Option<CookieStoreFn>,
    dump: Option<DumpSinks>,
    follow_redirects: bool,
    max_redirects: usize,
    error: Option<Error>,
}

impl Request {
    /// Create a GET request dispatched through `transport`
    pub fn new(transport: Transport) -> Self {
        Self::with_transport(Some(transport))
    }

    /// A request that can only ever fail with `error`
    pub(crate) fn failed(error: Error) -> Self {
        let mut request = Self::with_transport(None);
        request.error = Some(error);
        request
    }

    fn with_transport(transport: Option<Transport>) -> Self {
        Self {
            transport,
            method: Method::GET,
            url: String::new(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: Body::Empty,
            cookies: Vec::new(),
            encoding: None,
            jar: CookieJar::new(),
            session_id: String::new(),
            user_agents: Arc::from(Vec::new()),
            store_cookie: None,
            dump: None,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            error: None,
        }
    }

    /// Keep the first construction error; later ones are usually fallout
    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Set the method by name
    pub fn method(mut self, method: impl AsRef<str>) -> Self {
        match Method::from_bytes(method.as_ref().as_bytes()) {
            Ok(method) => self.method = method,
            Err(_) => self.fail(Error::InvalidMethod(method.as_ref().to_string())),
        }
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn get(self) -> Self {
        self.with_method(Method::GET)
    }

    pub fn post(self) -> Self {
        self.with_method(Method::POST)
    }

    pub fn put(self) -> Self {
        self.with_method(Method::PUT)
    }

    pub fn patch(self) -> Self {
        self.with_method(Method::PATCH)
    }

    pub fn delete(self) -> Self {
        self.with_method(Method::DELETE)
    }

    pub fn head(self) -> Self {
        self.with_method(Method::HEAD)
    }

    pub fn options(self) -> Self {
        self.with_method(Method::OPTIONS)
    }

    pub fn connect(self) -> Self {
        self.with_method(Method::CONNECT)
    }

    /// Set the target URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Send a different `Host` header than the URL implies
    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        match HeaderValue::from_str(host.as_ref()) {
            Ok(value) => {
                self.headers.insert(HOST, value);
            }
            Err(e) => self.fail(Error::invalid_header("host", e)),
        }
        self
    }

    /// Append a query pair
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append one query pair per value
    pub fn query_values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        for value in values {
            self.query.push((key.clone(), value.into()));
        }
        self
    }

    /// Set a form field, replacing earlier values of the same key
    ///
    /// The body becomes `application/x-www-form-urlencoded`.
    pub fn form(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_values(key, [value.into()])
    }

    /// Set a multi-valued form field, replacing earlier values of the same key
    pub fn form_values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        if !matches!(self.body, Body::Form(_)) {
            self.body = Body::Form(Vec::new());
        }
        if let Body::Form(ref mut fields) = self.body {
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = values,
                None => fields.push((key, values)),
            }
        }
        self
    }

    /// Use `data` serialized as JSON for the body
    pub fn json<T: Serialize + ?Sized>(mut self, data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(bytes) => self.body = Body::Json(Bytes::from(bytes)),
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Use raw bytes for the body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Body::Raw(body.into());
        self
    }

    /// Set a header, replacing earlier values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name_str = name.as_ref();
        let parsed = HeaderName::from_bytes(name_str.as_bytes())
            .map_err(|e| Error::invalid_header(name_str, e))
            .and_then(|name| {
                HeaderValue::from_str(value.as_ref())
                    .map(|value| (name, value))
                    .map_err(|e| Error::invalid_header(name_str, e))
            });
        match parsed {
            Ok((name, value)) => {
                self.headers.insert(name, value);
            }
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn referer(self, referer: impl AsRef<str>) -> Self {
        self.header(REFERER, referer)
    }

    pub fn origin(self, origin: impl AsRef<str>) -> Self {
        self.header(ORIGIN, origin)
    }

    pub fn user_agent(self, user_agent: impl AsRef<str>) -> Self {
        self.header(USER_AGENT, user_agent)
    }

    /// Pick a user agent from the pool by hashing the session id
    ///
    /// The same session always gets the same entry. With an empty pool the
    /// default user agent is used.
    pub fn auto_user_agent(self) -> Self {
        let user_agent = select_user_agent(&self.user_agents, &self.session_id).to_string();
        self.user_agent(user_agent)
    }

    /// Add a cookie to send regardless of what the jar holds
    pub fn cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add cookies from a raw `Cookie` header value (`a=1; b=2`)
    pub fn cookies(mut self, raw: &str) -> Self {
        self.cookies.extend(Cookie::parse_pairs(raw));
        self
    }

    /// Encode query and form values in the named charset before escaping
    pub fn encoding(mut self, name: &str) -> Self {
        match TextEncoding::for_label(name) {
            Ok(encoding) => self.encoding = Some(encoding),
            Err(e) => self.fail(e),
        }
        self
    }

    /// Shorthand for `encoding("gb18030")`
    pub fn gb18030(mut self) -> Self {
        self.encoding = Some(TextEncoding::GB18030);
        self
    }

    /// Send values as UTF-8
    pub fn utf8(mut self) -> Self {
        self.encoding = None;
        self
    }

    /// Session the request belongs to
    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// User agents available to [`Request::auto_user_agent`]
    pub fn user_agent_pool(mut self, pool: impl Into<Arc<[String]>>) -> Self {
        self.user_agents = pool.into();
        self
    }

    /// Use `jar` for this request's cookies
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.jar = jar;
        self
    }

    /// Called with the session id and jar once the response body is read
    pub fn on_cookie_store(mut self, store: CookieStoreFn) -> Self {
        self.store_cookie = Some(store);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Print the request and response to stderr
    pub fn dump(self) -> Self {
        self.dump_to(StderrDump::request(), StderrDump::response())
    }

    /// Write the request and response dumps to custom sinks
    pub fn dump_to(
        mut self,
        request: impl DumpSink + 'static,
        response: impl DumpSink + 'static,
    ) -> Self {
        self.dump = Some(DumpSinks {
            request: Box::new(request),
            response: Box::new(response),
        });
        self
    }

    /// First error recorded while building
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Resolve URL, query and body into what the first hop sends
    pub(crate) fn prepare(&self) -> Result<Prepared> {
        let mut url = Url::parse(&self.url)?;

        if !self.query.is_empty() {
            let encoded = encoding::encode_pairs(
                self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                self.encoding,
            );
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
                _ => encoded,
            };
            url.set_query(Some(&query));
        }

        let mut headers = self.headers.clone();
        let body = match self.body {
            Body::Empty => None,
            Body::Form(ref fields) => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(content_type::FORM));
                let pairs = fields
                    .iter()
                    .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())));
                Some(Bytes::from(encoding::encode_pairs(pairs, self.encoding)))
            }
            Body::Json(ref bytes) => {
                headers
                    .entry(CONTENT_TYPE)
                    .or_insert(HeaderValue::from_static(content_type::JSON));
                Some(bytes.clone())
            }
            Body::Raw(ref bytes) => Some(bytes.clone()),
        };

        Ok(Prepared {
            method: self.method.clone(),
            url,
            headers,
            body,
        })
    }

    /// Dispatch the request
    ///
    /// Never fails directly: every error is carried by the returned
    /// [`Response`]. Exactly one network exchange happens per hop; there are
    /// no retries.
    pub async fn send(mut self) -> Response {
        if let Some(error) = self.error.take() {
            return Response::failed(error);
        }
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => return Response::failed(Error::config("request has no transport")),
        };

        let prepared = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => return Response::failed(e),
        };

        if !self.cookies.is_empty() {
            let cookies = std::mem::take(&mut self.cookies);
            self.jar.set_cookies(&prepared.url, cookies);
        }

        if let Some(ref mut sinks) = self.dump {
            let mut headers = prepared.headers.clone();
            if let Some(cookie) = self.jar.cookie_header(&prepared.url) {
                headers.insert(COOKIE, cookie);
            }
            let data = dump::format_request(
                &prepared.method,
                &prepared.url,
                &headers,
                prepared.body.as_deref().unwrap_or_default(),
            );
            if let Err(e) = dump::emit(sinks.request.as_mut(), &data) {
                tracing::debug!(error = %e, "request dump failed");
            }
        }

        let hops = HopPolicy {
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
        };
        let response = match hops.execute(&transport, &self.jar, prepared).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(error = %e, "request failed");
                return Response::failed(e);
            }
        };

        if let Some(ref mut sinks) = self.dump {
            let data = dump::format_response(
                response.status,
                &response.headers,
                &response.body,
            );
            if let Err(e) = dump::emit(sinks.response.as_mut(), &data) {
                tracing::debug!(error = %e, "response dump failed");
            }
        }

        if let Some(ref store) = self.store_cookie {
            store(&self.session_id, &self.jar);
        }

        Response::new(response.status, response.headers, response.body, response.url)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("session_id", &self.session_id)
            .field("encoding", &self.encoding)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
struct HopPolicy {
    follow_redirects: bool,
    max_redirects: usize,
}

impl HopPolicy {
    /// Run the hop loop: one exchange per hop, cookies recorded at each
    async fn execute(
        self,
        transport: &Transport,
        jar: &CookieJar,
        prepared: Prepared,
    ) -> Result<Received> {
        let Prepared {
            mut method,
            mut url,
            mut headers,
            mut body,
        } = prepared;
        let mut hops = 0;

        loop {
            let mut builder = transport
                .client()
                .request(method.clone(), url.clone())
                .headers(headers.clone());
            if let Some(cookie) = jar.cookie_header(&url) {
                builder = builder.header(COOKIE, cookie);
            }
            if let Some(ref body) = body {
                builder = builder.body(body.clone());
            }

            tracing::debug!(method = %method, url = %url, hop = hops, "sending request");
            let response = builder.send().await?;
            let status = response.status();
            jar.store_response_cookies(response.headers(), &url);

            let next = if self.follow_redirects && status.is_redirection() {
                redirect_target(&url, response.headers())
            } else {
                None
            };

            let next = match next {
                Some(next) => next,
                None => {
                    let headers = response.headers().clone();
                    let final_url = response.url().clone();
                    let body = response.bytes().await.map_err(Error::body)?;
                    tracing::debug!(status = %status, url = %final_url, bytes = body.len(), "response received");
                    return Ok(Received {
                        status,
                        headers,
                        body,
                        url: final_url,
                    });
                }
            };

            if hops >= self.max_redirects {
                return Err(Error::other(format!("stopped after {} redirects", hops)));
            }
            hops += 1;

            // Release the connection before the next hop
            let _ = response.bytes().await;

            if rewrites_to_get(status, &method) {
                method = Method::GET;
                body = None;
                headers.remove(CONTENT_TYPE);
                headers.remove(CONTENT_LENGTH);
            }
            if next.host_str() != url.host_str() {
                headers.remove(HOST);
                headers.remove(AUTHORIZATION);
            }
            url = next;
        }
    }
}

/// Final hop of a dispatch
struct Received {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: Url,
}

fn redirect_target(current: &Url, headers: &HeaderMap) -> Option<Url> {
    let location = headers.get(LOCATION)?.to_str().ok()?;
    current.join(location).ok()
}

/// 303, and 301/302 after anything but GET/HEAD, continue as a bodiless GET
fn rewrites_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::SEE_OTHER => *method != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => {
            *method != Method::GET && *method != Method::HEAD
        }
        _ => false,
    }
}

/// 64-bit FNV-1 hash
fn fnv1_64(data: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    data.iter().fold(OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(PRIME) ^ u64::from(byte)
    })
}

fn select_user_agent<'a>(pool: &'a [String], session_id: &str) -> &'a str {
    if pool.is_empty() {
        return DEFAULT_USER_AGENT;
    }
    let index = fnv1_64(session_id.as_bytes()) % pool.len() as u64;
    &pool[index as usize]
}
