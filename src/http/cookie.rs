// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar with snapshot persistence
//!
//! A session's jar is rebuilt from a JSON snapshot before each request and
//! written back after it, see [`CookiePersistence`](crate::service::CookiePersistence).

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use dashmap::DashMap;
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{Error, Result};

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to (empty = host of the request it is sent with)
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
    /// SameSite attribute
    #[serde(default)]
    pub same_site: SameSite,
    /// Only sent to `domain` itself, not to its subdomains
    #[serde(default)]
    pub host_only: bool,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    #[default]
    None,
    Lax,
    Strict,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
            host_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into().trim_start_matches('.').to_string();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set http_only flag
    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set same_site attribute
    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp <= Utc::now())
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !path_matches(&self.path, url.path()) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let host = host.to_ascii_lowercase();
        let domain = self.domain.to_ascii_lowercase();
        if self.host_only {
            return host == domain;
        }
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value received from `url`
    ///
    /// Returns None for malformed headers and for a `Domain` attribute the
    /// request host does not belong to.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));

        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        cookie.domain = host.clone();
        cookie.host_only = true;
        cookie.path = default_path(url);

        let mut max_age_seen = false;
        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" if !val.trim_start_matches('.').is_empty() => {
                        cookie.domain = val.trim_start_matches('.').to_lowercase();
                        cookie.host_only = false;
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" if !max_age_seen => {
                        if let Some(expires) = parse_expires(val) {
                            cookie.expires = Some(expires);
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            max_age_seen = true;
                            cookie.expires = Some(max_age_expiry(secs));
                        }
                    }
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => SameSite::Strict,
                            "lax" => SameSite::Lax,
                            _ => SameSite::None,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        if !cookie.host_only && !domain_accepts(url, &cookie.domain) {
            tracing::debug!(name = %cookie.name, domain = %cookie.domain, host = %host, "rejecting cookie for foreign domain");
            return None;
        }

        Some(cookie)
    }

    /// Parse a raw `Cookie` request header (`a=1; b=2`) into cookies
    ///
    /// Pairs without `=` or with an empty name are skipped.
    pub fn parse_pairs(raw: &str) -> Vec<Self> {
        raw.split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                (!name.is_empty()).then(|| Cookie::new(name, value.trim().trim_matches('"')))
            })
            .collect()
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Whether a response from `url` may set a cookie for `domain`
///
/// IP hosts only accept their own address. A domain without a dot is only
/// accepted from that exact host.
fn domain_accepts(url: &Url, domain: &str) -> bool {
    match url.host() {
        Some(Host::Domain(host)) => {
            let host = host.to_ascii_lowercase();
            if host == domain {
                return true;
            }
            domain.contains('.') && host.ends_with(&format!(".{}", domain))
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => url.host_str() == Some(domain),
        None => false,
    }
}

/// `Expires` in RFC 1123 form, or the dashed Netscape form
/// (`Wed, 21-Oct-2015 07:28:00 GMT`)
fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%a, %d-%b-%Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT", "%A, %d-%b-%y %H:%M:%S GMT"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Expiry for a `Max-Age` of `secs`; zero or negative means already expired
fn max_age_expiry(secs: i64) -> DateTime<Utc> {
    if secs <= 0 {
        return DateTime::<Utc>::MIN_UTC;
    }
    chrono::Duration::try_seconds(secs)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .map_or_else(latest_expiry, |expires| expires.min(latest_expiry()))
}

/// Cap for far-future expiries, kept within what snapshots can round-trip
fn latest_expiry() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map_or(DateTime::<Utc>::MAX_UTC, |naive| naive.and_utc())
}

/// RFC 6265 default-path: directory of the request path
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// Thread-safe cookie storage keyed by domain
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Add a cookie, replacing one with the same name, domain and path
    ///
    /// A cookie that is already expired removes its counterpart instead.
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        if !cookie.is_expired() {
            entry.push(cookie);
        }
    }

    /// Store cookies on behalf of `url`; cookies without a domain are
    /// scoped to exactly the URL's host
    pub fn set_cookies(&self, url: &Url, cookies: impl IntoIterator<Item = Cookie>) {
        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        for mut cookie in cookies {
            if cookie.domain.is_empty() {
                cookie.domain = host.clone();
                cookie.host_only = true;
            }
            self.add(cookie);
        }
    }

    /// Add a cookie from a Set-Cookie header
    pub fn add_from_header(&self, header: &str, url: &Url) {
        if let Some(cookie) = Cookie::parse(header, url) {
            self.add(cookie);
        }
    }

    /// Store every `Set-Cookie` found in a response received from `url`
    pub fn store_response_cookies(&self, headers: &HeaderMap, url: &Url) {
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                self.add_from_header(raw, url);
            }
        }
    }

    /// Get all live cookies for a URL, longest path first
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|c| c.matches(url))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()));
        result
    }

    /// Get Cookie header value for a URL
    pub fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        let joined = cookies
            .iter()
            .map(|c| c.to_header_value())
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }

    /// Find a cookie by name, in any domain
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .iter()
            .find_map(|entry| entry.value().iter().find(|c| c.name == name).cloned())
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cookies currently held, expired ones excluded
    pub fn all(&self) -> Vec<Cookie> {
        self.cookies
            .iter()
            .flat_map(|e| e.value().clone())
            .filter(|c| !c.is_expired())
            .collect()
    }

    /// Serialize the jar into a snapshot
    pub fn to_snapshot(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.all())?)
    }

    /// Rebuild a jar from a snapshot produced by [`CookieJar::to_snapshot`]
    pub fn from_snapshot(data: &[u8]) -> Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_slice(data)
            .map_err(|e| Error::cookie(format!("invalid jar snapshot: {}", e)))?;
        let jar = CookieJar::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        Ok(jar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parsing() {
        let url = Url::parse("https://example.com/path").unwrap();
        let header = "session=abc123; Domain=.example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_default_path_from_request() {
        let url = Url::parse("https://example.com/account/login").unwrap();
        let cookie = Cookie::parse("token=1", &url).unwrap();
        assert_eq!(cookie.path, "/account");

        let root = Url::parse("https://example.com/login").unwrap();
        assert_eq!(Cookie::parse("token=1", &root).unwrap().path, "/");
    }

    #[test]
    fn test_path_matching() {
        assert!(path_matches("/", "/anything"));
        assert!(path_matches("/account", "/account"));
        assert!(path_matches("/account", "/account/settings"));
        assert!(!path_matches("/account", "/accounts"));
    }

    #[test]
    fn test_parse_pairs() {
        let cookies = Cookie::parse_pairs("a=1; b=\"two\"; broken; =x");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].to_header_value(), "a=1");
        assert_eq!(cookies[1].value, "two");
    }

    #[test]
    fn test_cookie_jar() {
        let jar = CookieJar::new();
        let url = Url::parse("https://sub.example.com/path").unwrap();

        jar.add(Cookie::new("test", "value").domain("example.com"));
        jar.add(Cookie::new("other", "x").domain("example.org"));
        assert_eq!(jar.len(), 2);

        let cookies = jar.get_cookies(&url);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "test");
        assert_eq!(jar.cookie_header(&url).unwrap(), "test=value");
    }

    #[test]
    fn test_expired_cookie_deletes_existing() {
        let jar = CookieJar::new();
        let url = Url::parse("https://example.com/").unwrap();
        jar.add_from_header("sid=1", &url);
        assert_eq!(jar.len(), 1);

        jar.add_from_header("sid=; Max-Age=0", &url);
        assert!(jar.is_empty());
    }

    #[test]
    fn test_set_cookies_scopes_to_host() {
        let jar = CookieJar::new();
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        jar.set_cookies(&url, vec![Cookie::new("a", "1")]);

        assert_eq!(jar.get("a").unwrap().domain, "127.0.0.1");
        let other = Url::parse("http://10.0.0.1/").unwrap();
        assert!(jar.cookie_header(&other).is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let jar = CookieJar::new();
        jar.add(Cookie::new("sid", "abc").domain("example.com").http_only(true));
        jar.add(Cookie::new("lang", "fi").domain("example.org").path("/app"));

        let snapshot = jar.to_snapshot().unwrap();
        let restored = CookieJar::from_snapshot(&snapshot).unwrap();

        assert_eq!(restored.len(), 2);
        let sid = restored.get("sid").unwrap();
        assert_eq!(sid.value, "abc");
        assert_eq!(sid.domain, "example.com");
        assert!(sid.http_only);
        assert_eq!(restored.get("lang").unwrap().path, "/app");
    }

    #[test]
    fn test_huge_max_age_does_not_overflow() {
        let jar = CookieJar::new();
        let url = Url::parse("https://example.com/").unwrap();
        jar.add_from_header("sid=1; Max-Age=99999999999999", &url);

        let sid = jar.get("sid").unwrap();
        assert!(!sid.is_expired());
        assert_eq!(jar.cookie_header(&url).unwrap(), "sid=1");

        let restored = CookieJar::from_snapshot(&jar.to_snapshot().unwrap()).unwrap();
        assert_eq!(restored.get("sid").unwrap().expires, sid.expires);
    }

    #[test]
    fn test_negative_max_age_is_expired() {
        let url = Url::parse("https://example.com/").unwrap();
        let cookie = Cookie::parse("sid=1; Max-Age=-5", &url).unwrap();
        assert!(cookie.is_expired());
        let cookie = Cookie::parse("sid=1; Max-Age=-9223372036854775808", &url).unwrap();
        assert!(cookie.is_expired());
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let jar = CookieJar::new();
        let evil = Url::parse("http://evil.test/").unwrap();
        jar.add_from_header("sid=planted; Domain=bank.test", &evil);
        jar.add_from_header("tld=1; Domain=test", &evil);

        assert!(jar.is_empty());
        let bank = Url::parse("http://bank.test/").unwrap();
        assert!(jar.cookie_header(&bank).is_none());
    }

    #[test]
    fn test_parent_domain_accepted() {
        let jar = CookieJar::new();
        let url = Url::parse("https://login.example.com/").unwrap();
        jar.add_from_header("sid=1; Domain=example.com", &url);

        let other = Url::parse("https://www.example.com/").unwrap();
        assert_eq!(jar.cookie_header(&other).unwrap(), "sid=1");
    }

    #[test]
    fn test_ip_host_domain_attribute() {
        let url = Url::parse("http://10.0.0.1/").unwrap();
        assert!(Cookie::parse("a=1; Domain=10.0.0.1", &url).is_some());
        assert!(Cookie::parse("a=1; Domain=0.0.1", &url).is_none());
    }

    #[test]
    fn test_host_only_cookie_not_sent_to_subdomain() {
        let jar = CookieJar::new();
        let url = Url::parse("http://example.test/").unwrap();
        jar.add_from_header("sid=hostonly", &url);
        assert!(jar.get("sid").unwrap().host_only);

        assert_eq!(jar.cookie_header(&url).unwrap(), "sid=hostonly");
        let sub = Url::parse("http://other.example.test/").unwrap();
        assert!(jar.cookie_header(&sub).is_none());

        jar.set_cookies(&url, vec![Cookie::new("explicit", "1")]);
        assert!(jar.get("explicit").unwrap().host_only);
        assert_eq!(jar.get_cookies(&sub).len(), 0);
    }

    #[test]
    fn test_snapshot_without_host_only_loads() {
        let data = br#"[{"name":"sid","value":"abc","domain":"example.com","path":"/","expires":null,"secure":false,"http_only":false}]"#;
        let jar = CookieJar::from_snapshot(data).unwrap();
        assert!(!jar.get("sid").unwrap().host_only);
    }

    #[test]
    fn test_expires_formats() {
        let url = Url::parse("https://example.com/").unwrap();
        let rfc1123 = Cookie::parse("a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT", &url).unwrap();
        let dashed = Cookie::parse("a=1; Expires=Wed, 21-Oct-2015 07:28:00 GMT", &url).unwrap();

        assert!(rfc1123.expires.is_some());
        assert_eq!(dashed.expires, rfc1123.expires);
        assert!(dashed.is_expired());
    }

    #[test]
    fn test_invalid_snapshot() {
        assert!(matches!(
            CookieJar::from_snapshot(b"{not a jar"),
            Err(Error::Cookie(_))
        ));
    }
}
