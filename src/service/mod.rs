// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session-scoped requests
//!
//! An [`HttpService`] keys cookie state by a caller-chosen session id. Every
//! request of a session starts from the jar persisted by the previous one and
//! writes its jar back once the response is read.
//!
//! Requests of the same session are not serialized: two in flight at once
//! both start from the same snapshot and whichever finishes last overwrites
//! the other's cookie updates.

mod config;
mod persistence;

use std::sync::{Arc, OnceLock};

use reqwest::Method;

pub use config::{ServiceConfig, DEFAULT_CACHE_PREFIX, DEFAULT_CACHE_TTL};
pub use persistence::CookiePersistence;

use crate::cache::Cache;
use crate::error::Result;
use crate::http::{CookieJar, CookieStoreFn, Request, Transport};

/// Factory for session-scoped requests
pub struct HttpService {
    config: ServiceConfig,
    persistence: Arc<CookiePersistence>,
    user_agents: Arc<[String]>,
    transport: OnceLock<Result<Transport>>,
}

impl HttpService {
    /// Create a service with default configuration
    pub fn new<C: Cache + 'static>(cache: C) -> Self {
        Self::with_config(cache, ServiceConfig::default())
    }

    /// Create a service with custom configuration
    pub fn with_config<C: Cache + 'static>(cache: C, config: ServiceConfig) -> Self {
        let persistence = CookiePersistence::new(
            Arc::new(cache),
            config.cache_prefix.clone(),
            config.cache_ttl,
        );
        Self {
            user_agents: Arc::from(config.user_agents.clone()),
            persistence: Arc::new(persistence),
            transport: OnceLock::new(),
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn persistence(&self) -> &CookiePersistence {
        &self.persistence
    }

    /// The shared transport, built on first use
    pub fn transport(&self) -> Result<Transport> {
        self.transport
            .get_or_init(|| match self.config.transport {
                Some(ref transport) => Ok(transport.clone()),
                None => Transport::new(&self.config.transport_config()),
            })
            .clone()
    }

    /// Cookie jar currently persisted for `session_id`
    pub fn cookie_jar(&self, session_id: &str) -> CookieJar {
        self.persistence.load_jar(session_id)
    }

    fn new_request(&self, session_id: &str, follow_redirects: bool) -> Request {
        let transport = match self.transport() {
            Ok(transport) => transport,
            Err(e) => return Request::failed(e).session(session_id),
        };

        let persistence = self.persistence.clone();
        let store: CookieStoreFn = Arc::new(move |session: &str, jar: &CookieJar| {
            persistence.save(session, jar);
        });

        Request::new(transport)
            .cookie_jar(self.persistence.load_jar(session_id))
            .on_cookie_store(store)
            .user_agent_pool(self.user_agents.clone())
            .session(session_id)
            .follow_redirects(follow_redirects)
    }

    /// Request for `session_id`; method defaults to GET
    pub fn request(&self, session_id: &str) -> Request {
        self.new_request(session_id, true)
    }

    /// Request for `session_id` that returns 3xx responses as-is
    pub fn no_redirect_request(&self, session_id: &str) -> Request {
        self.new_request(session_id, false)
    }

    pub fn get(&self, session_id: &str) -> Request {
        self.request(session_id).with_method(Method::GET)
    }

    pub fn post(&self, session_id: &str) -> Request {
        self.request(session_id).with_method(Method::POST)
    }

    pub fn put(&self, session_id: &str) -> Request {
        self.request(session_id).with_method(Method::PUT)
    }

    pub fn delete(&self, session_id: &str) -> Request {
        self.request(session_id).with_method(Method::DELETE)
    }
}
