//! Ambient cookie access for the anti-forgery token.

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the cookie carrying the anti-forgery token.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Read-only view of the cookies the server has set for the API origin.
pub trait CookieSource: Send + Sync {
    fn cookie(&self, name: &str) -> Option<String>;
}

/// Cookie jar shared with the HTTP client.
///
/// Cookies the server sets (Django's `csrftoken`) land in the jar through the
/// client and are read back from here for the `X-CSRFToken` header.
#[derive(Clone)]
pub struct SessionCookies {
    jar: Arc<Jar>,
    origin: Url,
}

impl SessionCookies {
    pub fn new(origin: Url) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            origin,
        }
    }

    pub fn jar(&self) -> Arc<Jar> {
        self.jar.clone()
    }

    /// Seed a cookie as if the server had set it.
    pub fn insert(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.origin);
    }
}

impl CookieSource for SessionCookies {
    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        let header = header.to_str().ok()?;
        find_cookie(header, name)
    }
}

/// Fixed cookie values, for tests and non-browser callers.
#[derive(Debug, Clone, Default)]
pub struct StaticCookies(HashMap<String, String>);

impl StaticCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl CookieSource for StaticCookies {
    fn cookie(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Find `name` in a `Cookie:` header value and percent-decode it.
pub fn find_cookie(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key != name {
            return None;
        }
        let decoded = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        Some(decoded)
    })
}
