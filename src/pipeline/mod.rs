//! Request pipeline: the single network egress point of the client.
//!
//! Every call the client makes goes through a [`Transport`]. The production
//! implementation, [`RequestPipeline`], attaches the bearer token and, on
//! state-changing methods, the anti-forgery token before dispatch. Other
//! components only ever see the trait, so tests substitute
//! [`crate::mock::MockTransport`].
//!
//! ## Headers
//!
//! | Header          | When                                                   |
//! |-----------------|--------------------------------------------------------|
//! | `Content-Type`  | always, `application/json`                             |
//! | `Authorization` | `Bearer <access_token>` when a token is stored         |
//! | `X-CSRFToken`   | POST/PUT/PATCH/DELETE, when a `csrftoken` cookie is set |

pub mod cookies;
pub mod http;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::errors::RequestError;

pub use cookies::{CSRF_COOKIE, CookieSource, SessionCookies, StaticCookies};
pub use http::{CSRF_HEADER, RequestPipeline};

/// An outbound API call, relative to the configured API root.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Attach a JSON body. Serialization of the client's own types cannot fail
    /// in practice; if it does the body is sent as `null` and the server rejects it.
    pub fn with_body<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Some(serde_json::to_value(body).unwrap_or(Value::Null));
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Methods that change server state and therefore carry the CSRF token.
pub fn is_unsafe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Something that can execute an [`ApiRequest`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch the request and return the parsed JSON body.
    ///
    /// Empty success bodies come back as `Value::Null`.
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError>;
}
