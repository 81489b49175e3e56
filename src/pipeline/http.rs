//! reqwest-backed [`Transport`].

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::cookies::{CSRF_COOKIE, CookieSource, SessionCookies};
use super::{ApiRequest, Transport, is_unsafe_method};
use crate::config::ClientConfig;
use crate::errors::RequestError;
use crate::session::TokenStore;

/// Header carrying the anti-forgery token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// The production request pipeline.
///
/// Holds one HTTP client for the process. The API root is fixed at
/// construction; tokens and cookies are read fresh on every request so a
/// login or logout takes effect on the next call.
pub struct RequestPipeline {
    client: Client,
    api_url: String,
    tokens: Arc<dyn TokenStore>,
    cookies: Arc<dyn CookieSource>,
}

impl RequestPipeline {
    /// Build a pipeline whose client shares a cookie jar with `cookies`.
    pub fn new(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        cookies: SessionCookies,
    ) -> Result<Self, RequestError> {
        let client = build_client(config.request_timeout, Some(&cookies))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            tokens,
            cookies: Arc::new(cookies),
        })
    }

    /// Build a pipeline with an arbitrary cookie source and no cookie jar.
    pub fn with_cookie_source(
        api_url: impl Into<String>,
        tokens: Arc<dyn TokenStore>,
        cookies: Arc<dyn CookieSource>,
    ) -> Result<Self, RequestError> {
        let timeout = Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS);
        let client = build_client(timeout, None)?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
            cookies,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_url, path)
        } else {
            format!("{}/{}", self.api_url, path)
        }
    }

    fn headers_for(&self, method: &Method) -> HeaderMap {
        let token = self.tokens.access_token();
        let csrf = if is_unsafe_method(method) {
            self.cookies.cookie(CSRF_COOKIE)
        } else {
            None
        };
        request_headers(method, token.as_deref(), csrf.as_deref())
    }
}

fn build_client(
    timeout: Duration,
    cookies: Option<&SessionCookies>,
) -> Result<Client, RequestError> {
    let mut defaults = HeaderMap::new();
    let json = HeaderValue::from_static("application/json");
    defaults.insert(CONTENT_TYPE, json);

    let mut builder = Client::builder().default_headers(defaults).timeout(timeout);
    if let Some(cookies) = cookies {
        builder = builder.cookie_provider(cookies.jar());
    }
    builder.build().map_err(|e| RequestError::Network {
        message: format!("Failed to create HTTP client: {}", e),
    })
}

/// Per-request auth headers.
///
/// `csrf` is only attached for unsafe methods, whatever the caller passes.
pub fn request_headers(
    method: &Method,
    access_token: Option<&str>,
    csrf: Option<&str>,
) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(token) = access_token {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored access token is not a valid header value"),
        }
    }

    if is_unsafe_method(method) {
        if let Some(csrf) = csrf {
            match HeaderValue::from_str(csrf) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static("x-csrftoken"), value);
                }
                Err(_) => warn!("csrftoken cookie is not a valid header value"),
            }
        }
    }

    headers
}

fn parse_body(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
}

#[async_trait]
impl Transport for RequestPipeline {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let url = self.url_for(&request.path);
        Url::parse(&url).map_err(|e| RequestError::Network {
            message: format!("Invalid request URL '{}': {}", url, e),
        })?;

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.headers_for(&request.method));
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(
                method = %request.method,
                path = %request.path,
                error = %e,
                "request failed to send"
            );
            RequestError::Network {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| RequestError::Network {
            message: format!("Failed to read response body: {}", e),
        })?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "api request completed"
        );

        if status.is_success() {
            return parse_body(&bytes).map_err(|e| RequestError::Decode {
                message: e.to_string(),
            });
        }

        let err = match parse_body(&bytes) {
            Ok(body) if !body.is_null() => RequestError::from_response(status.as_u16(), &body),
            _ => RequestError::Unreadable {
                status: status.as_u16(),
            },
        };
        warn!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            message = %err,
            "api request rejected"
        );
        Err(err)
    }
}
