//! Typed article endpoints.
//!
//! | Operation     | Method | Path                        |
//! |---------------|--------|-----------------------------|
//! | list          | GET    | `/articles/`                |
//! | get one       | GET    | `/articles/{id}/`           |
//! | create        | POST   | `/articles/`                |
//! | update        | PUT    | `/articles/{id}/`           |
//! | delete        | DELETE | `/articles/{id}/`           |
//! | publish       | POST   | `/articles/{id}/publish/`   |
//! | unpublish     | POST   | `/articles/{id}/unpublish/` |

use folio_model::{Article, ArticleFields, ArticleId, ListQuery};
use serde_json::Value;
use std::sync::Arc;

use crate::errors::RequestError;
use crate::pipeline::{ApiRequest, Transport};

pub const ARTICLES_PATH: &str = "/articles/";

pub fn article_path(id: &ArticleId) -> String {
    format!("/articles/{}/", id)
}

/// Article endpoints over any [`Transport`].
#[derive(Clone)]
pub struct ArticleApi {
    transport: Arc<dyn Transport>,
}

impl ArticleApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Article>, RequestError> {
        let body = self
            .transport
            .send(ApiRequest::get(ARTICLES_PATH).with_params(query.params()))
            .await?;
        decode_article_list(body)
    }

    pub async fn get(&self, id: &ArticleId) -> Result<Article, RequestError> {
        let request = ApiRequest::get(article_path(id));
        let body = self.transport.send(request).await?;
        decode(body)
    }

    pub async fn create(&self, fields: &ArticleFields) -> Result<Article, RequestError> {
        let body = self
            .transport
            .send(ApiRequest::post(ARTICLES_PATH).with_body(fields))
            .await?;
        decode(body)
    }

    pub async fn update(
        &self,
        id: &ArticleId,
        fields: &ArticleFields,
    ) -> Result<Article, RequestError> {
        let body = self
            .transport
            .send(ApiRequest::put(article_path(id)).with_body(fields))
            .await?;
        decode(body)
    }

    pub async fn delete(&self, id: &ArticleId) -> Result<(), RequestError> {
        self.transport
            .send(ApiRequest::delete(article_path(id)))
            .await
            .map(|_| ())
    }

    /// The response body is ignored; callers reload the catalog afterwards.
    pub async fn publish(&self, id: &ArticleId) -> Result<(), RequestError> {
        self.transport
            .send(ApiRequest::post(format!("/articles/{}/publish/", id)))
            .await
            .map(|_| ())
    }

    pub async fn unpublish(&self, id: &ArticleId) -> Result<(), RequestError> {
        self.transport
            .send(ApiRequest::post(format!("/articles/{}/unpublish/", id)))
            .await
            .map(|_| ())
    }
}

/// Decode a list response.
///
/// Accepts a bare array or a paginated `{ "results": [...] }` envelope; the
/// envelope wins when both shapes could apply.
pub fn decode_article_list(body: Value) -> Result<Vec<Article>, RequestError> {
    let items = match body {
        Value::Object(mut map) if map.contains_key("results") => {
            map.remove("results").unwrap_or(Value::Null)
        }
        other => other,
    };
    if !items.is_array() {
        return Err(RequestError::Decode {
            message: "expected a list of articles".to_string(),
        });
    }
    decode(items)
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, RequestError> {
    serde_json::from_value(body).map_err(|e| RequestError::Decode {
        message: e.to_string(),
    })
}
