//! Single-article page.

use folio_model::{Article, ArticleId};
use tracing::warn;

use crate::api::ArticleApi;
use crate::errors::ErrorKind;

pub const FETCH_ARTICLE_FAILED: &str = "Failed to fetch article";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loaded(Article),
    NotFound,
    Failed(String),
}

/// Load one article for display.
pub async fn load(api: &ArticleApi, id: &ArticleId) -> DetailState {
    match api.get(id).await {
        Ok(article) => DetailState::Loaded(article),
        Err(err) if err.kind() == ErrorKind::NotFound => DetailState::NotFound,
        Err(err) => {
            warn!(article = %id, error = %err, "failed to fetch article");
            DetailState::Failed(FETCH_ARTICLE_FAILED.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_states() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            "GET",
            "/articles/1/",
            json!({"id": 1, "title": "Hi", "content": "Body"}),
        );
        let missing = MockReply::status(404, json!({"detail": "Not found."}));
        mock.reply("GET", "/articles/2/", missing);
        mock.reply("GET", "/articles/3/", MockReply::status(500, json!({})));
        let api = ArticleApi::new(mock);

        match load(&api, &ArticleId::from(1)).await {
            DetailState::Loaded(article) => assert_eq!(article.content, "Body"),
            other => panic!("Expected Loaded, got {:?}", other),
        }
        assert_eq!(load(&api, &ArticleId::from(2)).await, DetailState::NotFound);
        assert_eq!(
            load(&api, &ArticleId::from(3)).await,
            DetailState::Failed(FETCH_ARTICLE_FAILED.to_string())
        );
    }
}
