//! Side-effecting article actions.
//!
//! Every successful mutation is followed by a catalog reload so the list
//! reflects the server, never an optimistic local patch. Failures are shown
//! to the user through the [`Notifier`] and returned to the caller.

use folio_model::{Article, ArticleFields, ArticleId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::ArticleApi;
use crate::catalog::CatalogHandle;
use crate::config::ClientConfig;
use crate::errors::{MutationError, RequestError};
use crate::gate::{ConfirmationGate, Navigator, Notifier, Route};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this article?";
pub const PUBLISH_FAILED: &str = "Failed to publish article.";
pub const UNPUBLISH_FAILED: &str = "Failed to unpublish article.";
pub const DELETE_FAILED: &str = "Failed to delete article. You may need to be authenticated.";
pub const SAVE_FAILED: &str = "Failed to save article";

/// Result of an action guarded by a confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Declined,
}

pub struct MutationCoordinator {
    api: ArticleApi,
    catalog: Option<CatalogHandle>,
    gate: Arc<dyn ConfirmationGate>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    redirects: Mutex<JoinSet<()>>,
}

impl MutationCoordinator {
    pub fn new(
        api: ArticleApi,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            catalog: None,
            gate,
            notifier,
            navigator,
            redirect_delay: ClientConfig::default().login_redirect_delay,
            redirects: Mutex::new(JoinSet::new()),
        }
    }

    /// Reload this catalog after every successful mutation.
    pub fn with_catalog(mut self, catalog: CatalogHandle) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    pub async fn publish(&self, id: &ArticleId) -> Result<Outcome, MutationError> {
        let result = self.api.publish(id).await;
        self.finish("publish", id, result, PUBLISH_FAILED).await
    }

    pub async fn unpublish(&self, id: &ArticleId) -> Result<Outcome, MutationError> {
        let result = self.api.unpublish(id).await;
        self.finish("unpublish", id, result, UNPUBLISH_FAILED).await
    }

    /// Delete after confirmation. Declining makes no request.
    pub async fn delete(&self, id: &ArticleId) -> Result<Outcome, MutationError> {
        if !self.gate.confirm(DELETE_PROMPT) {
            debug!(article = %id, "delete declined");
            return Ok(Outcome::Declined);
        }
        let result = self.api.delete(id).await;
        self.finish("delete", id, result, DELETE_FAILED).await
    }

    /// Delete from the article page, returning to the catalog on success.
    pub async fn delete_and_leave(&self, id: &ArticleId) -> Result<Outcome, MutationError> {
        let outcome = self.delete(id).await?;
        if outcome == Outcome::Applied {
            self.navigator.navigate(Route::Catalog);
        }
        Ok(outcome)
    }

    /// Validate and create. Nothing is sent for blank title or content.
    pub async fn create(&self, fields: &ArticleFields) -> Result<Article, MutationError> {
        fields.validate()?;
        match self.api.create(fields).await {
            Ok(article) => {
                info!(article = %article.id, "article created");
                self.saved().await;
                Ok(article)
            }
            Err(err) => Err(self.save_failed(err).await),
        }
    }

    pub async fn update(
        &self,
        id: &ArticleId,
        fields: &ArticleFields,
    ) -> Result<Article, MutationError> {
        fields.validate()?;
        match self.api.update(id, fields).await {
            Ok(article) => {
                info!(article = %id, "article updated");
                self.saved().await;
                Ok(article)
            }
            Err(err) => Err(self.save_failed(err).await),
        }
    }

    /// Wait for scheduled login redirects to fire.
    pub async fn wait_for_redirects(&self) {
        let mut redirects = self.redirects.lock().await;
        while let Some(joined) = redirects.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "login redirect task failed");
            }
        }
    }

    async fn finish(
        &self,
        action: &str,
        id: &ArticleId,
        result: Result<(), RequestError>,
        fallback: &str,
    ) -> Result<Outcome, MutationError> {
        match result {
            Ok(()) => {
                info!(article = %id, action, "article updated on server");
                self.reload().await;
                Ok(Outcome::Applied)
            }
            Err(err) => {
                warn!(article = %id, action, error = %err, "mutation failed");
                self.notifier.alert(err.message_or(fallback));
                Err(err.into())
            }
        }
    }

    async fn saved(&self) {
        self.reload().await;
        self.navigator.navigate(Route::Catalog);
    }

    async fn save_failed(&self, err: RequestError) -> MutationError {
        warn!(error = %err, "failed to save article");
        self.notifier.alert(err.message_or(SAVE_FAILED));
        if err.is_auth() {
            self.schedule_login_redirect().await;
        }
        err.into()
    }

    async fn schedule_login_redirect(&self) {
        let navigator = self.navigator.clone();
        let delay = self.redirect_delay;
        debug!(
            delay_ms = delay.as_millis() as u64,
            "scheduling login redirect"
        );
        let mut redirects = self.redirects.lock().await;
        while let Some(joined) = redirects.try_join_next() {
            if let Err(e) = joined {
                warn!(error = %e, "login redirect task failed");
            }
        }
        redirects.spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(Route::Login);
        });
    }

    async fn reload(&self) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        if let Err(e) = catalog.refresh().await {
            warn!(error = %e, "could not reload catalog");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        MockReply, MockTransport, RecordingNavigator, RecordingNotifier, ScriptedGate,
    };
    use folio_model::Tags;
    use serde_json::json;

    struct Harness {
        mock: Arc<MockTransport>,
        gate: Arc<ScriptedGate>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
        coordinator: MutationCoordinator,
    }

    fn harness(confirm: bool) -> Harness {
        let mock = Arc::new(MockTransport::new());
        let gate = Arc::new(ScriptedGate::new(confirm));
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let coordinator = MutationCoordinator::new(
            ArticleApi::new(mock.clone()),
            gate.clone(),
            notifier.clone(),
            navigator.clone(),
        );
        Harness {
            mock,
            gate,
            notifier,
            navigator,
            coordinator,
        }
    }

    fn fields(title: &str, content: &str) -> ArticleFields {
        ArticleFields::new(title, content, Tags::parse("rust"))
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let h = harness(false);
        let outcome = h.coordinator.delete(&ArticleId::from(4)).await.unwrap();

        assert_eq!(outcome, Outcome::Declined);
        assert!(h.mock.calls().is_empty());
        assert_eq!(h.gate.prompts(), vec![DELETE_PROMPT]);
    }

    #[tokio::test]
    async fn test_confirmed_delete() {
        let h = harness(true);
        let outcome = h.coordinator.delete(&ArticleId::from(4)).await.unwrap();

        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(h.mock.request_lines(), vec!["DELETE /articles/4/"]);
    }

    #[tokio::test]
    async fn test_delete_and_leave_navigates_home() {
        let h = harness(true);
        h.coordinator
            .delete_and_leave(&ArticleId::from(4))
            .await
            .unwrap();
        assert_eq!(h.navigator.routes(), vec![Route::Catalog]);
    }

    #[tokio::test]
    async fn test_publish_failure_alerts_server_message() {
        let h = harness(true);
        h.mock.reply(
            "POST",
            "/articles/9/publish/",
            MockReply::status(403, json!({"detail": "Not yours"})),
        );

        let id = ArticleId::from(9);
        let err = h.coordinator.publish(&id).await.unwrap_err();
        assert!(matches!(err, MutationError::Request(_)));
        assert_eq!(h.notifier.alerts(), vec!["Not yours"]);
    }

    #[tokio::test]
    async fn test_unpublish_failure_falls_back() {
        let h = harness(true);
        h.mock.reply(
            "POST",
            "/articles/9/unpublish/",
            MockReply::status(500, json!({})),
        );

        h.coordinator
            .unpublish(&ArticleId::from(9))
            .await
            .unwrap_err();
        assert_eq!(h.notifier.alerts(), vec![UNPUBLISH_FAILED]);
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_locally() {
        let h = harness(true);
        let blank = fields("  ", "body");
        let err = h.coordinator.create(&blank).await.unwrap_err();

        assert_eq!(err.to_string(), "Title and content are required");
        assert!(h.mock.calls().is_empty());
        assert!(h.notifier.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_create_sends_joined_tags_and_navigates() {
        let h = harness(true);
        h.mock.respond(
            "POST",
            "/articles/",
            json!({"id": 12, "title": "Hello", "content": "World", "tags": "rust"}),
        );

        let draft = fields("Hello", "World");
        let article = h.coordinator.create(&draft).await.unwrap();
        assert_eq!(article.id, ArticleId::from(12));

        let sent = h.mock.requests()[0].body.clone().unwrap();
        assert_eq!(sent["tags"], "rust");
        assert_eq!(h.navigator.routes(), vec![Route::Catalog]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_failure_redirects_after_delay() {
        let h = harness(true);
        h.mock.reply(
            "PUT",
            "/articles/3/",
            MockReply::status(401, json!({"detail": "Token expired"})),
        );

        let start = tokio::time::Instant::now();
        h.coordinator
            .update(&ArticleId::from(3), &fields("T", "C"))
            .await
            .unwrap_err();
        assert_eq!(h.notifier.alerts(), vec!["Token expired"]);
        assert!(h.navigator.routes().is_empty());

        h.coordinator.wait_for_redirects().await;
        let visits = h.navigator.visits();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].0, Route::Login);
        let waited = visits[0].1.duration_since(start);
        assert!(waited >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_redirects_are_reaped() {
        let h = harness(true);
        h.mock.reply(
            "POST",
            "/articles/",
            MockReply::status(403, json!({"detail": "Forbidden"})),
        );

        for _ in 0..3 {
            h.coordinator.create(&fields("T", "C")).await.unwrap_err();
            tokio::time::sleep(Duration::from_secs(3)).await;
        }

        assert_eq!(h.navigator.routes().len(), 3);
        assert_eq!(h.coordinator.redirects.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_server_failure_does_not_redirect() {
        let h = harness(true);
        let failure = MockReply::status(500, json!({}));
        h.mock.reply("POST", "/articles/", failure);

        h.coordinator.create(&fields("T", "C")).await.unwrap_err();
        h.coordinator.wait_for_redirects().await;

        assert_eq!(h.notifier.alerts(), vec![SAVE_FAILED]);
        assert!(h.navigator.routes().is_empty());
    }
}
