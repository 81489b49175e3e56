//! Wiring from resolved configuration to live services.

use anyhow::{Context, Result};
use reqwest::Url;
use std::sync::Arc;

use crate::api::{ArticleApi, AuthApi};
use crate::catalog::{CatalogController, CatalogHandle};
use crate::config::ClientConfig;
use crate::gate::{ConfirmationGate, Navigator, Notifier};
use crate::mutation::MutationCoordinator;
use crate::pipeline::{RequestPipeline, SessionCookies, Transport};
use crate::session::{FileTokenStore, SessionContext};

/// Everything a front end needs to talk to one blog server.
pub struct Client {
    pub config: ClientConfig,
    pub session: Arc<SessionContext>,
    pub transport: Arc<dyn Transport>,
    pub articles: ArticleApi,
    pub auth: AuthApi,
}

impl Client {
    /// Open the persisted session and build the HTTP pipeline.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let tokens = Arc::new(
            FileTokenStore::open(config.session_file())
                .context("Failed to open session store")?,
        );
        let origin = Url::parse(&config.api_url)
            .with_context(|| format!("Invalid API URL '{}'", config.api_url))?;
        let pipeline = RequestPipeline::new(&config, tokens.clone(), SessionCookies::new(origin))?;
        let session = Arc::new(SessionContext::new(tokens));
        Ok(Self::with_transport(config, session, Arc::new(pipeline)))
    }

    /// Build a client over an existing transport.
    pub fn with_transport(
        config: ClientConfig,
        session: Arc<SessionContext>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            articles: ArticleApi::new(transport.clone()),
            auth: AuthApi::new(transport.clone(), session.clone()),
            config,
            session,
            transport,
        }
    }

    /// Start a catalog controller bound to this session.
    pub fn catalog(&self) -> CatalogHandle {
        CatalogController::spawn(
            self.articles.clone(),
            self.session.subscribe(),
            self.config.debounce,
        )
    }

    pub fn mutations(
        &self,
        gate: Arc<dyn ConfirmationGate>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> MutationCoordinator {
        MutationCoordinator::new(self.articles.clone(), gate, notifier, navigator)
            .with_redirect_delay(self.config.login_redirect_delay)
    }
}
