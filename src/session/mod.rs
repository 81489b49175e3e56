//! Session context: who is signed in, and where their tokens live.
//!
//! The session is populated at startup ([`crate::api::AuthApi::bootstrap`]),
//! changed only by sign-in and sign-out, and read everywhere else through a
//! `watch` channel. The catalog controller subscribes to it so a login or
//! logout triggers a reload.

pub mod store;

use anyhow::Result;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

pub use store::{
    ACCESS_TOKEN_KEY, FileTokenStore, MemoryTokenStore, REFRESH_TOKEN_KEY, TokenStore,
};

/// The signed-in user as reported by `/auth/user/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
        }
    }
}

/// Snapshot of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<Identity>,
    /// True until a stored token has been resolved to an identity (or rejected).
    pub loading: bool,
}

impl SessionState {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// Tokens issued by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: Option<String>,
}

/// Owner of the session state.
pub struct SessionContext {
    state: watch::Sender<SessionState>,
    tokens: Arc<dyn TokenStore>,
}

impl SessionContext {
    /// Create a context over `tokens`. It starts loading when a token is stored.
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        let loading = tokens.access_token().is_some();
        let (state, _) = watch::channel(SessionState {
            user: None,
            loading,
        });
        Self { state, tokens }
    }

    /// A signed-out, in-memory session.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// An in-memory session already signed in as `username`.
    pub fn signed_in_as(username: &str) -> Self {
        let context = Self::new(Arc::new(MemoryTokenStore::with_access_token("test-token")));
        context.set_identity(Some(Identity::new(username)));
        context
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn tokens(&self) -> Arc<dyn TokenStore> {
        self.tokens.clone()
    }

    /// Store fresh tokens and publish the identity.
    pub fn sign_in(&self, identity: Identity, tokens: &SessionTokens) -> Result<()> {
        self.tokens.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        match &tokens.refresh {
            Some(refresh) => self.tokens.set(REFRESH_TOKEN_KEY, refresh)?,
            None => self.tokens.remove(REFRESH_TOKEN_KEY)?,
        }
        info!(user = %identity.username, "signed in");
        self.set_identity(Some(identity));
        Ok(())
    }

    /// Drop stored tokens and publish the signed-out state.
    pub fn sign_out(&self) -> Result<()> {
        let removed_access = self.tokens.remove(ACCESS_TOKEN_KEY);
        let removed_refresh = self.tokens.remove(REFRESH_TOKEN_KEY);
        self.set_identity(None);
        info!("signed out");
        removed_access?;
        removed_refresh
    }

    /// Publish an identity resolved from an existing token and end loading.
    pub fn set_identity(&self, user: Option<Identity>) {
        self.state.send_if_modified(|state| {
            let changed = state.user != user || state.loading;
            state.user = user;
            state.loading = false;
            changed
        });
    }
}
