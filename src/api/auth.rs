//! Auth endpoints and session bootstrap.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{AuthError, RequestError};
use crate::pipeline::{ApiRequest, Transport};
use crate::session::{Identity, REFRESH_TOKEN_KEY, SessionContext, SessionTokens};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const LOGOUT_PATH: &str = "/auth/logout/";
pub const USER_PATH: &str = "/auth/user/";

/// Account details for `/auth/register/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
}

/// Token payload returned by login and registration.
#[derive(Debug, Deserialize)]
struct TokenPayload {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    user: Option<Identity>,
}

/// Login, registration and logout, kept in step with a [`SessionContext`].
#[derive(Clone)]
pub struct AuthApi {
    transport: Arc<dyn Transport>,
    session: Arc<SessionContext>,
}

impl AuthApi {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionContext>) -> Self {
        Self { transport, session }
    }

    /// Resolve a stored token into an identity.
    ///
    /// A rejected token is dropped; any other failure leaves it in place and
    /// reports the session as signed out for this run.
    pub async fn bootstrap(&self) -> Option<Identity> {
        if self.session.tokens().access_token().is_none() {
            self.session.set_identity(None);
            return None;
        }
        match self.current_user().await {
            Ok(identity) => {
                self.session.set_identity(Some(identity.clone()));
                Some(identity)
            }
            Err(err) if err.is_auth() => {
                debug!("stored token rejected; clearing session");
                if let Err(e) = self.session.sign_out() {
                    warn!(error = %e, "failed to clear rejected session");
                }
                None
            }
            Err(err) => {
                warn!(error = %err, "could not resolve stored session");
                self.session.set_identity(None);
                None
            }
        }
    }

    pub async fn current_user(&self) -> Result<Identity, RequestError> {
        let body = self.transport.send(ApiRequest::get(USER_PATH)).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let credentials = json!({"username": username, "password": password});
        let request = ApiRequest::post(LOGIN_PATH).with_body(&credentials);
        let body = self.transport.send(request).await?;
        let identity = self.adopt_tokens(body).await?;
        identity.ok_or(AuthError::MissingToken)
    }

    /// Create an account. Signs in when the server returns tokens.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Option<Identity>, AuthError> {
        let body = self
            .transport
            .send(ApiRequest::post(REGISTER_PATH).with_body(registration))
            .await?;
        self.adopt_tokens(body).await
    }

    /// End the session. Local tokens are cleared even if the server call fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let refresh = self.session.tokens().get(REFRESH_TOKEN_KEY);
        let result = match refresh {
            Some(refresh) => {
                let body = json!({"refresh": refresh});
                let request = ApiRequest::post(LOGOUT_PATH).with_body(&body);
                self.transport.send(request).await.map(|_| ())
            }
            None => Ok(()),
        };
        self.session.sign_out().map_err(AuthError::Storage)?;
        result.map_err(AuthError::from)
    }

    async fn adopt_tokens(&self, body: Value) -> Result<Option<Identity>, AuthError> {
        let payload: TokenPayload = serde_json::from_value(body).map_err(RequestError::from)?;
        let Some(access) = payload.access else {
            return Ok(None);
        };
        let tokens = SessionTokens {
            access,
            refresh: payload.refresh,
        };

        // Store the token first so the identity lookup is authenticated.
        self.session
            .tokens()
            .set(crate::session::ACCESS_TOKEN_KEY, &tokens.access)
            .map_err(AuthError::Storage)?;
        let identity = match payload.user {
            Some(user) => user,
            None => self.current_user().await?,
        };
        self.session
            .sign_in(identity.clone(), &tokens)
            .map_err(AuthError::Storage)?;
        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockReply, MockTransport};
    use crate::session::MemoryTokenStore;

    fn setup(token: Option<&str>) -> (Arc<MockTransport>, Arc<SessionContext>, AuthApi) {
        let store = match token {
            Some(t) => MemoryTokenStore::with_access_token(t),
            None => MemoryTokenStore::new(),
        };
        let mock = Arc::new(MockTransport::new());
        let session = Arc::new(SessionContext::new(Arc::new(store)));
        let auth = AuthApi::new(mock.clone(), session.clone());
        (mock, session, auth)
    }

    #[tokio::test]
    async fn test_login_with_user_in_payload() {
        let (mock, session, auth) = setup(None);
        mock.respond(
            "POST",
            LOGIN_PATH,
            json!({"access": "a1", "refresh": "r1", "user": {"username": "ada"}}),
        );

        let identity = auth.login("ada", "pw").await.unwrap();
        assert_eq!(identity.username, "ada");
        assert_eq!(session.current().username(), Some("ada"));
        assert_eq!(session.tokens().access_token().as_deref(), Some("a1"));
        assert_eq!(mock.request_lines(), vec!["POST /auth/login/"]);
    }

    #[tokio::test]
    async fn test_login_fetches_user_when_missing() {
        let (mock, session, auth) = setup(None);
        mock.respond("POST", LOGIN_PATH, json!({"access": "a1"}));
        mock.respond("GET", USER_PATH, json!({"username": "bob", "email": "b@x"}));

        let identity = auth.login("bob", "pw").await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("b@x"));
        assert_eq!(session.current().username(), Some("bob"));
        assert_eq!(
            mock.request_lines(),
            vec!["POST /auth/login/", "GET /auth/user/"]
        );
    }

    #[tokio::test]
    async fn test_login_failure_surfaces_detail() {
        let (mock, session, auth) = setup(None);
        mock.reply(
            "POST",
            LOGIN_PATH,
            MockReply::status(401, json!({"detail": "Invalid credentials"})),
        );

        let err = auth.login("ada", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert!(!session.current().is_signed_in());
    }

    #[tokio::test]
    async fn test_register_validation_errors_are_field_indexed() {
        let (mock, _session, auth) = setup(None);
        mock.reply(
            "POST",
            REGISTER_PATH,
            MockReply::status(
                400,
                json!({"username": ["A user with that username already exists."]}),
            ),
        );

        let err = auth.register(&Registration::default()).await.unwrap_err();
        match err {
            AuthError::Request(req) => {
                let fields = req.field_errors().unwrap();
                assert!(fields.contains_key("username"));
            }
            other => panic!("Expected request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_resolves_stored_token() {
        let (mock, session, auth) = setup(Some("stored"));
        assert!(session.current().loading);
        mock.respond("GET", USER_PATH, json!({"username": "ada"}));

        let identity = auth.bootstrap().await;
        assert_eq!(identity.map(|i| i.username), Some("ada".to_string()));
        let state = session.current();
        assert!(!state.loading);
        assert_eq!(state.username(), Some("ada"));
    }

    #[tokio::test]
    async fn test_bootstrap_drops_rejected_token() {
        let (mock, session, auth) = setup(Some("expired"));
        mock.reply(
            "GET",
            USER_PATH,
            MockReply::status(401, json!({"detail": "expired"})),
        );

        assert!(auth.bootstrap().await.is_none());
        assert_eq!(session.tokens().access_token(), None);
        assert!(!session.current().loading);
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_skips_network() {
        let (mock, session, auth) = setup(None);
        assert!(auth.bootstrap().await.is_none());
        assert!(mock.requests().is_empty());
        assert!(!session.current().loading);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_server_fails() {
        let (mock, session, auth) = setup(None);
        let tokens = SessionTokens {
            access: "a".into(),
            refresh: Some("r".into()),
        };
        session.sign_in(Identity::new("ada"), &tokens).unwrap();
        mock.reply("POST", LOGOUT_PATH, MockReply::status(500, Value::Null));

        assert!(auth.logout().await.is_err());
        assert!(!session.current().is_signed_in());
        assert_eq!(session.tokens().access_token(), None);
        assert_eq!(mock.requests()[0].body, Some(json!({"refresh": "r"})));
    }
}
