use std::sync::Arc;

use quiz_core::model::{UserSession, local_part};
use storage::repository::UserSessionRepository;
use tracing::{debug, info};

use crate::api::{AccountApi, LoginRequest, RegisterRequest, SessionContext};
use crate::error::AccountError;

/// Sign-in state of this device.
#[derive(Clone)]
pub struct AccountService {
    api: Arc<dyn AccountApi>,
    sessions: Arc<dyn UserSessionRepository>,
    context: Arc<SessionContext>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        api: Arc<dyn AccountApi>,
        sessions: Arc<dyn UserSessionRepository>,
        context: Arc<SessionContext>,
    ) -> Self {
        Self {
            api,
            sessions,
            context,
        }
    }

    /// Reload the remembered session and re-apply its token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the session cannot be read.
    pub async fn restore(&self) -> Result<Option<UserSession>, AccountError> {
        let session = self.sessions.load_session().await?;
        if let Some(s) = &session {
            self.context.set_token(s.token.clone());
            debug!(logged_in = s.is_logged_in(), "session restored");
        }
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the session cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, AccountError> {
        Ok(self
            .sessions
            .load_session()
            .await?
            .is_some_and(|s| s.is_logged_in()))
    }

    /// Sign in as a student and remember the session.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::MissingCredentials` for blank input,
    /// `AccountError::Rejected` with the backend's message when the login is
    /// refused or not a student login, `AccountError::Api` on transport failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession, AccountError> {
        let email = email.trim();
        let password = password.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        let result = self
            .api
            .login(&LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .await?;
        if !result.is_student_login() {
            return Err(AccountError::Rejected(result.failure_message()));
        }

        let user_name = result
            .user_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| local_part(email).to_owned());
        let session = UserSession::signed_in(result.user_id, user_name, email, result.token);
        self.sessions.save_session(&session).await?;
        self.context.set_token(session.token.clone());
        info!(user = ?session.user_id, "signed in");
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns `AccountError::Rejected` with the backend message for a
    /// non-success code, `AccountError::Api` on transport failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AccountError> {
        let ack = self.api.register(request).await?;
        if ack.is_success() {
            info!("registered");
            Ok(())
        } else {
            Err(AccountError::Rejected(ack.message_or("Registration failed")))
        }
    }

    /// Forget the session, its cookies and its token.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Storage` if the stored session cannot be removed
    /// or `AccountError::Api` if the HTTP client cannot be rebuilt.
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.sessions.clear_session().await?;
        self.context.clear_session()?;
        info!("signed out");
        Ok(())
    }
}
