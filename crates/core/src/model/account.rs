use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// Locally remembered sign-in state of the student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
    pub logged_in: bool,
}

impl UserSession {
    /// Session for a successful login. A blank token is not kept.
    #[must_use]
    pub fn signed_in(
        user_id: Option<UserId>,
        user_name: impl Into<String>,
        email: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        Self {
            user_id,
            user_name: Some(user_name.into()),
            email: Some(email.into()),
            token: token.filter(|t| !t.trim().is_empty()),
            logged_in: true,
        }
    }

    /// The explicit flag, or any remembered email or token, counts as signed in.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.logged_in || present(&self.email) || present(&self.token)
    }

    /// Display name: the stored name, else the local part of the email.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.user_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.email.as_deref().map(local_part).map(str::to_owned))
    }
}

/// Everything before the first `@`, or the whole string.
#[must_use]
pub fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_signed_out() {
        assert!(!UserSession::default().is_logged_in());
    }

    #[test]
    fn email_alone_counts_as_signed_in() {
        let session = UserSession {
            email: Some("kim@example.com".into()),
            ..UserSession::default()
        };
        assert!(session.is_logged_in());
        assert_eq!(session.display_name().as_deref(), Some("kim"));
    }

    #[test]
    fn blank_token_is_dropped() {
        let session = UserSession::signed_in(None, "Kim", "kim@example.com", Some("  ".into()));
        assert!(session.token.is_none());
        assert!(session.logged_in);
    }
}
