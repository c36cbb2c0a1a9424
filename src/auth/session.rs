//! Typed per-browser login session
//!
//! The whole login record lives under a single session key, so every write replaces
//! it in one step and a half-written identity can never be observed.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::models::{Provider, ProviderProfile, ProviderSubject};
use crate::common::ApiError;

pub const LOGIN_SESSION_KEY: &str = "login_session";

/// Authenticated identity fields. Present all together or not at all.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    pub username: String,
    pub email: String,
    pub picture: String,
    pub user_id: i64,
    pub access_token: String,
    #[serde(flatten)]
    pub subject: ProviderSubject,
}

impl SessionIdentity {
    pub fn from_profile(profile: &ProviderProfile, provider: Provider, user_id: i64) -> Self {
        Self {
            username: profile.name.clone(),
            email: profile.email.clone(),
            picture: profile.picture.clone(),
            user_id,
            access_token: profile.access_token.clone(),
            subject: ProviderSubject::new(provider, profile.subject_id.clone()),
        }
    }

    pub fn provider(&self) -> Provider {
        self.subject.provider()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoginSession {
    /// Anti-forgery token for the login attempt in progress
    pub state: Option<String>,
    pub identity: Option<SessionIdentity>,
}

impl LoginSession {
    pub fn provider(&self) -> Option<Provider> {
        self.identity.as_ref().map(SessionIdentity::provider)
    }

    pub fn user_id(&self) -> Option<i64> {
        self.identity.as_ref().map(|i| i.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

pub async fn load(session: &Session) -> Result<LoginSession, ApiError> {
    Ok(session
        .get::<LoginSession>(LOGIN_SESSION_KEY)
        .await?
        .unwrap_or_default())
}

/// Replace the stored record and flush it to the store immediately.
///
/// Requests for one session are serialized by `serialize_session_requests`, so
/// the next request for this browser sees the write.
pub async fn persist(session: &Session, login: &LoginSession) -> Result<(), ApiError> {
    session.insert(LOGIN_SESSION_KEY, login).await?;
    session.save().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            username: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            picture: "https://example.com/ada.png".to_string(),
            user_id: 7,
            access_token: "token-abc".to_string(),
            subject: ProviderSubject::Google {
                gplus_id: "1122".to_string(),
            },
        }
    }

    #[test]
    fn test_identity_serializes_with_historical_field_names() {
        let json = serde_json::to_value(identity()).unwrap();
        assert_eq!(json["provider"], "google");
        assert_eq!(json["gplus_id"], "1122");
        assert_eq!(json["user_id"], 7);
        assert!(json.get("facebook_id").is_none());

        let back: SessionIdentity = serde_json::from_value(json).unwrap();
        assert_eq!(back, identity());
    }

    #[test]
    fn test_identity_without_subject_is_rejected() {
        let json = serde_json::json!({
            "username": "Ada",
            "email": "ada@example.com",
            "picture": "p",
            "user_id": 7,
            "access_token": "t",
            "provider": "google"
        });
        assert!(serde_json::from_value::<SessionIdentity>(json).is_err());
    }

    #[test]
    fn test_default_session_is_anonymous() {
        let login = LoginSession::default();
        assert!(!login.is_authenticated());
        assert_eq!(login.provider(), None);
        assert_eq!(login.user_id(), None);
    }
}
