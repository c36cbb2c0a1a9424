// src/auth/providers/google.rs
//! Google sign-in: one-time code exchange plus token introspection

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{required_str, IdentityProvider, ProfileFetch, ProviderError};
use crate::auth::models::{Provider, ProviderGrant, ProviderProfile, ProviderSubject};
use crate::auth::session::SessionIdentity;
use crate::common::config::OAuthClientConfig;
use crate::common::{safe_email_log, safe_token_log};

/// Redirect marker for codes obtained by the JavaScript client rather than a redirect
pub const POSTMESSAGE_REDIRECT: &str = "postmessage";

#[derive(Debug, Clone)]
pub struct GoogleEndpoints {
    pub token_url: String,
    pub tokeninfo_url: String,
    pub userinfo_url: String,
    pub revoke_url: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            tokeninfo_url: "https://www.googleapis.com/oauth2/v1/tokeninfo".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v1/userinfo".to_string(),
            revoke_url: "https://accounts.google.com/o/oauth2/revoke".to_string(),
        }
    }
}

pub struct GoogleProvider {
    credentials: OAuthClientConfig,
    endpoints: GoogleEndpoints,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
}

impl GoogleProvider {
    pub fn new(credentials: OAuthClientConfig, http: Client) -> Self {
        Self::with_endpoints(credentials, GoogleEndpoints::default(), http)
    }

    pub fn with_endpoints(
        credentials: OAuthClientConfig,
        endpoints: GoogleEndpoints,
        http: Client,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            http,
        }
    }

    /// Check the token against the introspection endpoint and return its subject.
    async fn introspect(&self, grant: &ProviderGrant) -> Result<String, ProviderError> {
        let body: serde_json::Value = self
            .http
            .get(&self.endpoints.tokeninfo_url)
            .query(&[("access_token", grant.access_token.as_str())])
            .send()
            .await?
            .json()
            .await?;

        if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
            let err = err.as_str().map(str::to_string).unwrap_or_else(|| err.to_string());
            warn!(error = %err, "Google tokeninfo reported an error");
            return Err(ProviderError::TokenInfo(err));
        }

        let token_subject = required_str(&body, "user_id")?;
        let id_token_subject = grant
            .subject_hint
            .as_deref()
            .ok_or_else(|| ProviderError::Malformed("token response missing id_token".into()))?;
        if token_subject != id_token_subject {
            warn!("Google token subject does not match id_token subject");
            return Err(ProviderError::IdentityMismatch);
        }

        let issued_to = required_str(&body, "issued_to")?;
        if issued_to != self.credentials.client_id {
            warn!(issued_to = %issued_to, "Google token was issued to another client");
            return Err(ProviderError::AudienceMismatch);
        }

        Ok(token_subject)
    }
}

/// Read the `sub` claim from an id token's payload segment.
///
/// The signature is not checked here; the subject is only trusted once the
/// introspection endpoint reports the same value.
pub fn id_token_subject(id_token: &str) -> Result<String, ProviderError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ProviderError::Malformed("id_token is not a JWT".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ProviderError::Malformed(format!("id_token payload: {}", e)))?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| ProviderError::Malformed(format!("id_token claims: {}", e)))?;
    Ok(claims.sub)
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn provider(&self) -> Provider {
        Provider::Google
    }

    fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    async fn exchange_artifact(&self, raw_artifact: &str) -> Result<ProviderGrant, ProviderError> {
        let resp = self
            .http
            .post(&self.endpoints.token_url)
            .form(&[
                ("code", raw_artifact),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("redirect_uri", POSTMESSAGE_REDIRECT),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(http_status = %status, "Google rejected the authorization code");
            return Err(ProviderError::Exchange(format!("status {}: {}", status, body)));
        }

        let token: GoogleTokenResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("token response: {}", e)))?;
        let subject_hint = token.id_token.as_deref().map(id_token_subject).transpose()?;

        debug!(token = %safe_token_log(&token.access_token), "Exchanged Google authorization code");
        Ok(ProviderGrant {
            access_token: token.access_token,
            subject_hint,
        })
    }

    async fn fetch_profile(
        &self,
        grant: &ProviderGrant,
        current: Option<&SessionIdentity>,
    ) -> Result<ProfileFetch, ProviderError> {
        let subject_id = self.introspect(grant).await?;

        if let Some(identity) = current {
            if let ProviderSubject::Google { gplus_id } = &identity.subject {
                if *gplus_id == subject_id {
                    info!(user_id = identity.user_id, "Google user already connected");
                    return Ok(ProfileFetch::AlreadyConnected);
                }
            }
        }

        let body: serde_json::Value = self
            .http
            .get(&self.endpoints.userinfo_url)
            .query(&[("access_token", grant.access_token.as_str()), ("alt", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = required_str(&body, "email")?;
        debug!(email = %safe_email_log(&email), "Loaded Google profile");

        Ok(ProfileFetch::Verified(ProviderProfile {
            name: required_str(&body, "name")?,
            email,
            picture: body
                .get("picture")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            subject_id,
            access_token: grant.access_token.clone(),
        }))
    }

    async fn revoke(&self, identity: &SessionIdentity) -> Result<(), ProviderError> {
        let resp = self
            .http
            .get(&self.endpoints.revoke_url)
            .query(&[("token", identity.access_token.as_str())])
            .send()
            .await?;

        if resp.status().is_success() {
            info!(user_id = identity.user_id, "Revoked Google token");
            Ok(())
        } else {
            Err(ProviderError::Revoke(resp.status().as_u16()))
        }
    }
}
