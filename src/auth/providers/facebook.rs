// src/auth/providers/facebook.rs
//! Facebook login: the browser hands over a client-side access token
//!
//! The token is upgraded to a long-lived one through Facebook's own token endpoint,
//! which also validates it, so no separate introspection step runs here.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{required_str, IdentityProvider, ProfileFetch, ProviderError};
use crate::auth::models::{Provider, ProviderGrant, ProviderProfile, ProviderSubject};
use crate::auth::session::SessionIdentity;
use crate::common::config::OAuthClientConfig;
use crate::common::{safe_email_log, safe_token_log};

#[derive(Debug, Clone)]
pub struct FacebookEndpoints {
    /// Graph API root, without a version segment
    pub graph_url: String,
    pub api_version: String,
}

impl Default for FacebookEndpoints {
    fn default() -> Self {
        Self {
            graph_url: "https://graph.facebook.com".to_string(),
            api_version: "v2.10".to_string(),
        }
    }
}

pub struct FacebookProvider {
    credentials: OAuthClientConfig,
    endpoints: FacebookEndpoints,
    http: Client,
}

impl FacebookProvider {
    pub fn new(credentials: OAuthClientConfig, http: Client) -> Self {
        Self::with_endpoints(credentials, FacebookEndpoints::default(), http)
    }

    pub fn with_endpoints(
        credentials: OAuthClientConfig,
        endpoints: FacebookEndpoints,
        http: Client,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            http,
        }
    }

    fn versioned(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoints.graph_url, self.endpoints.api_version, path
        )
    }
}

#[async_trait]
impl IdentityProvider for FacebookProvider {
    fn provider(&self) -> Provider {
        Provider::Facebook
    }

    fn client_id(&self) -> &str {
        &self.credentials.client_id
    }

    async fn exchange_artifact(&self, raw_artifact: &str) -> Result<ProviderGrant, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/oauth/access_token", self.endpoints.graph_url))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("fb_exchange_token", raw_artifact),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(http_status = %status, "Facebook rejected the client token");
            return Err(ProviderError::Exchange(format!("status {}: {}", status, body)));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(format!("token response: {}", e)))?;
        let access_token = required_str(&body, "access_token")?;

        debug!(token = %safe_token_log(&access_token), "Upgraded Facebook client token");
        Ok(ProviderGrant {
            access_token,
            subject_hint: None,
        })
    }

    async fn fetch_profile(
        &self,
        grant: &ProviderGrant,
        _current: Option<&SessionIdentity>,
    ) -> Result<ProfileFetch, ProviderError> {
        let token = grant.access_token.as_str();

        let me: serde_json::Value = self
            .http
            .get(self.versioned("me"))
            .query(&[("access_token", token), ("fields", "name,id,email")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let picture: serde_json::Value = self
            .http
            .get(self.versioned("me/picture"))
            .query(&[
                ("access_token", token),
                ("redirect", "0"),
                ("height", "200"),
                ("width", "200"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let email = required_str(&me, "email")?;
        debug!(email = %safe_email_log(&email), "Loaded Facebook profile");

        Ok(ProfileFetch::Verified(ProviderProfile {
            name: required_str(&me, "name")?,
            email,
            picture: picture
                .pointer("/data/url")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            subject_id: required_str(&me, "id")?,
            access_token: grant.access_token.clone(),
        }))
    }

    /// Best effort: Facebook gives no dependable status contract for this call.
    async fn revoke(&self, identity: &SessionIdentity) -> Result<(), ProviderError> {
        let ProviderSubject::Facebook { facebook_id } = &identity.subject else {
            return Ok(());
        };

        let url = format!(
            "{}/{}/permissions",
            self.endpoints.graph_url,
            urlencoding::encode(facebook_id)
        );
        match self
            .http
            .delete(url)
            .query(&[("access_token", identity.access_token.as_str())])
            .send()
            .await
        {
            Ok(resp) => {
                info!(user_id = identity.user_id, http_status = %resp.status(), "Requested Facebook permission revoke");
            }
            Err(e) => {
                warn!(error = %e, user_id = identity.user_id, "Facebook permission revoke failed");
            }
        }
        Ok(())
    }
}
