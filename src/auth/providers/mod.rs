//! Identity provider clients
//!
//! Each provider turns the artifact the browser obtained (a code or a client-side
//! token) into a verified profile, and can later revoke the token it issued.

pub mod facebook;
pub mod google;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use super::models::{Provider, ProviderGrant, ProviderProfile};
use super::session::SessionIdentity;
use crate::common::{ApiError, AppConfig};

pub use facebook::FacebookProvider;
pub use google::GoogleProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the authorization artifact: {0}")]
    Exchange(String),

    #[error("token introspection reported an error: {0}")]
    TokenInfo(String),

    #[error("token subject does not match the introspected subject")]
    IdentityMismatch,

    #[error("token was issued to a different client")]
    AudienceMismatch,

    #[error("unexpected provider response: {0}")]
    Malformed(String),

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token revocation failed with status {0}")]
    Revoke(u16),
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Exchange(msg) => ApiError::ExchangeFailed(msg),
            ProviderError::TokenInfo(msg) => ApiError::ProviderFailure(msg),
            ProviderError::IdentityMismatch => ApiError::IdentityMismatch,
            ProviderError::AudienceMismatch => ApiError::AudienceMismatch,
            ProviderError::Malformed(msg) => ApiError::ProviderUnavailable(msg),
            ProviderError::Request(e) => ApiError::ProviderUnavailable(e.to_string()),
            ProviderError::Revoke(status) => {
                ApiError::ProviderUnavailable(format!("revoke returned status {}", status))
            }
        }
    }
}

/// Outcome of profile verification
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileFetch {
    Verified(ProviderProfile),
    /// The session already holds a token for this very subject
    AlreadyConnected,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Public client id the browser SDK is initialised with. Never the secret.
    fn client_id(&self) -> &str;

    /// Upgrade the browser-supplied artifact into a usable access token.
    async fn exchange_artifact(&self, raw_artifact: &str) -> Result<ProviderGrant, ProviderError>;

    /// Verify the grant and load the user's profile.
    ///
    /// `current` is the identity already stored in the session, if any.
    async fn fetch_profile(
        &self,
        grant: &ProviderGrant,
        current: Option<&SessionIdentity>,
    ) -> Result<ProfileFetch, ProviderError>;

    /// Revoke the session's provider token.
    async fn revoke(&self, identity: &SessionIdentity) -> Result<(), ProviderError>;
}

/// Registry of configured identity providers
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider that has credentials in `config`.
    pub fn from_config(config: &AppConfig, http: &reqwest::Client) -> Self {
        let mut registry = Self::new();

        match &config.google {
            Some(creds) => registry.register(Arc::new(GoogleProvider::new(
                creds.clone(),
                http.clone(),
            ))),
            None => warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, Google login disabled"),
        }
        match &config.facebook {
            Some(creds) => registry.register(Arc::new(FacebookProvider::new(
                creds.clone(),
                http.clone(),
            ))),
            None => warn!("FACEBOOK_APP_ID/FACEBOOK_APP_SECRET not set, Facebook login disabled"),
        }

        registry
    }

    pub fn register(&mut self, provider: Arc<dyn IdentityProvider>) {
        self.providers.insert(provider.provider(), provider);
    }

    pub fn get(&self, provider: Provider) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(&provider).cloned()
    }

    pub fn require(&self, provider: Provider) -> Result<Arc<dyn IdentityProvider>, ApiError> {
        self.get(provider)
            .ok_or_else(|| ApiError::ProviderNotConfigured(provider.to_string()))
    }

    /// Client id to publish on the login page, if `provider` is configured
    pub fn public_client_id(&self, provider: Provider) -> Option<String> {
        self.providers
            .get(&provider)
            .map(|client| client.client_id().to_string())
    }

    pub fn count(&self) -> usize {
        self.providers.len()
    }
}

/// Pull a required string field out of a provider JSON body.
pub(crate) fn required_str(body: &serde_json::Value, field: &str) -> Result<String, ProviderError> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Malformed(format!("response missing `{}`", field)))
}
