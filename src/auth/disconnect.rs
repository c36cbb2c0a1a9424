//! Logout: revoke the provider token, then drop every identity field

use tracing::{info, warn};

use super::models::Provider;
use super::providers::ProviderRegistry;
use super::session::LoginSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    LoggedOut { provider: Provider, revoked: bool },
    NotLoggedIn,
}

impl DisconnectOutcome {
    pub fn flash_message(&self) -> &'static str {
        match self {
            DisconnectOutcome::LoggedOut { revoked: true, .. } => {
                "You have successfully been logged out."
            }
            DisconnectOutcome::LoggedOut { revoked: false, .. } => {
                "Logged out, but the provider token could not be revoked."
            }
            DisconnectOutcome::NotLoggedIn => "You were not logged in",
        }
    }
}

/// Revoke the session's provider token and clear the identity in place.
///
/// The identity is cleared whichever branch ran and whether or not the revoke
/// succeeded. A provider that is no longer configured cannot be called, so its
/// token is only forgotten.
pub async fn disconnect(login: &mut LoginSession, providers: &ProviderRegistry) -> DisconnectOutcome {
    let Some(identity) = login.identity.take() else {
        return DisconnectOutcome::NotLoggedIn;
    };
    let provider = identity.provider();

    let revoked = match providers.get(provider) {
        Some(client) => match client.revoke(&identity).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    user_id = identity.user_id,
                    subject = identity.subject.id(),
                    provider = %provider,
                    "Token revoke failed"
                );
                false
            }
        },
        None => {
            warn!(provider = %provider, "Provider no longer configured, skipping revoke");
            false
        }
    };

    info!(user_id = identity.user_id, provider = %provider, revoked, "User disconnected");
    DisconnectOutcome::LoggedOut { provider, revoked }
}
