//! Maps a verified provider profile onto a local user and the login session

use tracing::info;

use super::models::{Provider, ProviderProfile};
use super::session::{LoginSession, SessionIdentity};
use super::user_store::UserStore;
use crate::common::{safe_email_log, ApiError};

/// Find-or-create the user for `profile` and build the authenticated session record.
///
/// Nothing is written to the session here. Callers persist the returned record in
/// one write, so a store failure leaves the stored session exactly as it was.
pub async fn reconcile(
    users: &UserStore,
    profile: &ProviderProfile,
    provider: Provider,
) -> Result<(i64, LoginSession), ApiError> {
    let picture = Some(profile.picture.as_str()).filter(|p| !p.is_empty());
    let user = users
        .find_or_create(&profile.name, &profile.email, picture)
        .await?;

    let next = LoginSession {
        // The handshake is over; the token is not reusable
        state: None,
        identity: Some(SessionIdentity::from_profile(profile, provider, user.id)),
    };

    info!(
        user_id = user.id,
        email = %safe_email_log(&profile.email),
        provider = %provider,
        "Reconciled provider identity with local user"
    );
    Ok((user.id, next))
}
