//! Authorization guard: authentication extractors and the ownership gate
//!
//! Mutating routes compose three steps: the extractor (authentication, no store
//! access), the resource fetch, then [`require_owner`].

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::{debug, warn};

use super::session::{self, SessionIdentity};
use crate::common::{flash, ApiError, PageError};

/// Authenticated user for JSON routes; rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: i64,
    pub identity: SessionIdentity,
}

/// Authenticated user for page routes; rejects with a redirect to `/login`.
#[derive(Debug, Clone)]
pub struct PageUser(pub AuthedUser);

/// Authentication gate over an already-loaded session record.
pub fn require_authenticated(identity: Option<SessionIdentity>) -> Result<AuthedUser, ApiError> {
    match identity {
        Some(identity) => Ok(AuthedUser {
            id: identity.user_id,
            identity,
        }),
        None => Err(ApiError::NotAuthenticated),
    }
}

/// Resources that record the user who created them
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Ownership gate. A missing resource is `NotFound` before ownership is considered.
pub fn require_owner<T: Owned>(
    user: &AuthedUser,
    resource: Option<T>,
    what: &str,
) -> Result<T, ApiError> {
    let resource = resource.ok_or_else(|| ApiError::NotFound(what.to_string()))?;
    if resource.owner_id() != user.id {
        warn!(
            user_id = user.id,
            owner_id = resource.owner_id(),
            resource = what,
            "Ownership check failed"
        );
        return Err(ApiError::NotOwner);
    }
    Ok(resource)
}

async fn session_from_parts<S: Send + Sync>(
    parts: &mut Parts,
    state: &S,
) -> Result<Session, ApiError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::Session(msg.to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let login = session::load(&session).await?;

        let user = require_authenticated(login.identity).map_err(|e| {
            debug!(path = %parts.uri.path(), "Rejected unauthenticated request");
            e
        })?;
        debug!(user_id = user.id, provider = %user.identity.provider(), "Session authenticated");
        Ok(user)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PageUser
where
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let login = session::load(&session).await?;

        match require_authenticated(login.identity) {
            Ok(user) => Ok(PageUser(user)),
            Err(e) => {
                flash::push(&session, "You must be logged in to perform that action.").await?;
                Err(PageError(e))
            }
        }
    }
}
