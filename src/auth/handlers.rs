//! Authentication handlers

use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_sessions::Session;
use tracing::{debug, info, warn};

use super::disconnect::disconnect;
use super::extractors::AuthedUser;
use super::models::{CallbackQuery, Provider};
use super::providers::ProfileFetch;
use super::reconciler::reconcile;
use super::session::{self, SessionIdentity};
use super::state_token::{issue_state, validate_state};
use super::user_store::UserStore;
use crate::common::{flash, ApiError, AppState, PageError};
use crate::pages;

/// Result of a provider callback that did not fail
#[derive(Debug)]
pub enum ConnectOutcome {
    Connected(SessionIdentity),
    AlreadyConnected,
}

/// GET /login
/// Issues a fresh anti-forgery state token and renders the login page
pub async fn show_login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
) -> Result<Html<String>, PageError> {
    let state = state_lock.read().await.clone();

    let mut login = session::load(&session).await?;
    let token = issue_state(&mut login);
    session::persist(&session, &login).await?;
    debug!(
        authenticated = login.is_authenticated(),
        user_id = ?login.user_id(),
        provider = ?login.provider(),
        "Issued login state token"
    );

    let messages = flash::take(&session).await?;
    Ok(pages::login_page(
        &token,
        &state.providers,
        login.identity.as_ref(),
        &messages,
    )?)
}

/// POST /fbconnect?state=...
/// Body: the short-lived access token from the Facebook JavaScript SDK
pub async fn facebook_connect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Query(query): Query<CallbackQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    let outcome = connect(&state, &session, Provider::Facebook, query.state.as_deref(), &body).await?;
    connect_response(outcome)
}

/// POST /gconnect?state=...
/// Body: the one-time authorization code from the Google JavaScript client
pub async fn google_connect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Query(query): Query<CallbackQuery>,
    body: String,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    let outcome = connect(&state, &session, Provider::Google, query.state.as_deref(), &body).await?;
    connect_response(outcome)
}

/// The provider-independent login handshake.
///
/// State validation runs before anything else, including the provider lookup. A
/// validated token is consumed straight away, so any later failure means starting
/// again from `/login`. The identity is written in one step only after every
/// provider and store call has succeeded.
pub async fn connect(
    state: &AppState,
    session: &Session,
    provider: Provider,
    presented_state: Option<&str>,
    raw_artifact: &str,
) -> Result<ConnectOutcome, ApiError> {
    let mut login = session::load(session).await?;

    if let Err(e) = validate_state(&login, presented_state) {
        warn!(provider = %provider, "Rejected login callback with invalid state");
        return Err(e);
    }
    login.state = None;
    session::persist(session, &login).await?;

    let client = state.providers.require(provider)?;
    let artifact = raw_artifact.trim();
    if artifact.is_empty() {
        return Err(ApiError::BadRequest("missing authorization artifact".to_string()));
    }

    let grant = client.exchange_artifact(artifact).await?;
    let profile = match client.fetch_profile(&grant, login.identity.as_ref()).await? {
        ProfileFetch::AlreadyConnected => return Ok(ConnectOutcome::AlreadyConnected),
        ProfileFetch::Verified(profile) => profile,
    };

    let users = UserStore::new(state.db.clone());
    let (user_id, next) = reconcile(&users, &profile, provider).await?;
    // The flash goes out in the same save as the identity
    flash::push(session, format!("Now logged in as {}", profile.name)).await?;
    session::persist(session, &next).await?;

    info!(user_id, provider = %provider, "Login completed");
    next.identity
        .map(ConnectOutcome::Connected)
        .ok_or_else(|| ApiError::InternalServer("reconciled session has no identity".to_string()))
}

fn connect_response(outcome: ConnectOutcome) -> Result<Response, ApiError> {
    match outcome {
        ConnectOutcome::Connected(identity) => {
            Ok(pages::welcome_fragment(&identity.username, &identity.picture)?.into_response())
        }
        ConnectOutcome::AlreadyConnected => Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Current user is already connected." })),
        )
            .into_response()),
    }
}

/// GET /disconnect
/// Logs out regardless of provider and redirects to the catalog home
pub async fn disconnect_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    session: Session,
) -> Result<Redirect, PageError> {
    let state = state_lock.read().await.clone();

    let mut login = session::load(&session).await?;
    let outcome = disconnect(&mut login, &state.providers).await;
    flash::push(&session, outcome.flash_message()).await?;
    session::persist(&session, &login).await?;

    Ok(Redirect::to("/catalog/"))
}

/// GET /api/me
/// Returns the identity held by the current session and its stored account
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let db = state_lock.read().await.db.clone();
    let account = UserStore::new(db)
        .find_by_id(authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;

    let identity = authed.identity;
    Ok(Json(serde_json::json!({
        "user_id": identity.user_id,
        "username": identity.username,
        "email": identity.email,
        "picture": identity.picture,
        "provider": identity.provider(),
        "account": account,
    })))
}
