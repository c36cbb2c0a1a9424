// src/app.rs
//! Router composition shared by the binary and the router-level tests

use axum::{extract::Extension, middleware, Router};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, MemoryStore, SessionManagerLayer};

use crate::auth;
use crate::catalog;
use crate::common::AppState;
use crate::session_lock_middleware::{serialize_session_requests, SessionLocks};

pub const SESSION_COOKIE_NAME: &str = "catalog_session";

pub fn build_router(shared: Arc<RwLock<AppState>>, cookie_secure: bool) -> Router {
    let routes = Router::new()
        // ====================================================================
        // AUTHENTICATION ROUTES
        // ====================================================================
        .merge(auth::auth_routes())
        // ====================================================================
        // CATALOG ROUTES (Pages, JSON and the item API)
        // ====================================================================
        .merge(catalog::catalog_routes())
        .layer(Extension(shared));

    with_session_layers(routes, cookie_secure).layer(TraceLayer::new_for_http())
}

/// Cookie sessions, with every request for one session serialized around the
/// session layer (including the layer's save after the handler returns).
pub fn with_session_layers(routes: Router, cookie_secure: bool) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(cookie_secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true);

    routes
        .layer(session_layer)
        .layer(middleware::from_fn(serialize_session_requests))
        .layer(Extension(SessionLocks::new()))
}
