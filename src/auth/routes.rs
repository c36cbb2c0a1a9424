//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /login` - Login page with a fresh anti-forgery state token
/// - `POST /fbconnect` - Facebook login callback
/// - `POST /gconnect` - Google login callback
/// - `GET /disconnect` - Logout for either provider
/// - `GET /api/me` - Current session identity
pub fn auth_routes() -> Router {
    Router::new()
        .route("/login", get(handlers::show_login))
        .route("/fbconnect", post(handlers::facebook_connect))
        .route("/gconnect", post(handlers::google_connect))
        .route("/disconnect", get(handlers::disconnect_handler))
        .route("/api/me", get(handlers::me_handler))
}
