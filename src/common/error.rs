// Error handling types for the catalog service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use crate::pages::{render, ErrorPage};

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Presented anti-forgery state did not match the session's token
    StateMismatch,
    /// Provider refused the code or client token
    ExchangeFailed(String),
    AudienceMismatch,
    IdentityMismatch,
    /// Provider answered, but reported a token error
    ProviderFailure(String),
    /// Provider could not be reached or answered garbage
    ProviderUnavailable(String),
    ProviderNotConfigured(String),
    NotAuthenticated,
    NotOwner,
    NotFound(String),
    BadRequest(String),
    ValidationError(String),
    Session(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::StateMismatch => write!(f, "Invalid state parameter."),
            ApiError::ExchangeFailed(msg) => {
                write!(f, "Failed to upgrade the authorization code: {}", msg)
            }
            ApiError::AudienceMismatch => write!(f, "Token's client ID does not match app's."),
            ApiError::IdentityMismatch => {
                write!(f, "Token's user ID doesn't match given user ID.")
            }
            ApiError::ProviderFailure(msg) => write!(f, "Provider token error: {}", msg),
            ApiError::ProviderUnavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            ApiError::ProviderNotConfigured(name) => {
                write!(f, "Provider {} is not configured", name)
            }
            ApiError::NotAuthenticated => {
                write!(f, "You must be logged in to perform that action.")
            }
            ApiError::NotOwner => write!(
                f,
                "You are not authorized to modify this item. Please create your own items in order to change them."
            ),
            ApiError::NotFound(what) => write!(f, "{} not found", what),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "{}", msg),
            ApiError::Session(msg) => write!(f, "Session error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::StateMismatch => (StatusCode::UNAUTHORIZED, "STATE_MISMATCH"),
            ApiError::ExchangeFailed(_) => (StatusCode::UNAUTHORIZED, "EXCHANGE_FAILED"),
            ApiError::AudienceMismatch => (StatusCode::UNAUTHORIZED, "AUDIENCE_MISMATCH"),
            ApiError::IdentityMismatch => (StatusCode::UNAUTHORIZED, "IDENTITY_MISMATCH"),
            ApiError::ProviderFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PROVIDER_TOKEN_ERROR")
            }
            ApiError::ProviderUnavailable(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_UNAVAILABLE"),
            ApiError::ProviderNotConfigured(_) => {
                (StatusCode::NOT_FOUND, "PROVIDER_NOT_CONFIGURED")
            }
            ApiError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            ApiError::NotOwner => (StatusCode::FORBIDDEN, "NOT_OWNER"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Session(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SESSION_ERROR"),
            ApiError::InternalServer(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
            }
            ApiError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }

    /// Message safe to show a browser; store and session internals stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                "Database operation failed".to_string()
            }
            ApiError::Session(msg) => {
                error!(error = %msg, "Session store error occurred");
                "Session could not be updated".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(e: tower_sessions::session::Error) -> Self {
        ApiError::Session(e.to_string())
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let error_response = ErrorResponse {
            message: self.public_message(),
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Error rendered for browser page routes.
///
/// `NotAuthenticated` turns into a redirect to the login page; everything else
/// becomes a small HTML error page with the matching status.
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl From<ApiError> for PageError {
    fn from(e: ApiError) -> Self {
        PageError(e)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(e: sqlx::Error) -> Self {
        PageError(ApiError::DatabaseError(e))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        if matches!(self.0, ApiError::NotAuthenticated) {
            return Redirect::to("/login").into_response();
        }

        let (status, _) = self.0.status_and_code();
        let message = self.0.public_message();
        match render(&ErrorPage { message: &message }) {
            Ok(page) => (status, page).into_response(),
            Err(_) => status.into_response(),
        }
    }
}
