// src/common/config.rs
//! Environment-driven configuration for the catalog service

use std::env;

/// Registered OAuth client credentials for one identity provider
#[derive(Debug, Clone)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub google: Option<OAuthClientConfig>,
    pub facebook: Option<OAuthClientConfig>,
    pub session_cookie_secure: bool,
    pub seed_catalog: bool,
    pub reset_db: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://catalog.db".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8000),
            google: client_credentials("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            facebook: client_credentials("FACEBOOK_APP_ID", "FACEBOOK_APP_SECRET"),
            session_cookie_secure: env_flag("SESSION_COOKIE_SECURE"),
            seed_catalog: env_flag("SEED_CATALOG"),
            reset_db: env_flag("RESET_DB"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .unwrap_or_else(|_| "false".to_string())
        .to_lowercase()
        == "true"
}

/// Both halves must be present and non-empty, otherwise the provider stays disabled.
fn client_credentials(id_key: &str, secret_key: &str) -> Option<OAuthClientConfig> {
    let client_id = env::var(id_key).ok().filter(|v| !v.trim().is_empty())?;
    let client_secret = env::var(secret_key).ok().filter(|v| !v.trim().is_empty())?;
    Some(OAuthClientConfig {
        client_id,
        client_secret,
    })
}
