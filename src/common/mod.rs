// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod extractors;
pub mod flash;
pub mod helpers;
pub mod migrations;
pub mod state;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use error::{ApiError, PageError};
pub use extractors::ApiJson;
pub use helpers::{safe_email_log, safe_token_log};
pub use state::AppState;
