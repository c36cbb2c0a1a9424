// Application state shared across all modules

use sqlx::SqlitePool;

use crate::auth::providers::ProviderRegistry;

/// Application state containing database pool and identity providers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub providers: ProviderRegistry,
}
