// src/common/flash.rs
//! One-shot messages carried in the session until the next page render

use tower_sessions::Session;

use super::error::ApiError;

const FLASH_SESSION_KEY: &str = "_flash_messages";

/// Queue a message for the next rendered page.
pub async fn push(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    let mut messages: Vec<String> = session.get(FLASH_SESSION_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_SESSION_KEY, messages).await?;
    Ok(())
}

/// Remove and return every queued message.
pub async fn take(session: &Session) -> Result<Vec<String>, ApiError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_SESSION_KEY)
        .await?
        .unwrap_or_default())
}
