// src/session_lock_middleware.rs
//! Middleware that runs requests for the same browser session one at a time
//!
//! It sits outside `SessionManagerLayer`, so the layer's end-of-request save of a
//! modified session happens while the lock is still held. Without that, a page
//! load that read the session before a concurrent `/disconnect` would write the
//! old identity back.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tower_sessions::cookie::Cookie;
use tracing::debug;

use crate::app::SESSION_COOKIE_NAME;

/// One mutex per session cookie value
#[derive(Clone, Default)]
pub struct SessionLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            // Drop entries nobody is holding or waiting on
            map.retain(|_, m| Arc::strong_count(m) > 1);
            map.entry(key.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Value of the session cookie presented with the request, if any
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Session serialization middleware.
///
/// Requests without a session cookie get a brand new session and cannot race
/// anyone, so they run unlocked.
pub async fn serialize_session_requests(
    Extension(locks): Extension<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = session_cookie(request.headers()) else {
        return next.run(request).await;
    };

    let _guard = locks.acquire(&key).await;
    debug!(path = %request.uri().path(), "Session lock acquired");
    next.run(request).await
}
