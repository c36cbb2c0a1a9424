// src/test_support.rs
//! Shared fixtures for router-level tests: in-memory store, stand-in identity
//! provider servers and a cookie-carrying client.

use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query},
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::Client;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::app::{build_router, SESSION_COOKIE_NAME};
use crate::auth::providers::facebook::{FacebookEndpoints, FacebookProvider};
use crate::auth::providers::google::{GoogleEndpoints, GoogleProvider};
use crate::auth::providers::ProviderRegistry;
use crate::common::config::OAuthClientConfig;
use crate::common::migrations::run_migrations;
use crate::common::AppState;

pub const GOOGLE_CLIENT_ID: &str = "catalog-test.apps.googleusercontent.com";
pub const FACEBOOK_APP_ID: &str = "fb-app-123";

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool, false).await.unwrap();
    pool
}

pub fn google_credentials() -> OAuthClientConfig {
    OAuthClientConfig {
        client_id: GOOGLE_CLIENT_ID.to_string(),
        client_secret: "google-secret".to_string(),
    }
}

pub fn facebook_credentials() -> OAuthClientConfig {
    OAuthClientConfig {
        client_id: FACEBOOK_APP_ID.to_string(),
        client_secret: "fb-secret".to_string(),
    }
}

pub fn test_state(db: SqlitePool, providers: ProviderRegistry) -> AppState {
    AppState { db, providers }
}

fn test_http() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn fake_id_token(subject: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#),
        URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": subject }).to_string())
    )
}

// ============================================================================
// Google stand-in
// ============================================================================

/// What the stand-in Google endpoints answer with
#[derive(Clone)]
pub struct GoogleScript {
    /// `sub` claim placed in the exchanged id token
    pub id_token_subject: String,
    pub tokeninfo: serde_json::Value,
    pub userinfo: serde_json::Value,
    pub token_status: StatusCode,
    pub revoke_status: StatusCode,
}

impl GoogleScript {
    /// A consistent, successful sign-in for `subject`
    pub fn signs_in(subject: &str, name: &str, email: &str) -> Self {
        Self {
            id_token_subject: subject.to_string(),
            tokeninfo: serde_json::json!({
                "user_id": subject,
                "issued_to": GOOGLE_CLIENT_ID,
            }),
            userinfo: serde_json::json!({
                "name": name,
                "email": email,
                "picture": format!("https://img.example.com/{}.png", subject),
            }),
            token_status: StatusCode::OK,
            revoke_status: StatusCode::OK,
        }
    }
}

pub struct GoogleStandIn {
    pub endpoints: GoogleEndpoints,
    pub script: Arc<std::sync::Mutex<GoogleScript>>,
    pub revoked_tokens: Arc<std::sync::Mutex<Vec<String>>>,
    pub userinfo_calls: Arc<AtomicUsize>,
}

impl GoogleStandIn {
    pub async fn start(script: GoogleScript) -> Self {
        let script = Arc::new(std::sync::Mutex::new(script));
        let revoked_tokens = Arc::new(std::sync::Mutex::new(Vec::new()));
        let userinfo_calls = Arc::new(AtomicUsize::new(0));

        let token_script = script.clone();
        let tokeninfo_script = script.clone();
        let userinfo_script = script.clone();
        let revoke_script = script.clone();
        let revoked = revoked_tokens.clone();
        let userinfos = userinfo_calls.clone();

        let router = Router::new()
            .route(
                "/token",
                post(move || {
                    let script = token_script.lock().unwrap().clone();
                    async move {
                        if script.token_status != StatusCode::OK {
                            return (script.token_status, "invalid_grant").into_response();
                        }
                        Json(serde_json::json!({
                            "access_token": format!("access-{}", script.id_token_subject),
                            "id_token": fake_id_token(&script.id_token_subject),
                            "token_type": "Bearer",
                        }))
                        .into_response()
                    }
                }),
            )
            .route(
                "/tokeninfo",
                get(move || {
                    let body = tokeninfo_script.lock().unwrap().tokeninfo.clone();
                    async move { Json(body) }
                }),
            )
            .route(
                "/userinfo",
                get(move || {
                    let body = userinfo_script.lock().unwrap().userinfo.clone();
                    userinfos.fetch_add(1, Ordering::SeqCst);
                    async move { Json(body) }
                }),
            )
            .route(
                "/revoke",
                get(move |Query(params): Query<HashMap<String, String>>| {
                    let status = revoke_script.lock().unwrap().revoke_status;
                    let token = params.get("token").cloned().unwrap_or_default();
                    assert!(!token.is_empty());
                    revoked.lock().unwrap().push(token);
                    async move { status }
                }),
            );

        let base = serve(router).await;
        Self {
            endpoints: GoogleEndpoints {
                token_url: format!("{}/token", base),
                tokeninfo_url: format!("{}/tokeninfo", base),
                userinfo_url: format!("{}/userinfo", base),
                revoke_url: format!("{}/revoke", base),
            },
            script,
            revoked_tokens,
            userinfo_calls,
        }
    }

    /// Answer later requests as a different account
    pub fn rescript(&self, script: GoogleScript) {
        *self.script.lock().unwrap() = script;
    }

    pub fn provider(&self) -> Arc<GoogleProvider> {
        Arc::new(GoogleProvider::with_endpoints(
            google_credentials(),
            self.endpoints.clone(),
            test_http(),
        ))
    }

    pub fn revokes(&self) -> usize {
        self.revoked_tokens.lock().unwrap().len()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked_tokens.lock().unwrap().clone()
    }

    pub fn userinfo_requests(&self) -> usize {
        self.userinfo_calls.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Facebook stand-in
// ============================================================================

pub struct FacebookStandIn {
    pub endpoints: FacebookEndpoints,
    pub revoked_ids: Arc<std::sync::Mutex<Vec<String>>>,
}

impl FacebookStandIn {
    pub async fn start(facebook_id: &str, name: &str, email: &str) -> Self {
        let revoked_ids = Arc::new(std::sync::Mutex::new(Vec::new()));
        let me = serde_json::json!({ "id": facebook_id, "name": name, "email": email });
        let picture = serde_json::json!({
            "data": { "url": format!("https://img.example.com/fb/{}.jpg", facebook_id) }
        });
        let revoked = revoked_ids.clone();

        let router = Router::new()
            .route(
                "/oauth/access_token",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    match params.get("fb_exchange_token") {
                        Some(token) if !token.is_empty() => Json(serde_json::json!({
                            "access_token": format!("long-lived-{}", token),
                            "token_type": "bearer",
                        }))
                        .into_response(),
                        _ => StatusCode::BAD_REQUEST.into_response(),
                    }
                }),
            )
            .route(
                "/v2.10/me",
                get(move || {
                    let body = me.clone();
                    async move { Json(body) }
                }),
            )
            .route(
                "/v2.10/me/picture",
                get(move || {
                    let body = picture.clone();
                    async move { Json(body) }
                }),
            )
            .route(
                "/:facebook_id/permissions",
                delete(move |Path(id): Path<String>| {
                    revoked.lock().unwrap().push(id);
                    async { Json(serde_json::json!({ "success": true })) }
                }),
            );

        let base = serve(router).await;
        Self {
            endpoints: FacebookEndpoints {
                graph_url: base,
                api_version: "v2.10".to_string(),
            },
            revoked_ids,
        }
    }

    pub fn provider(&self) -> Arc<FacebookProvider> {
        Arc::new(FacebookProvider::with_endpoints(
            facebook_credentials(),
            self.endpoints.clone(),
            test_http(),
        ))
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked_ids.lock().unwrap().clone()
    }
}

// ============================================================================
// Browser stand-in
// ============================================================================

/// Drives the full router and carries the session cookie between requests,
/// the way a single browser would.
pub struct TestBrowser {
    app: Router,
    cookie: Option<String>,
}

impl TestBrowser {
    pub fn new(state: AppState) -> Self {
        Self {
            app: build_router(Arc::new(RwLock::new(state)), false),
            cookie: None,
        }
    }

    /// A second browser against the same application, with no cookie yet
    pub fn fresh(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    pub async fn send(
        &mut self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body.into()).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string();
            if pair.starts_with(SESSION_COOKIE_NAME) {
                self.cookie = Some(pair);
            }
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response {
        self.send(Method::GET, uri, None, Body::empty()).await
    }

    pub async fn post_text(&mut self, uri: &str, body: &str) -> Response {
        self.send(
            Method::POST,
            uri,
            Some("application/octet-stream; charset=utf-8"),
            body.to_string(),
        )
        .await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response {
        self.send(
            Method::POST,
            uri,
            Some("application/x-www-form-urlencoded"),
            body.to_string(),
        )
        .await
    }

    pub async fn send_json(
        &mut self,
        method: Method,
        uri: &str,
        body: serde_json::Value,
    ) -> Response {
        self.send(method, uri, Some("application/json"), body.to_string())
            .await
    }

    /// Load the login page and pull the issued state token out of it
    pub async fn begin_login(&mut self) -> String {
        let response = self.get("/login").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        state_token_from(&html)
    }

    /// Complete a provider callback with a freshly issued state token
    pub async fn login(&mut self, callback: &str, artifact: &str) -> Response {
        let token = self.begin_login().await;
        self.post_text(&format!("{}?state={}", callback, token), artifact)
            .await
    }

    /// The identity reported by `/api/me`, or `None` when anonymous
    pub async fn whoami(&mut self) -> Option<serde_json::Value> {
        let response = self.get("/api/me").await;
        match response.status() {
            StatusCode::OK => Some(body_json(response).await),
            StatusCode::UNAUTHORIZED => None,
            other => panic!("unexpected /api/me status {}", other),
        }
    }
}

pub fn state_token_from(html: &str) -> String {
    let start = html.find("var STATE = \"").unwrap() + "var STATE = \"".len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].to_string()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
