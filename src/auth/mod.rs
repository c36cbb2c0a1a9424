//! # Auth Module
//!
//! Federated login and access control for the catalog:
//! - Anti-forgery state tokens for the provider handshake
//! - Facebook and Google provider clients
//! - Reconciling provider identities with local users
//! - Typed login session
//! - Authentication extractors and the ownership gate
//! - Logout across providers

pub mod disconnect;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod reconciler;
pub mod routes;
pub mod session;
pub mod state_token;
pub mod user_store;


pub use extractors::{require_owner, AuthedUser, Owned, PageUser};
pub use routes::auth_routes;
