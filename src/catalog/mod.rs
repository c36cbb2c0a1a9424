//! # Catalog Module
//!
//! Categories and items:
//! - Public catalog, category and item pages
//! - Owner-guarded create, edit and delete forms
//! - JSON listings and the item mutation API

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::catalog_routes;
