use super::handlers;
use axum::{
    routing::{get, post, put},
    Router,
};

/// Creates the catalog router: public pages, owner-guarded forms and JSON endpoints
pub fn catalog_routes() -> Router {
    Router::new()
        // Public pages
        .route("/", get(handlers::show_catalog))
        .route("/catalog/", get(handlers::show_catalog))
        .route("/category/:category_id/", get(handlers::category_summary))
        .route("/item/:item_id/", get(handlers::item_details))
        // Guarded pages
        .route(
            "/item/new/",
            get(handlers::new_item_form).post(handlers::create_item),
        )
        .route(
            "/item/:item_id/edit/",
            get(handlers::edit_item_form).post(handlers::update_item),
        )
        .route(
            "/item/:item_id/delete/",
            get(handlers::delete_item_form).post(handlers::delete_item),
        )
        // Public JSON
        .route("/item/:item_id/JSON", get(handlers::item_json))
        .route("/JSON", get(handlers::all_items_json))
        .route("/catalog/JSON", get(handlers::all_items_json))
        // Guarded JSON API
        .route("/api/items", post(handlers::create_item_api))
        .route(
            "/api/items/:item_id",
            put(handlers::update_item_api).delete(handlers::delete_item_api),
        )
}
