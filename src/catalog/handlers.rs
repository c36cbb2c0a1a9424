use super::models::{ItemForm, ItemRequest, MessageResponse};
use super::services::CatalogService;
use super::validators::{validate_item_form, validate_item_request};
use crate::auth::session::{self, SessionIdentity};
use crate::auth::{require_owner, AuthedUser, PageUser};
use crate::common::{flash, ApiError, ApiJson, AppState, PageError};
use crate::pages;
use axum::{
    extract::{Extension, Form, Path},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_sessions::Session;

/// Identity (if any) and pending flash messages for rendering a page
async fn page_context(session: &Session) -> Result<(Option<SessionIdentity>, Vec<String>), ApiError> {
    let login = session::load(session).await?;
    let messages = flash::take(session).await?;
    Ok((login.identity, messages))
}

async fn catalog_service(state: &Arc<RwLock<AppState>>) -> CatalogService {
    CatalogService::new(state.read().await.db.clone())
}

// ============================================================================
// Public pages
// ============================================================================

/// GET / and GET /catalog/ - All categories and items
pub async fn show_catalog(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    session: Session,
) -> Result<Html<String>, PageError> {
    let catalog = catalog_service(&state).await;
    let categories = catalog.list_categories().await?;
    let items = catalog.list_items().await?;
    let (identity, messages) = page_context(&session).await?;

    Ok(pages::catalog_page(
        &categories,
        &items,
        identity.as_ref(),
        &messages,
    )?)
}

/// GET /category/:category_id/ - Items in one category
pub async fn category_summary(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(category_id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let catalog = catalog_service(&state).await;
    let category = catalog
        .get_category(category_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category".to_string()))?;
    let categories = catalog.list_categories().await?;
    let items = catalog.list_items_in_category(category_id).await?;
    let (identity, messages) = page_context(&session).await?;

    Ok(pages::category_page(
        &category,
        &categories,
        &items,
        identity.as_ref(),
        &messages,
    )?)
}

/// GET /item/:item_id/ - Item details
pub async fn item_details(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    session: Session,
    Path(item_id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let catalog = catalog_service(&state).await;
    let item = catalog
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item".to_string()))?;
    let category = catalog.get_category(item.category_id).await?;
    let (identity, messages) = page_context(&session).await?;

    Ok(pages::item_page(
        &item,
        category.as_ref(),
        identity.as_ref(),
        &messages,
    )?)
}

// ============================================================================
// Guarded pages
// ============================================================================

/// GET /item/new/
pub async fn new_item_form(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
) -> Result<Html<String>, PageError> {
    let categories = catalog_service(&state).await.list_categories().await?;
    let messages = flash::take(&session).await?;

    Ok(pages::item_form_page(
        "New Item",
        None,
        &categories,
        Some(&user.identity),
        &messages,
    )?)
}

/// POST /item/new/
pub async fn create_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, PageError> {
    let catalog = catalog_service(&state).await;

    let fields = match validate_item_form(&form) {
        Ok(fields) => fields,
        Err(e) => return form_rejected(&session, e, "/item/new/").await,
    };
    if let Err(e) = catalog.ensure_category(fields.category_id).await {
        return form_rejected(&session, e, "/item/new/").await;
    }

    catalog.create_item(&fields, user.id).await?;
    flash::push(&session, "New Item Successfully Created").await?;
    Ok(Redirect::to("/catalog/"))
}

/// GET /item/:item_id/edit/
pub async fn edit_item_form(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
    Path(item_id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;
    let categories = catalog.list_categories().await?;
    let messages = flash::take(&session).await?;

    Ok(pages::item_form_page(
        "Edit Item",
        Some(&item),
        &categories,
        Some(&user.identity),
        &messages,
    )?)
}

/// POST /item/:item_id/edit/
pub async fn update_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
    Path(item_id): Path<i64>,
    Form(form): Form<ItemForm>,
) -> Result<Redirect, PageError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;
    let back = format!("/item/{}/edit/", item.id);

    let fields = match validate_item_form(&form) {
        Ok(fields) => fields,
        Err(e) => return form_rejected(&session, e, &back).await,
    };
    if let Err(e) = catalog.ensure_category(fields.category_id).await {
        return form_rejected(&session, e, &back).await;
    }

    catalog.update_item(item.id, &fields).await?;
    flash::push(&session, "Item Successfully Edited").await?;
    Ok(Redirect::to(&format!("/item/{}/", item.id)))
}

/// GET /item/:item_id/delete/
pub async fn delete_item_form(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
    Path(item_id): Path<i64>,
) -> Result<Html<String>, PageError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;
    let messages = flash::take(&session).await?;

    Ok(pages::delete_page(&item, Some(&user.identity), &messages)?)
}

/// POST /item/:item_id/delete/
pub async fn delete_item(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    PageUser(user): PageUser,
    session: Session,
    Path(item_id): Path<i64>,
) -> Result<Redirect, PageError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;

    catalog.delete_item(item.id).await?;
    flash::push(&session, "Item Successfully Deleted").await?;
    Ok(Redirect::to("/catalog/"))
}

/// Validation failures on page forms flash the message and send the user back.
async fn form_rejected(session: &Session, error: ApiError, back: &str) -> Result<Redirect, PageError> {
    match error {
        ApiError::ValidationError(msg) => {
            flash::push(session, msg).await?;
            Ok(Redirect::to(back))
        }
        other => Err(PageError(other)),
    }
}

// ============================================================================
// JSON endpoints
// ============================================================================

/// GET /item/:item_id/JSON
pub async fn item_json(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    Path(item_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let item = catalog_service(&state)
        .await
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item".to_string()))?;

    Ok(Json(serde_json::json!({ "Item_Details": item })))
}

/// GET /JSON and GET /catalog/JSON
pub async fn all_items_json(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = catalog_service(&state).await.list_items().await?;
    Ok(Json(serde_json::json!({ "Item_List": items })))
}

/// POST /api/items
pub async fn create_item_api(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    ApiJson(request): ApiJson<ItemRequest>,
) -> Result<Response, ApiError> {
    let catalog = catalog_service(&state).await;
    let fields = validate_item_request(&request)?;
    catalog.ensure_category(fields.category_id).await?;

    let item = catalog.create_item(&fields, user.id).await?;
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

/// PUT /api/items/:item_id
pub async fn update_item_api(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(item_id): Path<i64>,
    ApiJson(request): ApiJson<ItemRequest>,
) -> Result<Response, ApiError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;
    let fields = validate_item_request(&request)?;
    catalog.ensure_category(fields.category_id).await?;

    let updated = catalog.update_item(item.id, &fields).await?;
    Ok(Json(updated).into_response())
}

/// DELETE /api/items/:item_id
pub async fn delete_item_api(
    Extension(state): Extension<Arc<RwLock<AppState>>>,
    user: AuthedUser,
    Path(item_id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let catalog = catalog_service(&state).await;
    let item = require_owner(&user, catalog.get_item(item_id).await?, "Item")?;

    catalog.delete_item(item.id).await?;
    Ok(Json(MessageResponse {
        message: "Item Successfully Deleted".to_string(),
    }))
}
