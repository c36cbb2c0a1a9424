// src/pages.rs
//! Server-rendered HTML for the catalog and login pages
//!
//! Markup lives in `templates/`; askama escapes every interpolated value.

use askama::Template;
use axum::response::Html;
use tracing::error;

use crate::auth::models::Provider;
use crate::auth::providers::ProviderRegistry;
use crate::auth::session::SessionIdentity;
use crate::catalog::models::{Category, Item};
use crate::common::ApiError;

pub fn render<T: Template>(template: &T) -> Result<Html<String>, ApiError> {
    template.render().map(Html).map_err(|e| {
        error!(error = %e, "Template rendering failed");
        ApiError::InternalServer("page could not be rendered".to_string())
    })
}

#[derive(Template)]
#[template(path = "login.html")]
struct LoginPage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    state: &'a str,
    google_client_id: Option<&'a str>,
    facebook_app_id: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeFragment<'a> {
    username: &'a str,
    picture: &'a str,
}

#[derive(Template)]
#[template(path = "catalog.html")]
struct CatalogPage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    categories: &'a [Category],
    items: &'a [Item],
}

#[derive(Template)]
#[template(path = "category.html")]
struct CategoryPage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    category: &'a Category,
    categories: &'a [Category],
    items: &'a [Item],
}

#[derive(Template)]
#[template(path = "item.html")]
struct ItemPage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    item: &'a Item,
    category: Option<&'a Category>,
    is_owner: bool,
}

struct CategoryOption<'a> {
    id: i64,
    name: &'a str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "item_form.html")]
struct ItemFormPage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    heading: &'a str,
    /// Set when editing; the form then posts back to the item's edit route
    item_id: Option<i64>,
    name: &'a str,
    description: &'a str,
    options: Vec<CategoryOption<'a>>,
}

#[derive(Template)]
#[template(path = "delete.html")]
struct DeletePage<'a> {
    identity: Option<&'a SessionIdentity>,
    messages: &'a [String],
    item: &'a Item,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage<'a> {
    pub message: &'a str,
}

/// Login page. Only configured providers get a button, and only their public
/// client ids are published.
pub fn login_page(
    state_token: &str,
    providers: &ProviderRegistry,
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    let google = providers.public_client_id(Provider::Google);
    let facebook = providers.public_client_id(Provider::Facebook);

    render(&LoginPage {
        identity,
        messages,
        state: state_token,
        google_client_id: google.as_deref(),
        facebook_app_id: facebook.as_deref(),
    })
}

/// Fragment returned to the login page's script after a successful callback
pub fn welcome_fragment(username: &str, picture: &str) -> Result<Html<String>, ApiError> {
    render(&WelcomeFragment { username, picture })
}

pub fn catalog_page(
    categories: &[Category],
    items: &[Item],
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    render(&CatalogPage {
        identity,
        messages,
        categories,
        items,
    })
}

pub fn category_page(
    category: &Category,
    categories: &[Category],
    items: &[Item],
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    render(&CategoryPage {
        identity,
        messages,
        category,
        categories,
        items,
    })
}

pub fn item_page(
    item: &Item,
    category: Option<&Category>,
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    render(&ItemPage {
        identity,
        messages,
        item,
        category,
        is_owner: identity.is_some_and(|id| id.user_id == item.user_id),
    })
}

/// Create/edit form. `item` pre-fills the fields when editing.
pub fn item_form_page(
    heading: &str,
    item: Option<&Item>,
    categories: &[Category],
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    let options = categories
        .iter()
        .map(|c| CategoryOption {
            id: c.id,
            name: &c.name,
            selected: item.map(|i| i.category_id) == Some(c.id),
        })
        .collect();

    render(&ItemFormPage {
        identity,
        messages,
        heading,
        item_id: item.map(|i| i.id),
        name: item.map(|i| i.name.as_str()).unwrap_or_default(),
        description: item.map(|i| i.description.as_str()).unwrap_or_default(),
        options,
    })
}

pub fn delete_page(
    item: &Item,
    identity: Option<&SessionIdentity>,
    messages: &[String],
) -> Result<Html<String>, ApiError> {
    render(&DeletePage {
        identity,
        messages,
        item,
    })
}
