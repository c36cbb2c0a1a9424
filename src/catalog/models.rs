//! Catalog data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Owned;

#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Catalog item. `user_id` is the owner, fixed at creation.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub user_id: i64,
}

impl Owned for Item {
    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

/// Browser form for creating or editing an item
#[derive(Deserialize, Debug, Default)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// JSON body for the item API
#[derive(Deserialize, Debug)]
pub struct ItemRequest {
    pub name: String,
    pub description: String,
    pub category_id: i64,
}

/// Validated item fields, ready for the store
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFields {
    pub name: String,
    pub description: String,
    pub category_id: i64,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
