use super::models::{Category, Item, ItemFields};
use crate::common::ApiError;
use sqlx::SqlitePool;
use tracing::info;

/// Item and category persistence.
///
/// Mutations here do no authorization of their own; handlers call them only after
/// the guard chain has cleared the request.
pub struct CatalogService {
    db: SqlitePool,
}

impl CatalogService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    // ============================================================================
    // Categories
    // ============================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name ASC")
                .fetch_all(&self.db)
                .await
                .map_err(ApiError::DatabaseError)?;

        Ok(categories)
    }

    pub async fn get_category(&self, category_id: i64) -> Result<Option<Category>, ApiError> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Fail with a validation error when the category does not exist
    pub async fn ensure_category(&self, category_id: i64) -> Result<Category, ApiError> {
        self.get_category(category_id)
            .await?
            .ok_or_else(|| ApiError::ValidationError("Unknown category.".to_string()))
    }

    // ============================================================================
    // Items
    // ============================================================================

    pub async fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, category_id, user_id
            FROM items
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(items)
    }

    pub async fn list_items_in_category(&self, category_id: i64) -> Result<Vec<Item>, ApiError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, category_id, user_id
            FROM items
            WHERE category_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(items)
    }

    pub async fn get_item(&self, item_id: i64) -> Result<Option<Item>, ApiError> {
        sqlx::query_as::<_, Item>(
            "SELECT id, name, description, category_id, user_id FROM items WHERE id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)
    }

    pub async fn create_item(&self, fields: &ItemFields, owner_id: i64) -> Result<Item, ApiError> {
        let id = sqlx::query(
            "INSERT INTO items (name, description, category_id, user_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.category_id)
        .bind(owner_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .last_insert_rowid();

        info!(item_id = id, user_id = owner_id, "Item created");
        Ok(Item {
            id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            category_id: fields.category_id,
            user_id: owner_id,
        })
    }

    /// Update the editable fields. The owner column is never touched.
    pub async fn update_item(&self, item_id: i64, fields: &ItemFields) -> Result<Item, ApiError> {
        let result = sqlx::query(
            "UPDATE items SET name = ?, description = ?, category_id = ? WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.category_id)
        .bind(item_id)
        .execute(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Item".to_string()));
        }

        info!(item_id, "Item updated");
        self.get_item(item_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Item".to_string()))
    }

    pub async fn delete_item(&self, item_id: i64) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Item".to_string()));
        }

        info!(item_id, "Item deleted");
        Ok(())
    }
}
