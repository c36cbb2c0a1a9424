//! Item field validation

use super::models::{ItemFields, ItemForm, ItemRequest};
use crate::common::ApiError;

pub const MAX_NAME_LENGTH: usize = 250;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Every field is required; the category must be a numeric id.
///
/// Category existence is checked by the handler against the store.
pub fn validate_item_form(form: &ItemForm) -> Result<ItemFields, ApiError> {
    let category = form.category.trim();
    if form.name.trim().is_empty() || form.description.trim().is_empty() || category.is_empty() {
        return Err(ApiError::ValidationError(
            "All fields must be specified.".to_string(),
        ));
    }
    let category_id = category
        .parse::<i64>()
        .map_err(|_| ApiError::ValidationError("Unknown category.".to_string()))?;

    validate_fields(&form.name, &form.description, category_id)
}

pub fn validate_item_request(request: &ItemRequest) -> Result<ItemFields, ApiError> {
    if request.name.trim().is_empty() || request.description.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "All fields must be specified.".to_string(),
        ));
    }
    validate_fields(&request.name, &request.description, request.category_id)
}

fn validate_fields(name: &str, description: &str, category_id: i64) -> Result<ItemFields, ApiError> {
    let name = name.trim();
    let description = description.trim();

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ApiError::ValidationError(format!(
            "Name must be at most {} characters.",
            MAX_NAME_LENGTH
        )));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(ApiError::ValidationError(format!(
            "Description must be at most {} characters.",
            MAX_DESCRIPTION_LENGTH
        )));
    }

    Ok(ItemFields {
        name: name.to_string(),
        description: description.to_string(),
        category_id,
    })
}
