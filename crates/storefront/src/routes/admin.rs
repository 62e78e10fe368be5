//! Admin CRUD route handlers.
//!
//! Everything here sits behind the [`RequireAdmin`] bearer-token extractor.
//! The payloads are full-replacement (PUT) shapes; partial patching is not
//! offered.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use vegeket_core::{CategoryId, ItemId, Price, TagId};

use crate::db::{CategoryRepository, ItemRepository, TagRepository};
use crate::db::items::{ItemChanges, NewItem};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, Item, Tag};
use crate::state::AppState;

const fn default_published() -> bool {
    true
}

/// Create-item payload. An explicit id is honored; otherwise one is minted.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: i64,
    pub image: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

/// Full-replacement update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: i64,
    pub image: Option<String>,
    pub category_id: Option<String>,
    /// When present, replaces the item's tag assignments.
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

/// Create payload for categories and tags.
#[derive(Debug, Deserialize)]
pub struct CreateTermRequest {
    /// Explicit slug; a UUID is minted when absent.
    pub id: Option<String>,
    pub name: String,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    Ok(name.to_owned())
}

fn validate_price(price: i64) -> Result<Price> {
    if price < 0 {
        return Err(AppError::BadRequest(
            "price must not be negative".to_string(),
        ));
    }
    Ok(Price::from_minor_units(price))
}

fn id_or_minted(id: Option<String>) -> String {
    id.filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

// =============================================================================
// Items
// =============================================================================

/// List every item, published or not.
#[instrument(skip_all)]
pub async fn list_items(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>> {
    let items = ItemRepository::new(state.pool()).list_all().await?;
    Ok(Json(items))
}

/// Create an item (and its tag assignments).
#[instrument(skip_all)]
pub async fn create_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<Item>)> {
    let name = validate_name(&payload.name)?;
    let price = validate_price(payload.price)?;
    let id = ItemId::new(id_or_minted(payload.id));

    let repo = ItemRepository::new(state.pool());
    let item = repo
        .create(NewItem {
            id: id.clone(),
            name,
            description: payload.description,
            price,
            image: payload.image,
            category_id: payload.category_id.map(CategoryId::new),
            is_published: payload.is_published,
        })
        .await?;

    let tags: Vec<TagId> = payload.tags.into_iter().map(TagId::new).collect();
    repo.set_tags(&id, &tags).await?;

    tracing::info!(item_id = %id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Replace an item.
#[instrument(skip_all)]
pub async fn update_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<Item>> {
    let name = validate_name(&payload.name)?;
    let price = validate_price(payload.price)?;
    let id = ItemId::new(id);

    let repo = ItemRepository::new(state.pool());
    let item = repo
        .update(
            &id,
            ItemChanges {
                name,
                description: payload.description,
                price,
                image: payload.image,
                category_id: payload.category_id.map(CategoryId::new),
                is_published: payload.is_published,
            },
        )
        .await?;

    if let Some(tags) = payload.tags {
        let tags: Vec<TagId> = tags.into_iter().map(TagId::new).collect();
        repo.set_tags(&id, &tags).await?;
    }

    tracing::info!(item_id = %id, "item updated");
    Ok(Json(item))
}

/// Delete an item.
#[instrument(skip_all)]
pub async fn delete_item(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = ItemId::new(id);
    ItemRepository::new(state.pool()).delete(&id).await?;
    tracing::info!(item_id = %id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

/// List categories.
#[instrument(skip_all)]
pub async fn list_categories(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Create a category.
#[instrument(skip_all)]
pub async fn create_category(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateTermRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let name = validate_name(&payload.name)?;
    let id = CategoryId::new(id_or_minted(payload.id));

    let category = CategoryRepository::new(state.pool())
        .create(&id, &name)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Delete a category. Its items survive with no category.
#[instrument(skip_all)]
pub async fn delete_category(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = CategoryId::new(id);
    CategoryRepository::new(state.pool()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Tags
// =============================================================================

/// List tags.
#[instrument(skip_all)]
pub async fn list_tags(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Tag>>> {
    let tags = TagRepository::new(state.pool()).list().await?;
    Ok(Json(tags))
}

/// Create a tag.
#[instrument(skip_all)]
pub async fn create_tag(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateTermRequest>,
) -> Result<(StatusCode, Json<Tag>)> {
    let name = validate_name(&payload.name)?;
    let id = TagId::new(id_or_minted(payload.id));

    let tag = TagRepository::new(state.pool()).create(&id, &name).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Delete a tag and its item assignments.
#[instrument(skip_all)]
pub async fn delete_tag(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = TagId::new(id);
    TagRepository::new(state.pool()).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims_and_rejects_empty() {
        assert_eq!(validate_name("  Carrot  ").expect("valid"), "Carrot");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_validate_price_rejects_negative() {
        assert_eq!(
            validate_price(500).expect("valid"),
            Price::from_minor_units(500)
        );
        assert_eq!(validate_price(0).expect("valid"), Price::from_minor_units(0));
        assert!(validate_price(-1).is_err());
    }

    #[test]
    fn test_id_or_minted() {
        assert_eq!(id_or_minted(Some("carrots".to_string())), "carrots");
        // Blank explicit ids fall through to a minted one.
        assert!(!id_or_minted(Some("  ".to_string())).is_empty());
        assert!(!id_or_minted(None).is_empty());
    }
}
