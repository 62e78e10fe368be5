//! Item route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use vegeket_core::{CategoryId, ItemId, TagId};

use crate::db::ItemRepository;
use crate::error::{AppError, Result};
use crate::models::{Item, Tag};
use crate::state::AppState;

/// Item display data for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: i64,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.minor_units(),
            image: item.image.clone(),
            category_id: item.category_id.clone(),
        }
    }
}

/// Item detail including tag assignments.
#[derive(Debug, Serialize)]
pub struct ItemDetailBody {
    #[serde(flatten)]
    pub item: ItemView,
    pub tags: Vec<Tag>,
}

/// Listing filter query parameters.
#[derive(Debug, Deserialize)]
pub struct ItemListQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
}

/// List published items, optionally filtered by category and/or tag.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<Vec<ItemView>>> {
    let repo = ItemRepository::new(state.pool());
    let category = query.category.map(CategoryId::new);
    let tag = query.tag.map(TagId::new);

    let items = repo.list_published(category.as_ref(), tag.as_ref()).await?;
    Ok(Json(items.iter().map(ItemView::from).collect()))
}

/// Item detail. Unpublished items are invisible here, same as in the cart.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ItemDetailBody>> {
    let id = ItemId::new(id);
    let repo = ItemRepository::new(state.pool());

    let item = repo
        .get(&id)
        .await?
        .filter(|item| item.is_published)
        .ok_or_else(|| AppError::NotFound(format!("item '{id}'")))?;
    let tags = repo.tags_for(&id).await?;

    Ok(Json(ItemDetailBody {
        item: ItemView::from(&item),
        tags,
    }))
}
