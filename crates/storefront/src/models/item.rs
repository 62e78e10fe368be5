//! Catalog row types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use vegeket_core::{CategoryId, ItemId, Price, TagId};

/// A purchasable item row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    /// Price in minor units.
    pub price: Price,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog category row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog tag row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}
