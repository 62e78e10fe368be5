//! Item repository for database operations.

use sqlx::PgPool;

use vegeket_core::{CategoryId, ItemId, Price, TagId};

use super::{RepositoryError, map_write_error};
use crate::models::{Item, Tag};

/// Columns selected for an [`Item`] row.
const ITEM_COLUMNS: &str =
    "id, name, description, price, image, category_id, is_published, created_at, updated_at";

/// Fields for a new item row.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_published: bool,
}

/// Full-replacement update for an existing item row.
#[derive(Debug, Clone)]
pub struct ItemChanges {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub image: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_published: bool,
}

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List published items, newest first, optionally filtered by category
    /// and/or tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(
        &self,
        category: Option<&CategoryId>,
        tag: Option<&TagId>,
    ) -> Result<Vec<Item>, RepositoryError> {
        let items = match (category, tag) {
            (None, None) => {
                sqlx::query_as::<_, Item>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM items WHERE is_published \
                     ORDER BY created_at DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
            (Some(category), None) => {
                sqlx::query_as::<_, Item>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM items \
                     WHERE is_published AND category_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(category.as_str())
                .fetch_all(self.pool)
                .await?
            }
            (None, Some(tag)) => {
                sqlx::query_as::<_, Item>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM items \
                     JOIN item_tags ON item_tags.item_id = items.id \
                     WHERE is_published AND item_tags.tag_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(tag.as_str())
                .fetch_all(self.pool)
                .await?
            }
            (Some(category), Some(tag)) => {
                sqlx::query_as::<_, Item>(&format!(
                    "SELECT {ITEM_COLUMNS} FROM items \
                     JOIN item_tags ON item_tags.item_id = items.id \
                     WHERE is_published AND category_id = $1 AND item_tags.tag_id = $2 \
                     ORDER BY created_at DESC"
                ))
                .bind(category.as_str())
                .bind(tag.as_str())
                .fetch_all(self.pool)
                .await?
            }
        };
        Ok(items)
    }

    /// List every item, published or not (admin view), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        let item =
            sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(self.pool)
                .await?;
        Ok(item)
    }

    /// Tags assigned to an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tags_for(&self, id: &ItemId) -> Result<Vec<Tag>, RepositoryError> {
        let tags = sqlx::query_as::<_, Tag>(
            "SELECT tags.id, tags.name FROM tags \
             JOIN item_tags ON item_tags.tag_id = tags.id \
             WHERE item_tags.item_id = $1 \
             ORDER BY tags.name",
        )
        .bind(id.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(tags)
    }

    /// Insert a new item row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate id or an unknown
    /// category, `RepositoryError::Database` otherwise.
    pub async fn create(&self, new: NewItem) -> Result<Item, RepositoryError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items (id, name, description, price, image, category_id, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(new.id.as_str())
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.image)
        .bind(new.category_id.as_ref().map(CategoryId::as_str))
        .bind(new.is_published)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "item"))?;
        Ok(item)
    }

    /// Replace an existing item row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched,
    /// `RepositoryError::Conflict` on an unknown category.
    pub async fn update(&self, id: &ItemId, changes: ItemChanges) -> Result<Item, RepositoryError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items \
             SET name = $2, description = $3, price = $4, image = $5, \
                 category_id = $6, is_published = $7, updated_at = now() \
             WHERE id = $1 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id.as_str())
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.image)
        .bind(changes.category_id.as_ref().map(CategoryId::as_str))
        .bind(changes.is_published)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_write_error(e, "item"))?;
        item.ok_or(RepositoryError::NotFound)
    }

    /// Delete an item row (tag assignments cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    pub async fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace an item's tag assignments.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a tag id does not exist,
    /// `RepositoryError::Database` otherwise.
    pub async fn set_tags(&self, id: &ItemId, tags: &[TagId]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;

        for tag in tags {
            sqlx::query("INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2)")
                .bind(id.as_str())
                .bind(tag.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_write_error(e, "item tag"))?;
        }

        tx.commit().await?;
        Ok(())
    }
}
