//! Category and tag repositories.
//!
//! Small, flat CRUD; both tables are (id, name) pairs with string primary
//! keys so externally chosen slugs survive round trips.

use sqlx::PgPool;

use vegeket_core::{CategoryId, TagId};

use super::{RepositoryError, map_write_error};
use crate::models::{Category, Tag};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate id or name.
    pub async fn create(&self, id: &CategoryId, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(id.as_str())
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "category"))?;
        Ok(category)
    }

    /// Delete a category. Items keep existing with a null category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    pub async fn delete(&self, id: &CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Repository for tag database operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All tags, name order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Tag>, RepositoryError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(self.pool)
            .await?;
        Ok(tags)
    }

    /// Insert a new tag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate id or name.
    pub async fn create(&self, id: &TagId, name: &str) -> Result<Tag, RepositoryError> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(id.as_str())
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "tag"))?;
        Ok(tag)
    }

    /// Delete a tag (item assignments cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    pub async fn delete(&self, id: &TagId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
