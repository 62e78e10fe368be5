//! Seed the catalog from a YAML file.
//!
//! Reads categories, tags, and items from a YAML configuration, validates
//! it, and upserts everything in one transaction. Used for local dev and
//! demo environments; re-running with the same file is idempotent.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use vegeket_core::Price;

use super::migrate::database_url;

fn default_published() -> bool {
    true
}

/// Top-level seed file shape.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub categories: Vec<SeedTerm>,
    #[serde(default)]
    pub tags: Vec<SeedTerm>,
    #[serde(default)]
    pub items: Vec<SeedItem>,
}

/// A category or tag entry.
#[derive(Debug, Deserialize)]
pub struct SeedTerm {
    pub id: String,
    pub name: String,
}

/// An item entry.
#[derive(Debug, Deserialize)]
pub struct SeedItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in minor units.
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
    /// Category id the item belongs to.
    #[serde(default)]
    pub category: Option<String>,
    /// Tag ids assigned to the item.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

/// Validate a parsed seed file. Returns one message per problem found.
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen_items: Vec<&str> = Vec::new();

    for item in &seed.items {
        if item.name.trim().is_empty() {
            errors.push(format!("item '{}': name must not be empty", item.id));
        }
        if item.price < 0 {
            errors.push(format!("item '{}': price must not be negative", item.id));
        }
        if seen_items.contains(&item.id.as_str()) {
            errors.push(format!("item '{}': duplicate id", item.id));
        }
        seen_items.push(&item.id);

        if let Some(category) = &item.category {
            if !seed.categories.iter().any(|c| &c.id == category) {
                errors.push(format!(
                    "item '{}': unknown category '{category}'",
                    item.id
                ));
            }
        }
        for tag in &item.tags {
            if !seed.tags.iter().any(|t| &t.id == tag) {
                errors.push(format!("item '{}': unknown tag '{tag}'", item.id));
            }
        }
    }

    errors
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot be
/// read or fails validation, or a database operation fails.
pub async fn run(file_path: &str, clear_existing: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed from file");

    // Read and validate YAML before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        return Err(format!("Seed file is invalid:\n  {}", errors.join("\n  ")).into());
    }

    info!(
        categories = seed.categories.len(),
        tags = seed.tags.len(),
        items = seed.items.len(),
        "Parsed seed file"
    );

    let pool = sqlx::PgPool::connect(&database_url).await?;
    let mut tx = pool.begin().await?;

    if clear_existing {
        info!("Clearing existing catalog rows");
        sqlx::query("DELETE FROM item_tags").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM tags").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
    }

    for category in &seed.categories {
        sqlx::query(
            "INSERT INTO categories (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(&category.id)
        .bind(&category.name)
        .execute(&mut *tx)
        .await?;
    }

    for tag in &seed.tags {
        sqlx::query(
            "INSERT INTO tags (id, name) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(&tag.id)
        .bind(&tag.name)
        .execute(&mut *tx)
        .await?;
    }

    for item in &seed.items {
        sqlx::query(
            "INSERT INTO items (id, name, description, price, image, category_id, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 description = EXCLUDED.description, \
                 price = EXCLUDED.price, \
                 image = EXCLUDED.image, \
                 category_id = EXCLUDED.category_id, \
                 is_published = EXCLUDED.is_published, \
                 updated_at = now()",
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(Price::from_minor_units(item.price))
        .bind(&item.image)
        .bind(&item.category)
        .bind(item.is_published)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
            .bind(&item.id)
            .execute(&mut *tx)
            .await?;
        for tag in &item.tags {
            sqlx::query("INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2)")
                .bind(&item.id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    info!("Seed complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
categories:
  - id: vegetables
    name: Vegetables
tags:
  - id: organic
    name: Organic
items:
  - id: item-1
    name: Carrot bundle
    price: 500
    category: vegetables
    tags: [organic]
  - id: item-2
    name: Heirloom tomato box
    price: 1000
";

    #[test]
    fn test_parse_sample_seed() {
        let seed: SeedFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(seed.categories.len(), 1);
        assert_eq!(seed.tags.len(), 1);
        assert_eq!(seed.items.len(), 2);
        assert!(seed.items[0].is_published);
        assert_eq!(seed.items[0].tags, ["organic"]);
        assert!(validate(&seed).is_empty());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let seed: SeedFile = serde_yaml::from_str(
            "items:\n  - id: bad\n    name: Bad\n    price: -5\n",
        )
        .unwrap();
        let errors = validate(&seed);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("negative"));
    }

    #[test]
    fn test_validate_rejects_duplicates_and_dangling_refs() {
        let seed: SeedFile = serde_yaml::from_str(
            "items:\n  - id: a\n    name: A\n    price: 1\n    category: nope\n  - id: a\n    name: A again\n    price: 1\n    tags: [missing]\n",
        )
        .unwrap();
        let errors = validate(&seed);
        assert!(errors.iter().any(|e| e.contains("duplicate id")));
        assert!(errors.iter().any(|e| e.contains("unknown category")));
        assert!(errors.iter().any(|e| e.contains("unknown tag")));
    }
}
