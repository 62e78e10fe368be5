//! The read-only catalog boundary the cart prices against.

use std::fmt;
use std::future::Future;

use thiserror::Error;

use vegeket_core::{ItemId, Price};

/// A purchasable item as the catalog presents it to the cart.
///
/// Carries only what a cart line view needs: the live price plus the display
/// fields copied into [`crate::LineItemView`] rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub image: Option<String>,
}

/// Transient failure talking to the catalog.
///
/// Distinct from an unknown item id: when the lookup itself fails, the engine
/// must not guess a price or silently drop the line, so the whole operation
/// is surfaced to the caller as retryable.
#[derive(Debug, Error)]
#[error("catalog unavailable: {0}")]
pub struct CatalogError(String);

impl CatalogError {
    /// Wrap an underlying failure.
    #[must_use]
    pub fn new(reason: impl fmt::Display) -> Self {
        Self(reason.to_string())
    }
}

/// Read-only item lookup.
///
/// `Ok(None)` means the catalog does not (or no longer) carry the item;
/// `Err` means the lookup itself failed and no pricing decision can be made.
pub trait Catalog {
    fn get_item(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = Result<Option<CatalogItem>, CatalogError>> + Send;
}
