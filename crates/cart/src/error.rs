//! Cart operation errors.
//!
//! Every failure is a value returned to the caller; no cart operation can
//! abort the process. Stale catalog references are not represented here at
//! all - they are pruned during recompute, not surfaced.

use thiserror::Error;

use vegeket_core::ItemId;

use crate::catalog::CatalogError;

/// Errors returned by cart engine operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Non-positive (or unrepresentable) quantity supplied to `add`.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i64),

    /// The catalog does not recognize the item being added.
    #[error("item '{0}' is not in the catalog")]
    ItemNotFound(ItemId),

    /// `remove` targeted an item with no line in the document.
    #[error("cart has no line for item '{0}'")]
    LineNotFound(ItemId),

    /// Transient catalog failure; the operation can be retried.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
