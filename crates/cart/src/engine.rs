//! Cart mutations and the totals recompute.
//!
//! All three operations are value-in/value-out: they take the current
//! document, return the updated one, and leave persistence to the caller.
//! On error the session copy is simply not saved, so a failed operation
//! leaves the cart unmodified.

use vegeket_core::{ItemId, TaxRate};

use crate::catalog::Catalog;
use crate::document::{CartDocument, CartLine};
use crate::error::CartError;
use crate::view::LineItemView;

/// Add `quantity` more units of `item_id` to the cart.
///
/// The item must exist in the catalog at add time; an unknown id fails
/// eagerly instead of lingering until the next recompute. If the item
/// already has a line, the quantity accumulates onto it ("add N more"),
/// it never replaces the stored quantity.
///
/// An absent cart is represented by `CartDocument::default()`; there is no
/// explicit create step.
///
/// # Errors
///
/// - [`CartError::InvalidQuantity`] if `quantity` is not a positive integer
///   that fits the line (accumulate overflow included).
/// - [`CartError::ItemNotFound`] if the catalog does not carry `item_id`.
/// - [`CartError::Catalog`] if the catalog lookup itself failed.
pub async fn add<C: Catalog>(
    catalog: &C,
    mut document: CartDocument,
    item_id: ItemId,
    quantity: i64,
) -> Result<CartDocument, CartError> {
    let added = u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
    if added == 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    if catalog.get_item(&item_id).await?.is_none() {
        return Err(CartError::ItemNotFound(item_id));
    }

    let current = document.quantity_of(&item_id).unwrap_or(0);
    let updated = current
        .checked_add(added)
        .ok_or(CartError::InvalidQuantity(quantity))?;
    document.upsert_quantity(&item_id, updated);
    Ok(document)
}

/// Remove the whole line for `item_id`.
///
/// Partial-quantity removal is out of scope; a line goes away entirely.
///
/// # Errors
///
/// [`CartError::LineNotFound`] if the document has no line for `item_id`,
/// so callers can tell a user mistake from a stale cart view.
pub fn remove(mut document: CartDocument, item_id: &ItemId) -> Result<CartDocument, CartError> {
    if document.remove_line(item_id) {
        Ok(document)
    } else {
        Err(CartError::LineNotFound(item_id.clone()))
    }
}

/// Reprice every line against the live catalog and derive the totals.
///
/// Lines whose item the catalog no longer carries are pruned, not failed:
/// one dead reference must not take the whole cart down. A transient catalog
/// failure aborts the recompute instead - totals are never derived from
/// guessed prices.
///
/// This is the only place totals are written. Returns the updated document
/// and one [`LineItemView`] per surviving line, in insertion order.
///
/// # Errors
///
/// [`CartError::Catalog`] if any lookup failed.
pub async fn recompute<C: Catalog>(
    catalog: &C,
    mut document: CartDocument,
    tax_rate: TaxRate,
) -> Result<(CartDocument, Vec<LineItemView>), CartError> {
    let lines: Vec<CartLine> = document.lines().to_vec();
    let mut surviving = Vec::with_capacity(lines.len());
    let mut views = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;

    for line in lines {
        let Some(item) = catalog.get_item(&line.item_id).await? else {
            // Stale reference: the item was removed (or unpublished) since
            // the line was added. Prune silently.
            continue;
        };
        let subtotal = item.price.times(line.quantity);
        total = total.saturating_add(subtotal.minor_units());
        views.push(LineItemView {
            item_id: line.item_id.clone(),
            name: item.name,
            image: item.image,
            unit_price: item.price,
            quantity: line.quantity,
            subtotal,
        });
        surviving.push(line);
    }

    document.replace_lines(surviving);
    document.set_totals(total, tax_rate.apply(total));
    Ok((document, views))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use vegeket_core::Price;

    use super::*;
    use crate::catalog::{CatalogError, CatalogItem};

    /// In-memory catalog with interior mutability so tests can delete items
    /// between operations.
    struct MemoryCatalog {
        items: Mutex<HashMap<ItemId, CatalogItem>>,
    }

    impl MemoryCatalog {
        fn new() -> Self {
            Self {
                items: Mutex::new(HashMap::new()),
            }
        }

        fn insert(&self, id: &str, name: &str, price: i64) {
            let id = ItemId::new(id);
            self.items.lock().unwrap().insert(
                id.clone(),
                CatalogItem {
                    id,
                    name: name.to_owned(),
                    price: Price::from_minor_units(price),
                    image: None,
                },
            );
        }

        fn delete(&self, id: &str) {
            self.items.lock().unwrap().remove(&ItemId::new(id));
        }
    }

    impl Catalog for MemoryCatalog {
        async fn get_item(&self, id: &ItemId) -> Result<Option<CatalogItem>, CatalogError> {
            Ok(self.items.lock().unwrap().get(id).cloned())
        }
    }

    /// Catalog whose every lookup fails, as if the backing store were down.
    struct DownCatalog;

    impl Catalog for DownCatalog {
        async fn get_item(&self, _id: &ItemId) -> Result<Option<CatalogItem>, CatalogError> {
            Err(CatalogError::new("connection refused"))
        }
    }

    fn vegetable_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        catalog.insert("item-1", "Carrot bundle", 500);
        catalog.insert("item-2", "Heirloom tomato box", 1000);
        catalog
    }

    const TEN_PERCENT: TaxRate = TaxRate::from_basis_points(1_000);

    #[tokio::test]
    async fn test_add_creates_document_lazily() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 2)
            .await
            .unwrap();
        assert_eq!(doc.quantity_of(&ItemId::new("item-1")), Some(2));
        assert_eq!(doc.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_add_accumulates_onto_existing_line() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 2)
            .await
            .unwrap();
        let doc = add(&catalog, doc, ItemId::new("item-1"), 3).await.unwrap();

        assert_eq!(doc.lines().len(), 1);
        assert_eq!(doc.quantity_of(&ItemId::new("item-1")), Some(5));
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let catalog = vegetable_catalog();
        for bad in [0, -1, -99] {
            let err = add(&catalog, CartDocument::default(), ItemId::new("item-1"), bad)
                .await
                .unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity(q) if q == bad));
        }
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_item() {
        let catalog = vegetable_catalog();
        let err = add(
            &catalog,
            CartDocument::default(),
            ItemId::new("not-a-thing"),
            1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(id) if id.as_str() == "not-a-thing"));
    }

    #[tokio::test]
    async fn test_add_overflow_is_invalid_quantity() {
        let catalog = vegetable_catalog();
        let doc = add(
            &catalog,
            CartDocument::default(),
            ItemId::new("item-1"),
            i64::from(u32::MAX),
        )
        .await
        .unwrap();
        let err = add(&catalog, doc, ItemId::new("item-1"), 1).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));

        let err = add(
            &catalog,
            CartDocument::default(),
            ItemId::new("item-1"),
            i64::from(u32::MAX) + 1,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn test_add_surfaces_catalog_outage() {
        let err = add(&DownCatalog, CartDocument::default(), ItemId::new("item-1"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_remove_drops_whole_line() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 3)
            .await
            .unwrap();
        let doc = remove(doc, &ItemId::new("item-1")).unwrap();
        assert!(doc.is_empty());

        let (doc, views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert_eq!(doc.total(), 0);
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_line_fails_loudly() {
        let err = remove(CartDocument::default(), &ItemId::new("item-1")).unwrap_err();
        assert!(matches!(err, CartError::LineNotFound(id) if id.as_str() == "item-1"));
    }

    #[tokio::test]
    async fn test_recompute_concrete_scenario() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 2)
            .await
            .unwrap();
        let doc = add(&catalog, doc, ItemId::new("item-2"), 1).await.unwrap();

        let (doc, views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].item_id.as_str(), "item-1");
        assert_eq!(views[0].quantity, 2);
        assert_eq!(views[0].subtotal.minor_units(), 1000);
        assert_eq!(views[1].item_id.as_str(), "item-2");
        assert_eq!(views[1].quantity, 1);
        assert_eq!(views[1].subtotal.minor_units(), 1000);
        assert_eq!(doc.total(), 2000);
        assert_eq!(doc.tax_inclusive_total(), 2200);

        let doc = remove(doc, &ItemId::new("item-1")).unwrap();
        let (doc, views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].item_id.as_str(), "item-2");
        assert_eq!(views[0].subtotal.minor_units(), 1000);
        assert_eq!(doc.total(), 1000);
        assert_eq!(doc.tax_inclusive_total(), 1100);
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 2)
            .await
            .unwrap();

        let (first_doc, first_views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        let (second_doc, second_views) =
            recompute(&catalog, first_doc.clone(), TEN_PERCENT).await.unwrap();

        assert_eq!(first_doc, second_doc);
        assert_eq!(first_views, second_views);
    }

    #[tokio::test]
    async fn test_recompute_truncates_tax() {
        let catalog = MemoryCatalog::new();
        catalog.insert("item-odd", "Daikon", 999);
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-odd"), 1)
            .await
            .unwrap();

        let (doc, _) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert_eq!(doc.total(), 999);
        // floor(999 * 1.10), not round-half-up.
        assert_eq!(doc.tax_inclusive_total(), 1098);
    }

    #[tokio::test]
    async fn test_recompute_prunes_stale_lines() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 2)
            .await
            .unwrap();
        let doc = add(&catalog, doc, ItemId::new("item-2"), 1).await.unwrap();

        catalog.delete("item-1");

        let (doc, views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].item_id.as_str(), "item-2");
        assert_eq!(doc.quantity_of(&ItemId::new("item-1")), None);
        assert_eq!(doc.total(), 1000);
        assert_eq!(doc.tax_inclusive_total(), 1100);
    }

    #[tokio::test]
    async fn test_recompute_surfaces_catalog_outage() {
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 1)
            .await
            .unwrap();

        let err = recompute(&DownCatalog, doc, TEN_PERCENT).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_recompute_preserves_insertion_order() {
        let catalog = MemoryCatalog::new();
        catalog.insert("c", "C", 1);
        catalog.insert("a", "A", 2);
        catalog.insert("b", "B", 3);

        let mut doc = CartDocument::default();
        for id in ["c", "a", "b"] {
            doc = add(&catalog, doc, ItemId::new(id), 1).await.unwrap();
        }

        let (_, views) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        let order: Vec<&str> = views.iter().map(|v| v.item_id.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_recompute_of_empty_cart() {
        let catalog = vegetable_catalog();
        let (doc, views) = recompute(&catalog, CartDocument::default(), TEN_PERCENT)
            .await
            .unwrap();
        assert!(views.is_empty());
        assert_eq!(doc.total(), 0);
        assert_eq!(doc.tax_inclusive_total(), 0);
    }

    #[tokio::test]
    async fn test_totals_never_negative() {
        // No sequence of valid operations can push a quantity below 1, so
        // the worst case is an empty cart at zero.
        let catalog = vegetable_catalog();
        let doc = add(&catalog, CartDocument::default(), ItemId::new("item-1"), 1)
            .await
            .unwrap();
        let doc = remove(doc, &ItemId::new("item-1")).unwrap();
        let (doc, _) = recompute(&catalog, doc, TEN_PERCENT).await.unwrap();
        assert!(doc.total() >= 0);
        assert!(doc.tax_inclusive_total() >= 0);
        assert!(doc.lines().iter().all(|l| l.quantity >= 1));
    }
}
