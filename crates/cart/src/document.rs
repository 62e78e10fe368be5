//! The persisted cart document.
//!
//! One document per browser session, round-tripped through whatever session
//! store the host application provides. Deserialization is validated rather
//! than trusted: a payload with a zero quantity or a duplicated item id is
//! rejected at load time.

use serde::{Deserialize, Serialize};

use thiserror::Error;

use vegeket_core::ItemId;

/// One (item id, quantity) pair within a cart document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// A cart document that failed validation on load.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cart line for item '{0}' has a zero quantity")]
    ZeroQuantity(ItemId),
    #[error("cart document has more than one line for item '{0}'")]
    DuplicateLine(ItemId),
}

/// The persisted cart state for one session.
///
/// Lines are kept in insertion order so the cart displays stably across
/// requests. `total` and `tax_inclusive_total` are derived display values in
/// minor units; only [`crate::engine::recompute`] writes them, and they are
/// only meaningful after a recompute against live catalog prices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawCartDocument")]
pub struct CartDocument {
    lines: Vec<CartLine>,
    total: i64,
    tax_inclusive_total: i64,
}

/// Untrusted wire form of [`CartDocument`].
#[derive(Deserialize)]
struct RawCartDocument {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    total: i64,
    #[serde(default)]
    tax_inclusive_total: i64,
}

impl TryFrom<RawCartDocument> for CartDocument {
    type Error = DocumentError;

    fn try_from(raw: RawCartDocument) -> Result<Self, Self::Error> {
        let mut seen: Vec<&ItemId> = Vec::with_capacity(raw.lines.len());
        for line in &raw.lines {
            if line.quantity == 0 {
                return Err(DocumentError::ZeroQuantity(line.item_id.clone()));
            }
            if seen.contains(&&line.item_id) {
                return Err(DocumentError::DuplicateLine(line.item_id.clone()));
            }
            seen.push(&line.item_id);
        }
        Ok(Self {
            lines: raw.lines,
            total: raw.total,
            tax_inclusive_total: raw.tax_inclusive_total,
        })
    }
}

impl CartDocument {
    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Quantity of the given item, if it has a line.
    #[must_use]
    pub fn quantity_of(&self, item_id: &ItemId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| &l.item_id == item_id)
            .map(|l| l.quantity)
    }

    /// Net total in minor units, as of the most recent recompute.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.total
    }

    /// Tax-inclusive total in minor units, as of the most recent recompute.
    #[must_use]
    pub const fn tax_inclusive_total(&self) -> i64 {
        self.tax_inclusive_total
    }

    /// Set an existing line's quantity, or append a new line.
    pub(crate) fn upsert_quantity(&mut self, item_id: &ItemId, quantity: u32) {
        match self.lines.iter_mut().find(|l| &l.item_id == item_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                item_id: item_id.clone(),
                quantity,
            }),
        }
    }

    /// Remove the line for `item_id`. Returns whether a line existed.
    pub(crate) fn remove_line(&mut self, item_id: &ItemId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.item_id != item_id);
        self.lines.len() != before
    }

    /// Replace the whole line set (recompute pruning).
    pub(crate) fn replace_lines(&mut self, lines: Vec<CartLine>) {
        self.lines = lines;
    }

    /// Write the derived totals. Crate-private: recompute is the only caller.
    pub(crate) const fn set_totals(&mut self, total: i64, tax_inclusive_total: i64) {
        self.total = total;
        self.tax_inclusive_total = tax_inclusive_total;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip_preserves_order() {
        let mut doc = CartDocument::default();
        doc.upsert_quantity(&ItemId::new("carrot"), 2);
        doc.upsert_quantity(&ItemId::new("apple"), 1);
        doc.upsert_quantity(&ItemId::new("beet"), 3);
        doc.set_totals(600, 660);

        let json = serde_json::to_string(&doc).unwrap();
        let back: CartDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(back, doc);
        let ids: Vec<&str> = back.lines().iter().map(|l| l.item_id.as_str()).collect();
        assert_eq!(ids, ["carrot", "apple", "beet"]);
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        let json = r#"{"lines":[{"item_id":"carrot","quantity":0}],"total":0,"tax_inclusive_total":0}"#;
        let err = serde_json::from_str::<CartDocument>(json).unwrap_err();
        assert!(err.to_string().contains("zero quantity"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_lines() {
        let json = r#"{"lines":[{"item_id":"carrot","quantity":1},{"item_id":"carrot","quantity":2}]}"#;
        let err = serde_json::from_str::<CartDocument>(json).unwrap_err();
        assert!(err.to_string().contains("more than one line"));
    }

    #[test]
    fn test_deserialize_defaults_missing_totals() {
        let json = r#"{"lines":[{"item_id":"carrot","quantity":1}]}"#;
        let doc: CartDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.total(), 0);
        assert_eq!(doc.tax_inclusive_total(), 0);
        assert_eq!(doc.quantity_of(&ItemId::new("carrot")), Some(1));
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut doc = CartDocument::default();
        assert_eq!(doc.item_count(), 0);
        doc.upsert_quantity(&ItemId::new("carrot"), 2);
        doc.upsert_quantity(&ItemId::new("apple"), 5);
        assert_eq!(doc.item_count(), 7);
    }

    #[test]
    fn test_remove_line_reports_absence() {
        let mut doc = CartDocument::default();
        doc.upsert_quantity(&ItemId::new("carrot"), 2);
        assert!(doc.remove_line(&ItemId::new("carrot")));
        assert!(!doc.remove_line(&ItemId::new("carrot")));
        assert!(doc.is_empty());
    }
}
