//! Presentation views derived from a cart document.

use serde::Serialize;

use vegeket_core::{ItemId, Price};

/// One presentable cart row: the line plus display fields copied from the
/// catalog item at recompute time.
///
/// Ephemeral - rebuilt on every recompute, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItemView {
    pub item_id: ItemId,
    pub name: String,
    pub image: Option<String>,
    /// Live unit price at the most recent recompute, in minor units.
    pub unit_price: Price,
    pub quantity: u32,
    /// `unit_price * quantity`, in minor units.
    pub subtotal: Price,
}
