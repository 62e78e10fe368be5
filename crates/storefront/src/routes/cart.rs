//! Cart route handlers.
//!
//! Every handler runs the same cycle: take the session's cart lock, load the
//! document, run the engine operation, recompute against live catalog prices,
//! save the result back. The lock spans the whole cycle so concurrent
//! requests from the same session cannot lose updates; the recompute-on-load
//! keeps stored totals from drifting behind catalog price changes.

use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tower_sessions::Session;
use tracing::instrument;

use vegeket_cart::{CartDocument, LineItemView, engine};
use vegeket_core::ItemId;

use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart response body: line views plus the recomputed totals.
#[derive(Debug, Serialize)]
pub struct CartBody {
    pub lines: Vec<LineItemView>,
    /// Net total in minor units.
    pub total: i64,
    /// Tax-inclusive total in minor units.
    pub tax_inclusive_total: i64,
    /// Total number of units (the badge count).
    pub item_count: u64,
}

impl CartBody {
    pub(crate) fn new(document: &CartDocument, lines: Vec<LineItemView>) -> Self {
        Self {
            lines,
            total: document.total(),
            tax_inclusive_total: document.tax_inclusive_total(),
            item_count: document.item_count(),
        }
    }
}

/// Cart count badge body.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Take the session's cart lock for a load-mutate-save cycle.
///
/// A session that has never been saved has no id yet; it also cannot be
/// shared by concurrent requests (the cookie has not been issued), so there
/// is nothing to serialize against.
pub(crate) async fn lock_cart(
    state: &AppState,
    session: &Session,
) -> Option<OwnedMutexGuard<()>> {
    match session.id() {
        Some(id) => Some(state.cart_locks().acquire(&id.to_string()).await),
        None => None,
    }
}

/// Load the session's cart document, treating an absent cart as empty.
///
/// A stored document that fails validation (tampered or from an incompatible
/// deploy) is discarded with a warning rather than bricking the session; a
/// session store failure is propagated as retryable instead.
pub(crate) async fn load_cart(session: &Session) -> Result<CartDocument> {
    match session.get::<CartDocument>(session_keys::CART).await {
        Ok(Some(document)) => Ok(document),
        Ok(None) => Ok(CartDocument::default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "discarding cart document that failed validation");
            Ok(CartDocument::default())
        }
        Err(e) => Err(AppError::Session(e)),
    }
}

/// Save the cart document back into the session.
pub(crate) async fn save_cart(session: &Session, document: &CartDocument) -> Result<()> {
    session
        .insert(session_keys::CART, document)
        .await
        .map_err(AppError::Session)
}

// =============================================================================
// Handlers
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: String,
    pub quantity: Option<i64>,
}

/// Show the cart, recomputed against live prices.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartBody>> {
    let _guard = lock_cart(&state, &session).await;

    let document = load_cart(&session).await?;
    let (document, lines) =
        engine::recompute(state.catalog(), document, state.config().tax_rate).await?;
    save_cart(&session, &document).await?;

    Ok(Json(CartBody::new(&document, lines)))
}

/// Add an item to the cart (accumulating onto an existing line).
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Json<CartBody>> {
    let quantity = form.quantity.unwrap_or(1);
    let item_id = ItemId::new(form.item_id);

    let _guard = lock_cart(&state, &session).await;

    let document = load_cart(&session).await?;
    let document = engine::add(state.catalog(), document, item_id, quantity).await?;
    let (document, lines) =
        engine::recompute(state.catalog(), document, state.config().tax_rate).await?;
    save_cart(&session, &document).await?;

    tracing::debug!(count = document.item_count(), "added to cart");
    Ok(Json(CartBody::new(&document, lines)))
}

/// Remove a whole line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<CartBody>> {
    let item_id = ItemId::new(id);

    let _guard = lock_cart(&state, &session).await;

    let document = load_cart(&session).await?;
    let document = engine::remove(document, &item_id)?;
    let (document, lines) =
        engine::recompute(state.catalog(), document, state.config().tax_rate).await?;
    save_cart(&session, &document).await?;

    tracing::debug!(count = document.item_count(), "removed from cart");
    Ok(Json(CartBody::new(&document, lines)))
}

/// Cart count badge.
///
/// Reads the stored document without repricing; the count only depends on
/// quantities, which no catalog change can move.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let document = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: document.item_count(),
    }))
}

#[cfg(test)]
mod tests {
    use vegeket_core::Price;

    use super::*;

    #[test]
    fn test_cart_body_from_empty_document() {
        let document = CartDocument::default();
        let body = CartBody::new(&document, Vec::new());
        assert!(body.lines.is_empty());
        assert_eq!(body.total, 0);
        assert_eq!(body.tax_inclusive_total, 0);
        assert_eq!(body.item_count, 0);
    }

    #[test]
    fn test_cart_body_serialization_shape() {
        let lines = vec![LineItemView {
            item_id: ItemId::new("item-1"),
            name: "Carrot bundle".to_string(),
            image: None,
            unit_price: Price::from_minor_units(500),
            quantity: 2,
            subtotal: Price::from_minor_units(1000),
        }];
        let body = CartBody::new(&CartDocument::default(), lines);

        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["lines"][0]["item_id"], "item-1");
        assert_eq!(json["lines"][0]["unit_price"], 500);
        assert_eq!(json["lines"][0]["subtotal"], 1000);
    }
}
