//! Checkout hand-off route handlers.
//!
//! Payment itself is an opaque downstream concern: checkout recomputes the
//! cart, asks the gateway for a hosted session, and redirects the browser.
//! The only cart-state consequence lives in `success`, which clears the
//! session's cart key once the gateway has sent the customer back.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use vegeket_cart::engine;

use super::cart::{load_cart, lock_cart, save_cart};
use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::services::payments::CheckoutLine;
use crate::state::AppState;

/// Create a hosted checkout session from the cart and redirect to it.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Response> {
    let _guard = lock_cart(&state, &session).await;

    let document = load_cart(&session).await?;
    let (document, views) =
        engine::recompute(state.catalog(), document, state.config().tax_rate).await?;
    if document.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }
    save_cart(&session, &document).await?;

    let lines: Vec<CheckoutLine> = views
        .iter()
        .map(|view| CheckoutLine {
            name: view.name.clone(),
            unit_amount: view.unit_price.minor_units(),
            quantity: view.quantity,
        })
        .collect();

    let base = state.config().base_url.trim_end_matches('/');
    let checkout = state
        .payments()
        .create_checkout_session(
            &lines,
            &format!("{base}/pay/success"),
            &format!("{base}/pay/cancel"),
        )
        .await?;

    tracing::info!(checkout_id = %checkout.id, total = document.total(), "redirecting to hosted checkout");
    Ok(Redirect::to(&checkout.url).into_response())
}

/// Landing after a completed payment: the cart's job is done, clear it.
#[instrument(skip(session))]
pub async fn success(session: Session) -> Result<Json<serde_json::Value>> {
    let _ = session.remove_value(session_keys::CART).await?;
    Ok(Json(json!({ "status": "complete" })))
}

/// Landing after an abandoned checkout: the cart is left as it was.
#[instrument]
pub async fn cancel() -> Json<serde_json::Value> {
    Json(json!({ "status": "cancelled" }))
}
