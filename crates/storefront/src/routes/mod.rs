//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Published item listing (home)
//! GET  /health                 - Health check
//!
//! # Items
//! GET  /items/{id}             - Item detail
//!
//! # Cart
//! GET  /cart                   - Cart body (recomputed)
//! POST /cart/add               - Add to cart (accumulating)
//! POST /cart/remove/{id}       - Remove a whole line
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /pay/checkout           - Redirect to hosted checkout
//! GET  /pay/success            - Clear cart after payment
//! GET  /pay/cancel             - Back from an abandoned checkout
//!
//! # Admin (bearer token)
//! GET  /admin/items            - All items incl. unpublished
//! POST /admin/items            - Create item
//! PUT  /admin/items/{id}       - Replace item
//! DELETE /admin/items/{id}     - Delete item
//! GET/POST /admin/categories   - List / create categories
//! DELETE /admin/categories/{id}
//! GET/POST /admin/tags         - List / create tags
//! DELETE /admin/tags/{id}
//! ```

pub mod admin;
pub mod cart;
pub mod items;
pub mod pay;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove/{id}", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the payment routes router.
pub fn pay_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(pay::checkout))
        .route("/success", get(pay::success))
        .route("/cancel", get(pay::cancel))
}

/// Create the admin CRUD router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(admin::list_items).post(admin::create_item))
        .route("/items/{id}", put(admin::update_item).delete(admin::delete_item))
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/categories/{id}", delete(admin::delete_category))
        .route("/tags", get(admin::list_tags).post(admin::create_tag))
        .route("/tags/{id}", delete(admin::delete_tag))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page: the published item listing
        .route("/", get(items::index))
        // Item detail
        .route("/items/{id}", get(items::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout hand-off
        .nest("/pay", pay_routes())
        // Admin CRUD
        .nest("/admin", admin_routes())
}
