//! Session-related constants.
//!
//! The cart document itself is defined in `vegeket-cart`; the session just
//! stores it under a well-known key.

/// Session keys for storefront data.
pub mod keys {
    /// Key the session's cart document is stored under.
    pub const CART: &str = "cart";
}
