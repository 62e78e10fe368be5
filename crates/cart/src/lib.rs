//! Vegeket Cart - the session cart engine.
//!
//! Owns the in-memory [`CartDocument`] model, validates mutations, and
//! derives totals from live catalog prices. The engine is stateless: every
//! operation takes the current document and returns the updated one, and the
//! caller is responsible for persisting it (typically into the browser
//! session). Nothing in this crate does I/O of its own; the only outward
//! dependency is the read-only [`Catalog`] lookup.
//!
//! # Operations
//!
//! - [`engine::add`] - add N more of an item (accumulating, catalog-checked)
//! - [`engine::remove`] - drop a whole line
//! - [`engine::recompute`] - reprice every line, prune stale ones, and derive
//!   the net and tax-inclusive totals. The only writer of totals.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod document;
pub mod engine;
pub mod error;
pub mod view;

pub use catalog::{Catalog, CatalogError, CatalogItem};
pub use document::{CartDocument, CartLine, DocumentError};
pub use error::CartError;
pub use view::LineItemView;
