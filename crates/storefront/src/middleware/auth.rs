//! Admin authentication extractor.
//!
//! The admin CRUD surface is protected by a single configured bearer token;
//! there are no admin user accounts. Handlers opt in by taking a
//! [`RequireAdmin`] argument.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     _admin: RequireAdmin,
//!     State(state): State<AppState>,
//! ) -> impl IntoResponse {
//!     // only reached with a valid token
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires the configured admin bearer token.
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let token = header_value.strip_prefix("Bearer ").unwrap_or_default();
        if !token.is_empty() && token == state.config().admin_token.expose_secret() {
            Ok(Self)
        } else {
            Err(AppError::Unauthorized("admin token required".to_string()))
        }
    }
}
