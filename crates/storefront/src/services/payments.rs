//! Payment gateway client for hosted checkout.
//!
//! Checkout is an opaque hand-off: the storefront creates a hosted checkout
//! session from the cart's recomputed line views and redirects the browser to
//! the URL the gateway returns. No payment state lives in this process.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PaymentsConfig;

/// Payment gateway API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur when interacting with the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("gateway error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the client or parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// One checkout line derived from a cart line view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub name: String,
    /// Unit price in minor units.
    pub unit_amount: i64,
    pub quantity: u32,
}

/// A hosted checkout session created by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page the browser is redirected to.
    pub url: String,
}

/// Payment gateway API client.
#[derive(Clone)]
pub struct PaymentsClient {
    client: reqwest::Client,
    currency: String,
}

impl PaymentsClient {
    /// Create a new payment gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("invalid secret key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            currency: config.currency.clone(),
        })
    }

    /// Create a hosted checkout session for the given lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    pub async fn create_checkout_session(
        &self,
        lines: &[CheckoutLine],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = checkout_params(&self.currency, lines, success_url, cancel_url);

        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

/// Flatten checkout lines into the gateway's bracketed form encoding.
fn checkout_params(
    currency: &str,
    lines: &[CheckoutLine],
    success_url: &str,
    cancel_url: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_owned(), "payment".to_owned()),
        ("success_url".to_owned(), success_url.to_owned()),
        ("cancel_url".to_owned(), cancel_url.to_owned()),
    ];

    for (i, line) in lines.iter().enumerate() {
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            currency.to_owned(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            line.name.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            line.unit_amount.to_string(),
        ));
        params.push((format!("line_items[{i}][quantity]"), line.quantity.to_string()));
    }

    params
}
