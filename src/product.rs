//! Product lookup client.
//!
//! Resolves a product identifier to its current name and price by calling
//! the product service. Client-error responses map to `ProductNotFound`,
//! server errors and transport failures to `Upstream`. No retry or
//! backoff happens here; callers decide whether to retry.

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CartError, Result};

/// Name and price copied at fetch time. Cart items store this copy, so a
/// later upstream price change does not rewrite existing cart lines.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

pub trait ProductDirectory: Send + Sync {
    async fn fetch(&self, product_id: Uuid) -> Result<ProductSnapshot>;
}

/// HTTP implementation over the product service's REST surface.
#[derive(Clone, Debug)]
pub struct HttpProductDirectory {
    base_url: String,
    http: Client,
}

impl HttpProductDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http: Client::new() }
    }
}

impl ProductDirectory for HttpProductDirectory {
    async fn fetch(&self, product_id: Uuid) -> Result<ProductSnapshot> {
        let url = format!("{}/api/v1/products/{}", self.base_url, product_id);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CartError::Upstream(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(CartError::ProductNotFound);
        }
        if !status.is_success() {
            return Err(CartError::Upstream(format!(
                "product lookup failed with status {status}"
            )));
        }

        response
            .json::<ProductSnapshot>()
            .await
            .map_err(|e| CartError::Upstream(e.to_string()))
    }
}
