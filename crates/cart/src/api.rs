//! Stock and catalog service collaborators.
//!
//! The store depends on the two traits here, never on the concrete client,
//! so tests can substitute scripted fakes. [`StorefrontApiClient`] is the
//! production implementation of both: a thin `reqwest` wrapper over the
//! storefront REST API. Product metadata is cached via `moka` (5-minute
//! TTL); stock is fetched fresh on every call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::CartConfig;
use crate::types::{ProductId, ProductRecord, StockSnapshot};

const PRODUCT_CACHE_CAPACITY: u64 = 1_000;
const PRODUCT_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// Status code of the response.
        status: reqwest::StatusCode,
        /// Response body, truncated for logging.
        body: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The product does not exist.
    #[error("product not found: {0}")]
    NotFound(ProductId),
}

/// External collaborator reporting per-product available inventory.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the current stock snapshot for a product.
    async fn stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError>;
}

/// External collaborator resolving a product id to display metadata.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch catalog metadata for a product.
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ApiError>;
}

/// Client for the storefront stock and catalog endpoints.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the
/// product cache.
#[derive(Clone)]
pub struct StorefrontApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<SecretString>,
    products: Cache<ProductId, ProductRecord>,
}

impl StorefrontApiClient {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CartConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(PRODUCT_CACHE_CAPACITY)
            .time_to_live(PRODUCT_CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ClientInner {
                client,
                base_url: config.api_base_url.trim_end_matches('/').to_string(),
                api_token: config.api_token.clone(),
                products,
            }),
        })
    }

    /// Execute a GET against a per-product endpoint and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, ApiError> {
        let url = endpoint(&self.inner.base_url, resource, id);

        let mut request = self.inner.client.get(&url);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: body.chars().take(200).collect(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl StockService for StorefrontApiClient {
    /// `GET {base}/stock/{id}`.
    ///
    /// Inventory moves out from under us; responses are never cached.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockSnapshot, ApiError> {
        self.get_json("stock", id).await
    }
}

#[async_trait]
impl CatalogService for StorefrontApiClient {
    /// `GET {base}/products/{id}`, served from the product cache when warm.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ApiError> {
        if let Some(record) = self.inner.products.get(&id).await {
            debug!("cache hit for product");
            return Ok(record);
        }

        let record: ProductRecord = self.get_json("products", id).await?;

        self.inner.products.insert(id, record.clone()).await;

        Ok(record)
    }
}

/// Build the URL for a per-product endpoint.
fn endpoint(base_url: &str, resource: &str, id: ProductId) -> String {
    format!("{base_url}/{resource}/{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_formatting() {
        assert_eq!(
            endpoint("http://localhost:3333", "stock", ProductId::new(4)),
            "http://localhost:3333/stock/4"
        );
        assert_eq!(
            endpoint("https://api.example.com/v1", "products", ProductId::new(12)),
            "https://api.example.com/v1/products/12"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound(ProductId::new(8));
        assert_eq!(err.to_string(), "product not found: 8");

        let err = ApiError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30 seconds");

        let err = ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 500 Internal Server Error: boom"
        );
    }
}
