use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::product::Product;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("upstream unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    #[error("{context}: upstream returned {status}")]
    Status {
        context: &'static str,
        status: StatusCode,
    },
    #[error("malformed upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Read access to a product catalogue.
///
/// The relay handlers are written against this trait so they can be driven
/// by something other than the live upstream.
pub trait ProductSource: Send + Sync + 'static {
    fn top_products(
        &self,
        category: &str,
        min_price: f64,
        max_price: f64,
        top: i64,
    ) -> impl Future<Output = Result<Vec<Product>, ClientError>> + Send;

    fn product_details(
        &self,
        category: &str,
        product_id: &str,
    ) -> impl Future<Output = Result<Product, ClientError>> + Send;
}

/// HTTP client for the upstream e-commerce API.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_http(config.base_url.clone(), builder.build()?))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn top_products_url(
        &self,
        category: &str,
        min_price: f64,
        max_price: f64,
        top: i64,
    ) -> String {
        format!(
            "{}/categories/{}/products?top={}&minPrice={:.2}&maxPrice={:.2}",
            self.base_url, category, top, min_price, max_price
        )
    }

    pub fn product_details_url(&self, category: &str, product_id: &str) -> String {
        format!("{}/categories/{}/products/{}", self.base_url, category, product_id)
    }

    /// Single GET, no retries. Anything but 200 is an error.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &'static str,
    ) -> Result<T, ClientError> {
        tracing::debug!(url, "querying upstream");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Status { context, status });
        }

        // Read the whole body first so that a bad payload surfaces as Decode
        // rather than as a transport error.
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ProductSource for UpstreamClient {
    async fn top_products(
        &self,
        category: &str,
        min_price: f64,
        max_price: f64,
        top: i64,
    ) -> Result<Vec<Product>, ClientError> {
        let url = self.top_products_url(category, min_price, max_price, top);
        self.fetch(&url, "error fetching top products").await
    }

    async fn product_details(
        &self,
        category: &str,
        product_id: &str,
    ) -> Result<Product, ClientError> {
        let url = self.product_details_url(category, product_id);
        self.fetch(&url, "error fetching product details").await
    }
}
