//! Stock API client used by the dashboard.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;

use crate::dashboard::models::{MovementDraft, ProductView};

#[derive(Debug, Error)]
pub enum StockApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

#[automock]
#[async_trait]
pub trait StockApi: Send + Sync {
    /// Fetch every product.
    async fn fetch_products(&self) -> Result<Vec<ProductView>, StockApiError>;

    /// Submit a movement and return the server-confirmed product.
    async fn submit_movement(&self, movement: MovementDraft) -> Result<ProductView, StockApiError>;
}

/// [`StockApi`] over the JSON HTTP surface.
#[derive(Debug, Clone)]
pub struct HttpStockApi {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HttpStockApi {
    /// `base_url` is the server root, e.g. `"http://localhost:8698"`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            http: Client::new(),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn checked(response: Response) -> Result<Response, StockApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();

        Err(StockApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MovementResponse {
    product: ProductView,
}

#[async_trait]
impl StockApi for HttpStockApi {
    async fn fetch_products(&self) -> Result<Vec<ProductView>, StockApiError> {
        let url = format!("{}/api/products", self.base_url);

        let response = self.authorized(self.http.get(&url)).send().await?;

        Ok(Self::checked(response).await?.json().await?)
    }

    async fn submit_movement(&self, movement: MovementDraft) -> Result<ProductView, StockApiError> {
        let url = format!("{}/api/movements", self.base_url);

        let response = self
            .authorized(self.http.post(&url))
            .json(&movement)
            .send()
            .await?;

        let parsed: MovementResponse = Self::checked(response).await?.json().await?;

        Ok(parsed.product)
    }
}
