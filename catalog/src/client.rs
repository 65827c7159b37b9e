//! Remote data client for the `Food` collection.
//!
//! [`FoodApi`] is the seam the store's effects call through. [`HttpFoodApi`]
//! talks to the REST backend; tests and offline runs use
//! [`InMemoryFoodApi`](crate::mocks::InMemoryFoodApi).

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::types::{FoodId, FoodItem, FoodPayload};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Operations on the food collection.
///
/// Every call resolves to the server's representation or an [`ApiError`]
/// whose `Display` is the message shown to the user. No call is retried.
pub trait FoodApi: Send + Sync {
    /// List items, optionally filtered by name on the server
    fn list(
        &self,
        filter: Option<&str>,
    ) -> impl Future<Output = Result<Vec<FoodItem>, ApiError>> + Send;

    /// Create an item; the server assigns the id
    fn create(
        &self,
        payload: &FoodPayload,
    ) -> impl Future<Output = Result<FoodItem, ApiError>> + Send;

    /// Update an item by id
    fn update(
        &self,
        id: &FoodId,
        payload: &FoodPayload,
    ) -> impl Future<Output = Result<FoodItem, ApiError>> + Send;

    /// Delete an item by id
    fn delete(&self, id: &FoodId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// [`FoodApi`] over HTTP
#[derive(Clone, Debug)]
pub struct HttpFoodApi {
    client: Client,
    base_url: String,
}

impl HttpFoodApi {
    /// Build a client with the configured timeout and JSON headers
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] if the underlying HTTP client cannot be
    /// constructed (for example, TLS backend initialisation failure).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// The base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/Food", self.base_url)
    }

    fn item_url(&self, id: &FoodId) -> String {
        format!("{}/Food/{id}", self.base_url)
    }

    /// Send a request and fail on a non-success status
    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
        .await;

        if let Err(error) = &result {
            tracing::warn!(kind = ?error.kind(), %error, "Food API request failed");
        }
        result
    }

    /// Send a request and decode its JSON body
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await.map_err(|e| {
            let error = ApiError::from(e);
            tracing::warn!(kind = ?error.kind(), %error, "Failed to read response body");
            error
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            let error = ApiError::InvalidResponse(e.to_string());
            tracing::warn!(kind = ?error.kind(), %error, "Unexpected response body");
            error
        })
    }
}

impl FoodApi for HttpFoodApi {
    #[tracing::instrument(skip(self))]
    async fn list(&self, filter: Option<&str>) -> Result<Vec<FoodItem>, ApiError> {
        let url = self.collection_url();
        tracing::debug!(method = "GET", %url, "Sending request");

        let mut request = self.client.get(&url);
        if let Some(name) = filter {
            request = request.query(&[("name", name)]);
        }

        Self::send_json(request).await
    }

    #[tracing::instrument(skip(self, payload))]
    async fn create(&self, payload: &FoodPayload) -> Result<FoodItem, ApiError> {
        let url = self.collection_url();
        tracing::debug!(method = "POST", %url, "Sending request");

        Self::send_json(self.client.post(&url).json(payload)).await
    }

    #[tracing::instrument(skip(self, payload), fields(id = %id))]
    async fn update(&self, id: &FoodId, payload: &FoodPayload) -> Result<FoodItem, ApiError> {
        let url = self.item_url(id);
        tracing::debug!(method = "PUT", %url, "Sending request");

        Self::send_json(self.client.put(&url).json(payload)).await
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: &FoodId) -> Result<(), ApiError> {
        let url = self.item_url(id);
        tracing::debug!(method = "DELETE", %url, "Sending request");

        // The server echoes the deleted record; only the status matters.
        Self::send(self.client.delete(&url)).await.map(drop)
    }
}
