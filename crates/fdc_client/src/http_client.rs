//! HTTP client implementation for the FoodData Central API.
//!
//! This module provides a reqwest-based implementation of the [`FdcClient`](crate::FdcClient) trait.

use crate::{FdcClient, FdcError, FdcFood, SearchResult};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};

/// Only the SR Legacy dataset reports per-100g values for every record.
const SEARCH_DATA_TYPE: &str = "SR Legacy";

/// Client for the FoodData Central API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestFdcClient {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl ReqwestFdcClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the FDC API (e.g., "https://api.nal.usda.gov/fdc")
    /// * `api_key` - The data.gov API key
    /// * `timeout` - Upper bound for every request, connect through body
    pub fn new(base_url: &str, api_key: SecretString, timeout: Duration) -> Result<Self, FdcError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Build a GET request carrying the API key.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .query(&[("api_key", self.api_key.expose_secret())])
    }

    /// Execute a request and decode a JSON body.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FdcError> {
        let resp = request.send().await?;
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        // Read the body first so decode failures can quote it.
        let text = resp.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            let body_snippet: String = text.chars().take(256).collect();
            FdcError::Decode(format!("{e} - body: {body_snippet}"))
        })
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> FdcError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();
        FdcError::from_status(status, body_snippet)
    }
}

#[async_trait]
impl FdcClient for ReqwestFdcClient {
    async fn search_foods(&self, query: &str, page_size: u32) -> Result<Vec<FdcFood>, FdcError> {
        let url = format!("{}/v1/foods/search", self.base_url);
        let page_size = page_size.to_string();
        let qp = [
            ("query", query),
            ("pageSize", page_size.as_str()),
            ("dataType", SEARCH_DATA_TYPE),
        ];

        let start = Instant::now();
        let result: Result<SearchResult, FdcError> =
            self.execute_json(self.get_request(&url).query(&qp)).await;
        tracing::debug!(query, elapsed = ?start.elapsed(), ok = result.is_ok(), "fdc search");
        Ok(result?.foods)
    }

    async fn get_food(&self, fdc_id: u64) -> Result<FdcFood, FdcError> {
        let url = format!("{}/v1/food/{}", self.base_url, fdc_id);

        let start = Instant::now();
        let result = self.execute_json(self.get_request(&url)).await;
        tracing::debug!(fdc_id, elapsed = ?start.elapsed(), ok = result.is_ok(), "fdc food details");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let client = ReqwestFdcClient::new(
            "http://localhost/fdc/",
            SecretString::new("key".into()),
            Duration::from_secs(1),
        )
        .expect("client");
        assert_eq!(client.base_url, "http://localhost/fdc");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = ReqwestFdcClient::new(
            "http://localhost",
            SecretString::new("sekrit".into()),
            Duration::from_secs(1),
        )
        .expect("client");
        assert!(!format!("{client:?}").contains("sekrit"));
    }
}
