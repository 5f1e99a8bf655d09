use crate::errors::AppError;
use serde_json::Value;
use std::time::Duration;

/// Client for the Talent Protocol REST API.
///
/// Every request carries the `X-API-KEY` header; endpoints are relative paths
/// such as `credentials` or `profiles/{id}/credentials`.
#[derive(Clone)]
pub struct TalentClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TalentClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Talent client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Forwards a GET to `{base_url}/{endpoint}` and returns the JSON body.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Talent API request failed: {}", e))
            })?;

        Self::json_body(response).await
    }

    /// Forwards a POST with a JSON body to `{base_url}/{endpoint}`.
    pub async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Talent API request failed: {}", e))
            })?;

        Self::json_body(response).await
    }

    /// Runs an advanced profile search.
    ///
    /// The upstream API documents this as a GET whose parameters are the JSON
    /// body's top-level keys, each value JSON-encoded into the query string,
    /// so the inbound POST body is re-issued here as a GET.
    pub async fn search_advanced_profiles(&self, body: &Value) -> Result<Value, AppError> {
        let params: Vec<(String, String)> = body
            .as_object()
            .ok_or_else(|| {
                AppError::BadRequest("Search request body must be a JSON object".to_string())
            })?
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search/advanced/profiles", self.base_url),
            &params,
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::debug!("GET {} (advanced search)", url);

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Talent API request failed: {}", e))
            })?;

        Self::json_body(response).await
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Talent API returned {}: {}",
                status, error_text
            )));
        }

        let data = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Talent API response: {}", e))
        })?;

        Ok(data)
    }
}
