use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use super::models::ArmErrorResponse;
use super::transport::TransportConfig;

pub const API_VERSION: &str = "2018-06-01";
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Azure Resource Manager client scoped to one API version
#[derive(Clone)]
pub struct ArmClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    api_version: String,
}

impl ArmClient {
    /// Create a new API client with default transport settings
    pub fn new(endpoint: &str, access_token: &str) -> Result<Self, ApiError> {
        Self::with_config(endpoint, access_token, TransportConfig::default())
    }

    pub fn with_config(
        endpoint: &str,
        access_token: &str,
        transport: TransportConfig,
    ) -> Result<Self, ApiError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                endpoint,
                parsed.scheme()
            )));
        }

        let http_client = transport.build_client()?;
        let base_url = endpoint.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {}", access_token);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header,
                api_version: API_VERSION.to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.inner.base_url, path, self.inner.api_version
        )
    }

    /// GET an entity; a 404 is reported as `None`
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ApiError> {
        let url = self.url(path);
        tracing::debug!("GET request to: {}", url);

        let response = self
            .inner
            .http_client
            .get(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("{} not found", path);
            return Ok(None);
        }
        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }
        self.parse_success_response(response).await.map(Some)
    }

    /// PUT a full entity body, replacing whatever exists at `path`
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!("PUT request to: {}", url);

        let response = self
            .inner
            .http_client
            .put(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }
        self.parse_success_response(response).await
    }

    /// POST an action without a body, such as `/start`
    pub async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        tracing::debug!("POST request to: {}", url);

        let response = self
            .inner
            .http_client
            .post(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        if !response.status().is_success() {
            return self.handle_error_response(response).await;
        }
        Ok(())
    }

    /// DELETE an entity; returns false when nothing was there
    pub async fn delete(&self, path: &str) -> Result<bool, ApiError> {
        let url = self.url(path);
        tracing::debug!("DELETE request to: {}", url);

        let response = self
            .inner
            .http_client
            .delete(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(false),
            status if status.is_success() => Ok(true),
            _ => self.handle_error_response(response).await,
        }
    }

    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        if status == StatusCode::UNAUTHORIZED.as_u16() {
            return Err(ApiError::AuthError(status));
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let (code, message) = match serde_json::from_str::<ArmErrorResponse>(&text) {
            Ok(err_resp) => (err_resp.error.code, err_resp.error.message),
            Err(_) => (String::new(), text),
        };

        Err(ApiError::ApiError {
            status,
            code,
            message,
        })
    }
}
