//! HTTP client for the Heroku Platform API

use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::HelperError;

const DEFAULT_BASE_URL: &str = "https://api.heroku.com";
const HEROKU_ACCEPT: &str = "application/vnd.heroku+json; version=3";

/// Platform API client, keyed by one API credential per process
pub struct PlatformClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl PlatformClient {
    /// Create a new client against the default API endpoint
    pub fn new(api_key: SecretString) -> Result<Self, HelperError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a new client against a specific API endpoint
    pub fn with_base_url(api_key: SecretString, base_url: &str) -> Result<Self, HelperError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header(header::ACCEPT, HEROKU_ACCEPT)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
    }

    async fn handle<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, HelperError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Platform API request failed: {} - {}", status, body);
            return Err(HelperError::ApiError(format!("{}: {}", status, body)));
        }

        let body = response.json().await?;
        Ok(body)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HelperError> {
        debug!("GET {}", path);
        let response = self.request(reqwest::Method::GET, path).send().await?;
        self.handle(response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HelperError> {
        debug!("POST {}", path);
        let response = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        self.handle(response).await
    }

    /// Make a PATCH request
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HelperError> {
        debug!("PATCH {}", path);
        let response = self
            .request(reqwest::Method::PATCH, path)
            .json(body)
            .send()
            .await?;
        self.handle(response).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, HelperError> {
        debug!("DELETE {}", path);
        let response = self.request(reqwest::Method::DELETE, path).send().await?;
        self.handle(response).await
    }
}
