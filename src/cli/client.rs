use anyhow::{bail, Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Thin reqwest wrapper around the API: attaches the bearer token and
/// unwraps the `{ "success": true, "data": ... }` envelope.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self.http.request(method, &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let payload: Value = response
            .json()
            .await
            .with_context(|| format!("invalid response body from {}", url))?;

        if status.is_success() {
            Ok(payload.get("data").cloned().unwrap_or(payload))
        } else {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            bail!("{} ({})", message, status);
        }
    }
}
