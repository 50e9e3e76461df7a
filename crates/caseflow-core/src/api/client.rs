//! API client for the caseflow backend.
//!
//! Every request the application makes goes through one `ApiClient`, which
//! runs the configured request stages before sending and the response stages
//! after. Clone is cheap: the reqwest client and the stage lists are shared.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::Session;
use crate::notify::Notifier;
use crate::router::Navigator;

use super::interceptor::{AttachCredential, HandleFailures, LogExchange, RequestStage, ResponseStage};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of every backend endpoint
pub const API_PREFIX: &str = "/api/v1";

/// HTTP request timeout in seconds.
/// Requests running longer are aborted and reported as timeouts.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct ApiClientBuilder {
    server_url: String,
    timeout: Duration,
    request_stages: Vec<Arc<dyn RequestStage>>,
    response_stages: Vec<Arc<dyn ResponseStage>>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append a request stage; stages run in the order they were added.
    pub fn request_stage(mut self, stage: Arc<dyn RequestStage>) -> Self {
        self.request_stages.push(stage);
        self
    }

    /// Append a response stage; stages run in the order they were added.
    pub fn response_stage(mut self, stage: Arc<dyn ResponseStage>) -> Self {
        self.response_stages.push(stage);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = format!("{}{}", self.server_url.trim_end_matches('/'), API_PREFIX);
        debug!(
            %base_url,
            request_stages = ?self.request_stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            response_stages = ?self.response_stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "API client configured"
        );

        Ok(ApiClient {
            client,
            base_url,
            request_stages: self.request_stages.into(),
            response_stages: self.response_stages.into(),
        })
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_stages: Arc<[Arc<dyn RequestStage>]>,
    response_stages: Arc<[Arc<dyn ResponseStage>]>,
}

impl ApiClient {
    /// Start a client with no stages. `server_url` is the origin; the
    /// `/api/v1` prefix is appended.
    pub fn builder(server_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            server_url: server_url.into(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            request_stages: Vec::new(),
            response_stages: Vec::new(),
        }
    }

    /// The application's pipeline: credential attachment on the way out,
    /// centralized failure handling on the way back.
    pub fn for_session(
        server_url: impl Into<String>,
        timeout: Duration,
        session: Arc<Session>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let log = Arc::new(LogExchange);
        Self::builder(server_url)
            .timeout(timeout)
            .request_stage(Arc::new(AttachCredential::new(session.clone())))
            .request_stage(log.clone())
            .response_stage(log)
            .response_stage(Arc::new(HandleFailures::new(session, navigator, notifier)))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/users/me`
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Start a request against an endpoint path. Send it with [`ApiClient::send`]
    /// so that it passes through the pipeline.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Run a request through the pipeline.
    ///
    /// Non-2xx responses come back as errors. Response stages see every
    /// error before it is returned to the caller.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let mut request = match builder.build() {
            Ok(request) => request,
            Err(e) => return Err(self.fail(ApiError::from_transport(e))),
        };

        for stage in self.request_stages.iter() {
            if let Err(e) = stage.on_request(&mut request) {
                return Err(self.fail(e));
            }
        }

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(ApiError::from_transport(e))),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.fail(ApiError::from_status(status, &body)));
        }

        for stage in self.response_stages.iter() {
            stage.on_success(&response);
        }
        Ok(response)
    }

    fn fail(&self, error: ApiError) -> ApiError {
        for stage in self.response_stages.iter() {
            stage.on_failure(&error);
        }
        error
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().clone();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("failed to read body from {}: {}", url, e)))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("failed to parse JSON from {}: {}", url, e)))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::decode(response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Self::decode(response).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    pub async fn post_form<T: DeserializeOwned, F: Serialize + ?Sized>(&self, path: &str, form: &F) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::POST, path).form(form)).await?;
        Self::decode(response).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Self::decode(response).await
    }

    /// DELETE an endpoint, ignoring whatever body the server returns
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server_url: &str) -> ApiClient {
        ApiClient::builder(server_url).build().expect("client")
    }

    #[test]
    fn test_base_url_appends_prefix() {
        assert_eq!(client("http://localhost:8000").base_url(), "http://localhost:8000/api/v1");
        assert_eq!(client("http://localhost:8000/").base_url(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn test_url_joins_paths() {
        let api = client("http://localhost:8000");
        assert_eq!(api.url("/users/me"), "http://localhost:8000/api/v1/users/me");
        assert_eq!(api.url("projects"), "http://localhost:8000/api/v1/projects");
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported_without_sending() {
        let api = client("not a url");
        let err = api.get::<serde_json::Value>("/users/me").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)), "got {:?}", err);
    }
}
