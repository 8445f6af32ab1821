use std::path::PathBuf;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

const JSON_CONTENT_TYPE: &str = "application/json";

pub enum RequestBody {
    Json(serde_json::Value),
    /// The multipart encoder supplies its own boundary content type.
    Multipart(Form),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> ApiResult<Self> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

/// One-shot HTTP transport for the weekly MOD API. No retries, timeouts or
/// caching; every failure is surfaced to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<Option<T>> {
        self.request(Method::GET, endpoint, None).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: RequestBody,
    ) -> ApiResult<Option<T>> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: RequestBody,
    ) -> ApiResult<Option<T>> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<Option<T>> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// Fetches a binary payload and saves it as `filename` in the configured
    /// download directory. Sends a JSON `POST` when `body` is given, a `GET`
    /// otherwise. Returns where the file was written.
    pub async fn download(
        &self,
        endpoint: &str,
        filename: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<PathBuf> {
        let request = match body {
            Some(value) => self.http.post(self.url(endpoint)).json(&value),
            None => self.http.get(self.url(endpoint)),
        };
        debug!(endpoint, filename, "downloading");

        let response = ensure_success(self.authorize(request).send().await?).await?;
        let bytes = response.bytes().await?;

        std::fs::create_dir_all(&self.config.download_dir)?;
        let path = self.config.download_dir.join(filename);
        std::fs::write(&path, &bytes)?;
        debug!(path = %path.display(), size = bytes.len(), "download saved");
        Ok(path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<RequestBody>,
    ) -> ApiResult<Option<T>> {
        debug!(%method, endpoint, "sending request");
        let mut request = self.http.request(method, self.url(endpoint));
        request = match body {
            Some(RequestBody::Json(value)) => request.json(&value),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request.header(CONTENT_TYPE, JSON_CONTENT_TYPE),
        };

        let response = ensure_success(self.authorize(request).send().await?).await?;
        if !is_json(response.headers()) {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), "request failed");
    Err(ApiError::from_status(status, body))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains(JSON_CONTENT_TYPE))
        .unwrap_or(false)
}
