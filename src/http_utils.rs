//! HTTP client for the command API, used by `cmdctl`.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;

use crate::cli_utils;

/// Content type of RFC 6902 JSON Patch documents.
pub const JSON_PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

/// A non-success response from the server.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Status code the server answered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl Error for HttpError {}

/// Thin reqwest wrapper rooted at a server's base URL.
pub struct CommandApiClient {
    client: Client,
    base_url: String,
}

impl CommandApiClient {
    /// Creates a client for the server at `base_url`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Constructs a full API URL from a path
    pub fn api_url(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/api/{}", self.base_url, path)
    }

    /// Makes a GET request and handles the response
    pub async fn get<T>(&self, path: &str) -> Result<T, Box<dyn Error>>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(self.api_url(path)).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// Makes a POST request with JSON body and handles the response
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Box<dyn Error>>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let response = self.client.post(self.api_url(path)).json(body).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// Makes a PUT request with JSON body; the server answers without a body.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<(), Box<dyn Error>>
    where
        B: serde::Serialize,
    {
        let response = self.client.put(self.api_url(path)).json(body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Sends a JSON Patch document with PATCH.
    pub async fn patch_json(
        &self,
        path: &str,
        patch: &serde_json::Value,
    ) -> Result<(), Box<dyn Error>> {
        let body = serde_json::to_vec(patch)?;
        let response = self
            .client
            .patch(self.api_url(path))
            .header(reqwest::header::CONTENT_TYPE, JSON_PATCH_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Makes a DELETE request and returns the success status.
    ///
    /// `204 No Content` means something was deleted; `200 OK` means there was nothing to delete.
    pub async fn delete(&self, path: &str) -> Result<StatusCode, Box<dyn Error>> {
        let response = self.client.delete(self.api_url(path)).send().await?;
        Ok(ensure_success(response).await?.status())
    }
}

async fn ensure_success(response: Response) -> Result<Response, Box<dyn Error>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error = response.text().await.unwrap_or_default();
    let message = if error.is_empty() {
        "No error details".to_string()
    } else {
        error
    };
    Err(Box::new(HttpError { status, message }))
}

/// Execute an HTTP operation and exit on error with formatted message
pub async fn execute_or_exit<T, F, Fut>(operation: F, context: &str) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, Box<dyn Error>>>,
{
    match operation().await {
        Ok(result) => result,
        Err(e) => cli_utils::exit_with_error(&format!("{}: {}", context, e)),
    }
}
