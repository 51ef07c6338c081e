//! HTTP response types.

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::error::{DispatchError, Result};
use crate::transport::TransportResponse;

/// An HTTP response from a request.
pub struct HttpResponse {
    inner: reqwest::Response,
}

impl HttpResponse {
    /// Create from a reqwest response.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self { inner: response }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        self.inner.status().is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    /// Get the final URL after redirects.
    pub fn url(&self) -> &str {
        self.inner.url().as_str()
    }

    /// Parse the response body as JSON.
    ///
    /// An empty or malformed body is a [`DispatchError::Json`].
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self
            .inner
            .bytes()
            .await
            .map_err(|e| DispatchError::InvalidBody(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl TransportResponse for HttpResponse {
    fn status(&self) -> u16 {
        HttpResponse::status(self)
    }

    fn ok(&self) -> bool {
        self.is_success()
    }

    fn json(self: Box<Self>) -> BoxFuture<'static, Result<serde_json::Value>> {
        Box::pin(HttpResponse::json::<serde_json::Value>(*self))
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status())
            .field("url", &self.url())
            .finish()
    }
}
