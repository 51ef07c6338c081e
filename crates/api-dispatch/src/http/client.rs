//! reqwest-backed transport.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::redirect::Policy;

use super::request::RequestBody;
use super::response::HttpResponse;
use crate::error::{DispatchError, Result};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Configuration for the HTTP client.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Connect timeout.
    pub connect_timeout: Option<Duration>,
    /// Whether to follow redirects.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow.
    pub max_redirects: usize,
    /// Whether to enable cookie storage.
    pub cookies_enabled: bool,
    /// Default user agent.
    pub user_agent: Option<String>,
    /// Proxy URL.
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            follow_redirects: true,
            max_redirects: 10,
            cookies_enabled: false,
            user_agent: Some(format!("api-dispatch/{} (Rust)", env!("CARGO_PKG_VERSION"))),
            proxy: None,
        }
    }
}

/// Builder for creating an HTTP client with custom configuration.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    default_headers: http::HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
            default_headers: http::HeaderMap::new(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Disable redirect following.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Enable cookie storage across requests.
    pub fn cookies(mut self) -> Self {
        self.config.cookies_enabled = true;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set a proxy URL.
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: HttpClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a default header that will be sent with every request.
    pub fn default_header(
        mut self,
        name: impl TryInto<http::HeaderName>,
        value: impl TryInto<http::HeaderValue>,
    ) -> Result<Self> {
        let name = name
            .try_into()
            .map_err(|_| DispatchError::InvalidHeader("Invalid header name".to_string()))?;
        let value = value
            .try_into()
            .map_err(|_| DispatchError::InvalidHeader("Invalid header value".to_string()))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Build the HTTP client.
    pub fn build(self) -> Result<HttpClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = self.config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if self.config.follow_redirects {
            builder = builder.redirect(Policy::limited(self.config.max_redirects));
        } else {
            builder = builder.redirect(Policy::none());
        }

        if self.config.cookies_enabled {
            builder = builder.cookie_store(true);
        }

        if let Some(ref ua) = self.config.user_agent {
            builder = builder.user_agent(ua);
        }

        if let Some(ref proxy_url) = self.config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| DispatchError::Config(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .default_headers(self.default_headers)
            .build()
            .map_err(|e| DispatchError::Config(e.to_string()))?;

        Ok(HttpClient {
            inner: Arc::new(HttpClientInner {
                client,
                config: self.config,
            }),
        })
    }
}

struct HttpClientInner {
    client: reqwest::Client,
    config: HttpClientConfig,
}

/// The default [`Transport`], sending requests through reqwest.
///
/// The client is cheaply cloneable and thread-safe. Clones share the same
/// underlying connection pool and configuration.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Create a builder for configuring a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Get the client's configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.inner.config
    }

    /// Send a resolved request and wait for the response.
    ///
    /// Error statuses are returned as responses; only failures to obtain a
    /// response at all are errors.
    pub async fn send(&self, request: TransportRequest) -> Result<HttpResponse> {
        let url = url::Url::parse(&request.url)?;

        let mut headers = request.headers;
        if matches!(request.body, RequestBody::Form(_)) {
            drop_bare_multipart_content_type(&mut headers);
        }

        let mut req_builder = self
            .inner
            .client
            .request(request.method.to_reqwest(), url)
            .headers(headers);

        match request.body {
            RequestBody::None => {}
            RequestBody::Json(value) => {
                // Serialized by hand so the caller's Content-Type is kept.
                req_builder = req_builder.body(serde_json::to_vec(&value)?);
            }
            RequestBody::Form(form) => {
                req_builder = req_builder.multipart(form.into_multipart());
            }
        }

        let response = req_builder.send().await?;
        Ok(HttpResponse::from_reqwest(response))
    }
}

impl Transport for HttpClient {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<Box<dyn TransportResponse>>> {
        Box::pin(async move {
            let response = self.send(request).await?;
            Ok(Box::new(response) as Box<dyn TransportResponse>)
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Remove a `multipart/form-data` content type that carries no boundary.
///
/// reqwest appends its own value with the boundary when the multipart body
/// is attached; a bare one would be sent alongside it.
fn drop_bare_multipart_content_type(headers: &mut http::HeaderMap) {
    let bare = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            v.trim().to_ascii_lowercase().starts_with("multipart/form-data")
                && !v.contains("boundary=")
        });
    if bare {
        headers.remove(http::header::CONTENT_TYPE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClientConfig::default();
        assert!(config.timeout.is_none());
        assert!(config.follow_redirects);
        assert_eq!(config.max_redirects, 10);
        assert!(!config.cookies_enabled);
        assert!(config.user_agent.unwrap().starts_with("api-dispatch/"));
    }

    #[test]
    fn test_builder() {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .no_redirects()
            .user_agent("shelf/1.0")
            .build()
            .unwrap();
        assert_eq!(client.config().timeout, Some(Duration::from_secs(5)));
        assert!(!client.config().follow_redirects);
        assert_eq!(client.config().user_agent.as_deref(), Some("shelf/1.0"));
    }

    #[test]
    fn test_invalid_default_header() {
        let result = HttpClient::builder().default_header("bad header", "x");
        assert!(matches!(result, Err(DispatchError::InvalidHeader(_))));
    }

    #[test]
    fn test_drop_bare_multipart_content_type() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("multipart/form-data"),
        );
        drop_bare_multipart_content_type(&mut headers);
        assert!(headers.get(http::header::CONTENT_TYPE).is_none());

        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("multipart/form-data; boundary=abc"),
        );
        drop_bare_multipart_content_type(&mut headers);
        assert!(headers.get(http::header::CONTENT_TYPE).is_some());
    }
}
