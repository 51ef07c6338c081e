//! Declarative dispatcher configuration.
//!
//! A whole dispatcher (host, token, endpoint registry, auxiliary error
//! messages, default headers and transport settings) can be described in
//! TOML or JSON text:
//!
//! ```toml
//! host = "https://api.example.com"
//! token = "Bearer abc"
//!
//! [headers]
//! Accept = "application/json"
//!
//! [apis.getBook]
//! url = "/books/:bookId"
//! method = "GET"
//! requires_auth = true
//! error_messages = { "404" = "no such book" }
//!
//! [error_messages.getBook]
//! "500" = "the library is closed"
//!
//! [transport]
//! timeout_ms = 5000
//! user_agent = "shelf/1.0"
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatcher::RequestDispatcherBuilder;
use crate::error::Result;
use crate::http::HttpClientBuilder;
use crate::registry::{EndpointRegistry, ErrorMessageTable};

/// Settings for the default reqwest transport.
///
/// Unset fields keep the [`HttpClientConfig`](crate::http::HttpClientConfig) defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
    /// Maximum redirects to follow; `0` disables redirects.
    pub max_redirects: Option<usize>,
    /// Keep cookies between requests.
    pub cookies: bool,
    /// User agent override.
    pub user_agent: Option<String>,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
}

impl TransportSettings {
    /// Translate into an HTTP client builder.
    pub fn client_builder(&self) -> HttpClientBuilder {
        let mut builder = HttpClientBuilder::new();
        if let Some(ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        match self.max_redirects {
            Some(0) => builder = builder.no_redirects(),
            Some(max) => builder = builder.max_redirects(max),
            None => {}
        }
        if self.cookies {
            builder = builder.cookies();
        }
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(ref proxy) = self.proxy {
            builder = builder.proxy(proxy.clone());
        }
        builder
    }
}

/// Everything needed to construct a [`RequestDispatcher`](crate::RequestDispatcher).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Prefix for every endpoint URL template.
    pub host: String,
    /// Token sent to endpoints that require auth.
    #[serde(default)]
    pub token: String,
    /// Endpoint registry.
    #[serde(default)]
    pub apis: EndpointRegistry,
    /// Auxiliary per-endpoint error messages.
    #[serde(default)]
    pub error_messages: ErrorMessageTable,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Default transport settings.
    #[serde(default)]
    pub transport: TransportSettings,
}

impl DispatcherConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        tracing::debug!(
            target: "api_dispatch::config",
            "Loaded TOML config for {} with {} endpoints",
            config.host,
            config.apis.len()
        );
        Ok(config)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        tracing::debug!(
            target: "api_dispatch::config",
            "Loaded JSON config for {} with {} endpoints",
            config.host,
            config.apis.len()
        );
        Ok(config)
    }

    /// Turn the configuration into a dispatcher builder.
    ///
    /// The builder can still be adjusted, e.g. to inject a custom transport.
    pub fn into_builder(self) -> RequestDispatcherBuilder {
        let client = self.transport.client_builder();
        self.headers.into_iter().fold(
            RequestDispatcherBuilder::new(self.host)
                .token(self.token)
                .apis(self.apis)
                .error_table(self.error_messages)
                .http_client_builder(client),
            |builder, (name, value)| builder.default_header(name, value),
        )
    }
}
