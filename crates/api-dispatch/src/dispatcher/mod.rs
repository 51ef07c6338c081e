//! The request dispatcher.
//!
//! A [`RequestDispatcher`] owns a host, an auth token, an
//! [`EndpointRegistry`] and a [`Transport`]. Each [`send`](RequestDispatcher::send)
//! resolves a named endpoint into a concrete request, executes it, and folds
//! every outcome, success or failure, into a [`SendResult`].
//!
//! # Example
//!
//! ```ignore
//! use api_dispatch::{EndpointDescriptor, RequestDispatcher, SendOptions};
//!
//! let dispatcher = RequestDispatcher::builder("https://api.example.com")
//!     .token("Bearer abc")
//!     .api("getBook", EndpointDescriptor::get("/books/:bookId").with_auth())
//!     .build()?;
//!
//! let result = dispatcher
//!     .send(SendOptions::new("getBook").path_param("bookId", 42))
//!     .await;
//!
//! if result.ok {
//!     println!("{:?}", result.data);
//! } else {
//!     eprintln!("{} {}", result.status, result.err_msg);
//! }
//! ```

mod options;
mod result;

pub use options::SendOptions;
pub use result::SendResult;

use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use parking_lot::RwLock;

use crate::config::DispatcherConfig;
use crate::error::{DispatchError, Result};
use crate::form::build_form_body;
use crate::http::{HttpClient, HttpClientBuilder, RequestBody};
use crate::registry::{EndpointDescriptor, EndpointRegistry, ErrorMessageTable, StatusMessages};
use crate::template::compute_url;
use crate::transport::{Transport, TransportRequest};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "multipart/form-data";

/// Which transport the builder should install.
enum TransportChoice {
    Default,
    Client(HttpClient),
    ClientBuilder(HttpClientBuilder),
    Custom(Arc<dyn Transport>),
    Disabled,
}

/// Builder for creating a [`RequestDispatcher`].
pub struct RequestDispatcherBuilder {
    host: String,
    token: String,
    apis: EndpointRegistry,
    error_table: ErrorMessageTable,
    default_headers: Vec<(String, String)>,
    transport: TransportChoice,
}

impl RequestDispatcherBuilder {
    /// Create a new builder for the specified host.
    ///
    /// Every endpoint URL template is appended to this host verbatim.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: String::new(),
            apis: EndpointRegistry::new(),
            error_table: ErrorMessageTable::new(),
            default_headers: Vec::new(),
            transport: TransportChoice::Default,
        }
    }

    /// Set the token sent as `Authorization` to endpoints that require auth.
    ///
    /// The value is sent as-is; include any scheme such as `Bearer ` yourself.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Replace the endpoint registry.
    pub fn apis(mut self, apis: EndpointRegistry) -> Self {
        self.apis = apis;
        self
    }

    /// Register a single endpoint.
    pub fn api(mut self, name: impl Into<String>, descriptor: EndpointDescriptor) -> Self {
        self.apis.insert(name, descriptor);
        self
    }

    /// Replace the auxiliary error message table.
    pub fn error_table(mut self, table: ErrorMessageTable) -> Self {
        self.error_table = table;
        self
    }

    /// Set auxiliary error messages for one endpoint name.
    pub fn error_messages(mut self, name: impl Into<String>, messages: StatusMessages) -> Self {
        self.error_table.insert(name, messages);
        self
    }

    /// Add a header sent with every request.
    ///
    /// Default headers override the JSON content type and are themselves
    /// overridden by per-call headers. Invalid names or values are reported
    /// by [`build`](Self::build).
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Send requests through an existing HTTP client.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.transport = TransportChoice::Client(client);
        self
    }

    /// Build the HTTP client from a custom builder.
    pub fn http_client_builder(mut self, builder: HttpClientBuilder) -> Self {
        self.transport = TransportChoice::ClientBuilder(builder);
        self
    }

    /// Send requests through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = TransportChoice::Custom(transport);
        self
    }

    /// Build without a transport. Every `send` then fails with status `0`
    /// until one is installed with [`RequestDispatcher::set_transport`].
    pub fn no_transport(mut self) -> Self {
        self.transport = TransportChoice::Disabled;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Result<RequestDispatcher> {
        let default_headers = parse_headers(&self.default_headers)?;

        let transport: Option<Arc<dyn Transport>> = match self.transport {
            TransportChoice::Default => Some(Arc::new(HttpClientBuilder::new().build()?)),
            TransportChoice::Client(client) => Some(Arc::new(client)),
            TransportChoice::ClientBuilder(builder) => Some(Arc::new(builder.build()?)),
            TransportChoice::Custom(transport) => Some(transport),
            TransportChoice::Disabled => None,
        };

        Ok(RequestDispatcher {
            state: RwLock::new(DispatcherState {
                host: self.host,
                token: self.token,
                apis: self.apis,
                error_table: self.error_table,
                default_headers,
                transport,
            }),
        })
    }
}

struct DispatcherState {
    host: String,
    token: String,
    apis: EndpointRegistry,
    error_table: ErrorMessageTable,
    default_headers: HeaderMap,
    transport: Option<Arc<dyn Transport>>,
}

/// What one `send` needs, copied out of the state before the first await.
struct CallContext {
    host: String,
    token: String,
    descriptor: EndpointDescriptor,
    table_messages: Option<StatusMessages>,
    default_headers: HeaderMap,
    transport: Option<Arc<dyn Transport>>,
}

/// Configuration-driven HTTP request dispatcher.
///
/// All accessors take `&self`; share a dispatcher between tasks with an
/// `Arc`. A `send` works on a snapshot of host, token, descriptor and
/// transport taken when it starts, so setters never affect calls already in
/// flight.
pub struct RequestDispatcher {
    state: RwLock<DispatcherState>,
}

impl RequestDispatcher {
    /// Create a new builder for the specified host.
    pub fn builder(host: impl Into<String>) -> RequestDispatcherBuilder {
        RequestDispatcherBuilder::new(host)
    }

    /// Build a dispatcher from parsed configuration, using the default transport.
    pub fn from_config(config: DispatcherConfig) -> Result<Self> {
        config.into_builder().build()
    }

    /// Resolve, execute and normalize a named request.
    ///
    /// Never fails: every error is reported through the returned
    /// [`SendResult`]. An unknown endpoint name returns status `0` without
    /// touching the transport.
    pub async fn send(&self, options: SendOptions) -> SendResult {
        match self.dispatch(options).await {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    DispatchError::UnknownEndpoint(_) | DispatchError::TransportUnavailable => {
                        tracing::warn!(target: "api_dispatch::dispatcher", "{}", err);
                    }
                    DispatchError::Transport(msg) => {
                        tracing::error!(target: "api_dispatch::dispatcher", "Transport failed: {}", msg);
                    }
                    _ => {
                        tracing::error!(target: "api_dispatch::dispatcher", "Request failed: {}", err);
                    }
                }
                SendResult::from_error(&err)
            }
        }
    }

    async fn dispatch(&self, options: SendOptions) -> Result<SendResult> {
        let context = self.call_context(&options.endpoint)?;
        let request = context.build_request(&options)?;
        let transport = context
            .transport
            .ok_or(DispatchError::TransportUnavailable)?;

        tracing::debug!(
            target: "api_dispatch::dispatcher",
            "Dispatching [{}] {} {}",
            options.endpoint,
            request.method,
            request.url
        );

        let response = transport
            .execute(request)
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        let ok = response.ok();
        let data = response.json().await?;

        let err_msg = resolve_error_message(
            status,
            options.error_messages.as_ref(),
            &context.descriptor.error_messages,
            context.table_messages.as_ref(),
        );

        Ok(SendResult {
            status: i32::from(status),
            ok,
            err_msg,
            data: Some(data),
        })
    }

    fn call_context(&self, endpoint: &str) -> Result<CallContext> {
        let state = self.state.read();
        let descriptor = state
            .apis
            .get(endpoint)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownEndpoint(endpoint.to_string()))?;

        Ok(CallContext {
            host: state.host.clone(),
            token: state.token.clone(),
            descriptor,
            table_messages: state.error_table.get(endpoint).cloned(),
            default_headers: state.default_headers.clone(),
            transport: state.transport.clone(),
        })
    }

    /// Get the host prefix.
    pub fn host(&self) -> String {
        self.state.read().host.clone()
    }

    /// Replace the host prefix.
    pub fn set_host(&self, host: impl Into<String>) {
        self.state.write().host = host.into();
    }

    /// Get the auth token.
    pub fn token(&self) -> String {
        self.state.read().token.clone()
    }

    /// Replace the auth token.
    pub fn set_token(&self, token: impl Into<String>) {
        self.state.write().token = token.into();
    }

    /// Get a copy of the whole endpoint registry.
    pub fn apis(&self) -> EndpointRegistry {
        self.state.read().apis.clone()
    }

    /// Replace the whole endpoint registry.
    pub fn set_apis(&self, apis: EndpointRegistry) {
        self.state.write().apis = apis;
    }

    /// Get the descriptor registered under `name`.
    pub fn api(&self, name: &str) -> Option<EndpointDescriptor> {
        self.state.read().apis.get(name).cloned()
    }

    /// Register or replace the descriptor for `name`.
    pub fn set_api(&self, name: impl Into<String>, descriptor: EndpointDescriptor) {
        self.state.write().apis.insert(name, descriptor);
    }

    /// Unregister `name`, returning its descriptor.
    pub fn remove_api(&self, name: &str) -> Option<EndpointDescriptor> {
        self.state.write().apis.remove(name)
    }

    /// Get a copy of the auxiliary error message table.
    pub fn error_table(&self) -> ErrorMessageTable {
        self.state.read().error_table.clone()
    }

    /// Replace the auxiliary error message table.
    pub fn set_error_table(&self, table: ErrorMessageTable) {
        self.state.write().error_table = table;
    }

    /// Get the auxiliary error messages for `name`.
    pub fn error_messages(&self, name: &str) -> Option<StatusMessages> {
        self.state.read().error_table.get(name).cloned()
    }

    /// Set the auxiliary error messages for `name`.
    pub fn set_error_messages(&self, name: impl Into<String>, messages: StatusMessages) {
        self.state.write().error_table.insert(name, messages);
    }

    /// Whether a transport is installed.
    pub fn has_transport(&self) -> bool {
        self.state.read().transport.is_some()
    }

    /// Install a transport, replacing the current one.
    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        self.state.write().transport = Some(transport);
    }

    /// Remove the transport. Subsequent sends fail with status `0`.
    pub fn clear_transport(&self) {
        self.state.write().transport = None;
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RequestDispatcher")
            .field("host", &state.host)
            .field("has_token", &!state.token.is_empty())
            .field("apis", &state.apis.len())
            .field("has_transport", &state.transport.is_some())
            .finish()
    }
}

impl CallContext {
    fn build_request(&self, options: &SendOptions) -> Result<TransportRequest> {
        let data = options.data.clone().map_err(DispatchError::Json)?;

        let template = format!("{}{}", self.host, self.descriptor.url);
        let url = compute_url(&template, &options.path_params, &options.query);

        let auth = self.descriptor.requires_auth.then_some(self.token.as_str());
        let headers = build_headers(
            &self.default_headers,
            &options.headers,
            options.form_data,
            auth,
        )?;

        let method = self.descriptor.method;
        let body = if !method.allows_body() {
            RequestBody::None
        } else if options.form_data {
            RequestBody::Form(build_form_body(&data))
        } else {
            RequestBody::Json(data)
        };

        Ok(TransportRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Assemble request headers.
///
/// Order matters: JSON content type, dispatcher defaults, caller headers,
/// then the form content type and the auth token. The form content type is
/// applied after the caller merge and therefore wins over a caller value.
fn build_headers(
    defaults: &HeaderMap,
    caller: &[(String, String)],
    form_data: bool,
    auth: Option<&str>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

    let caller = parse_headers(caller)?;
    for (name, value) in defaults.iter().chain(caller.iter()) {
        headers.insert(name.clone(), value.clone());
    }

    if form_data {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
    }
    if let Some(token) = auth {
        let mut value = HeaderValue::from_str(token)?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Convert raw name/value pairs into a header map; later pairs win.
fn parse_headers(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        headers.insert(name, HeaderValue::from_str(value)?);
    }
    Ok(headers)
}

/// Pick the message for `status`: call override, then endpoint default,
/// then auxiliary table, else empty.
fn resolve_error_message(
    status: u16,
    call: Option<&StatusMessages>,
    endpoint: &StatusMessages,
    table: Option<&StatusMessages>,
) -> String {
    call.and_then(|messages| messages.get(status))
        .or_else(|| endpoint.get(status))
        .or_else(|| table.and_then(|messages| messages.get(status)))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
        headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_json_content_type_by_default() {
        let headers = build_headers(&HeaderMap::new(), &[], false, None).unwrap();
        assert_eq!(header(&headers, "content-type"), Some("application/json"));
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let defaults = parse_headers(&pairs(&[("X-Client", "shelf"), ("Accept", "text/plain")])).unwrap();
        let caller = pairs(&[("accept", "application/json"), ("Content-Type", "text/csv")]);
        let headers = build_headers(&defaults, &caller, false, None).unwrap();
        assert_eq!(header(&headers, "x-client"), Some("shelf"));
        assert_eq!(header(&headers, "accept"), Some("application/json"));
        assert_eq!(header(&headers, "content-type"), Some("text/csv"));
    }

    #[test]
    fn test_form_content_type_wins_over_caller() {
        let caller = pairs(&[("Content-Type", "text/csv")]);
        let headers = build_headers(&HeaderMap::new(), &caller, true, None).unwrap();
        assert_eq!(header(&headers, "content-type"), Some("multipart/form-data"));
    }

    #[test]
    fn test_auth_token_is_verbatim() {
        let caller = pairs(&[("Authorization", "from-caller")]);
        let headers = build_headers(&HeaderMap::new(), &caller, false, Some("abc123")).unwrap();
        assert_eq!(header(&headers, "authorization"), Some("abc123"));
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
    }

    #[test]
    fn test_invalid_caller_header() {
        let caller = pairs(&[("bad name", "x")]);
        let err = build_headers(&HeaderMap::new(), &caller, false, None).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHeader(_)));

        let caller = pairs(&[("X-Ok", "line\nbreak")]);
        let err = build_headers(&HeaderMap::new(), &caller, false, None).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidHeader(_)));
    }

    #[test]
    fn test_error_message_precedence() {
        let call = StatusMessages::new().with(400, "call");
        let endpoint = StatusMessages::new().with(400, "endpoint").with(404, "endpoint");
        let table = StatusMessages::new()
            .with(400, "table")
            .with(404, "table")
            .with(500, "table");

        assert_eq!(resolve_error_message(400, Some(&call), &endpoint, Some(&table)), "call");
        assert_eq!(resolve_error_message(404, Some(&call), &endpoint, Some(&table)), "endpoint");
        assert_eq!(resolve_error_message(500, Some(&call), &endpoint, Some(&table)), "table");
        assert_eq!(resolve_error_message(502, Some(&call), &endpoint, Some(&table)), "");
        assert_eq!(resolve_error_message(500, None, &endpoint, None), "");
    }

    #[test]
    fn test_empty_override_falls_through() {
        let call = StatusMessages::new().with(400, "");
        let endpoint = StatusMessages::new().with(400, "endpoint");
        assert_eq!(resolve_error_message(400, Some(&call), &endpoint, None), "endpoint");
    }
}
