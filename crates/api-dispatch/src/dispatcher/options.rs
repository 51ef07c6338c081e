//! Per-call options for [`RequestDispatcher::send`](super::RequestDispatcher::send).

use std::fmt::Display;

use serde::Serialize;
use serde_json::Value;

use crate::registry::StatusMessages;

/// Everything a single `send` call can vary.
///
/// | Option | Default |
/// |---|---|
/// | path params | none (placeholders stay as written) |
/// | query | none (no `?` appended) |
/// | data | `{}` |
/// | form data | off (JSON body) |
/// | headers | none |
/// | error messages | none (endpoint and table messages apply) |
///
/// # Example
///
/// ```
/// use api_dispatch::SendOptions;
/// use serde_json::json;
///
/// let options = SendOptions::new("updateBook")
///     .path_param("accountId", "a1")
///     .path_param("bookId", 42)
///     .query("notify", true)
///     .data(json!({"title": "Dune"}))
///     .header("X-Request-Id", "r-1")
///     .error_message(409, "somebody else edited this book");
///
/// assert_eq!(options.endpoint(), "updateBook");
/// ```
#[derive(Clone, Debug)]
pub struct SendOptions {
    pub(crate) endpoint: String,
    pub(crate) path_params: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) data: Result<Value, String>,
    pub(crate) form_data: bool,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) error_messages: Option<StatusMessages>,
}

impl SendOptions {
    /// Options for the endpoint registered under `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            data: Ok(Value::Object(Default::default())),
            form_data: false,
            headers: Vec::new(),
            error_messages: None,
        }
    }

    /// The endpoint name these options target.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Substitute `value` for every `:name` in the URL template.
    pub fn path_param(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.path_params.push((name.into(), value.to_string()));
        self
    }

    /// Add several path parameters.
    pub fn path_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Display,
    {
        self.path_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Append a query parameter. Pairs keep their insertion order.
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append several query parameters.
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Display,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.to_string())));
        self
    }

    /// Set the request data from a serializable value.
    ///
    /// Sent as JSON, or as form fields when [`form_data`](Self::form_data)
    /// is set. A value that fails to serialize makes the call fail with
    /// status `0`.
    pub fn data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_value(data).map_err(|e| e.to_string());
        self
    }

    /// Send the data as `multipart/form-data` instead of JSON.
    pub fn form_data(mut self) -> Self {
        self.form_data = true;
        self
    }

    /// Add a request header. Later values replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several request headers.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Override the message reported for `status` on this call only.
    pub fn error_message(mut self, status: u16, message: impl Into<String>) -> Self {
        self.error_messages
            .get_or_insert_with(StatusMessages::new)
            .insert(status, message);
        self
    }

    /// Replace all call-level message overrides.
    pub fn error_messages(mut self, messages: StatusMessages) -> Self {
        self.error_messages = Some(messages);
        self
    }
}
