//! Endpoint descriptors and the name-to-descriptor registry.
//!
//! A registry is usually declared once, either in code:
//!
//! ```
//! use api_dispatch::{EndpointDescriptor, EndpointRegistry};
//!
//! let apis: EndpointRegistry = [
//!     ("listBooks", EndpointDescriptor::get("/accounts/:accountId/books")),
//!     (
//!         "createBook",
//!         EndpointDescriptor::post("/accounts/:accountId/books")
//!             .with_auth()
//!             .error_message(409, "book already exists"),
//!     ),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert_eq!(apis.len(), 2);
//! ```
//!
//! or deserialized from configuration text (see [`DispatcherConfig`](crate::DispatcherConfig)).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// Human-readable messages keyed by HTTP status code.
///
/// Serialized as a map with string keys (`{"404": "not found"}`) so the same
/// shape works in TOML and JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct StatusMessages(BTreeMap<u16, String>);

impl StatusMessages {
    /// Create an empty message map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, status: u16, message: impl Into<String>) -> Self {
        self.insert(status, message);
        self
    }

    /// Set the message for `status`, returning the previous one.
    pub fn insert(&mut self, status: u16, message: impl Into<String>) -> Option<String> {
        self.0.insert(status, message.into())
    }

    /// The message for `status`, if one is configured and non-empty.
    pub fn get(&self, status: u16) -> Option<&str> {
        self.0
            .get(&status)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Number of configured statuses, empty messages included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no status is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(status, message)` pairs in ascending status order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.0.iter().map(|(status, message)| (*status, message.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for StatusMessages {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(status, message)| (status, message.into()))
                .collect(),
        )
    }
}

impl TryFrom<BTreeMap<String, String>> for StatusMessages {
    type Error = String;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(key, message)| {
                key.trim()
                    .parse::<u16>()
                    .map(|status| (status, message))
                    .map_err(|_| format!("invalid status code key `{key}`"))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl From<StatusMessages> for BTreeMap<String, String> {
    fn from(messages: StatusMessages) -> Self {
        messages
            .0
            .into_iter()
            .map(|(status, message)| (status.to_string(), message))
            .collect()
    }
}

/// Configuration of one logical API operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Path template appended to the dispatcher host, e.g. `/books/:bookId`.
    pub url: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Whether the dispatcher token is sent in the `Authorization` header.
    #[serde(default)]
    pub requires_auth: bool,
    /// Per-status messages used when no call-level override applies.
    #[serde(default, skip_serializing_if = "StatusMessages::is_empty")]
    pub error_messages: StatusMessages,
}

impl EndpointDescriptor {
    /// Create a descriptor without auth or error messages.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            requires_auth: false,
            error_messages: StatusMessages::new(),
        }
    }

    /// A GET endpoint.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// A POST endpoint.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// A PUT endpoint.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, url)
    }

    /// A DELETE endpoint.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// A PATCH endpoint.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, url)
    }

    /// A HEAD endpoint.
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, url)
    }

    /// Send the dispatcher token with this endpoint.
    pub fn with_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// Add a default message for `status`.
    pub fn error_message(mut self, status: u16, message: impl Into<String>) -> Self {
        self.error_messages.insert(status, message);
        self
    }

    /// Replace all default messages.
    pub fn error_messages(mut self, messages: StatusMessages) -> Self {
        self.error_messages = messages;
        self
    }
}

/// Mapping from logical request names to endpoint descriptors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointRegistry(HashMap<String, EndpointDescriptor>);

impl EndpointRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, descriptor: EndpointDescriptor) -> Self {
        self.insert(name, descriptor);
        self
    }

    /// Register `descriptor` under `name`, returning the one it replaces.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: EndpointDescriptor,
    ) -> Option<EndpointDescriptor> {
        self.0.insert(name.into(), descriptor)
    }

    /// Unregister `name`, returning its descriptor.
    pub fn remove(&mut self, name: &str) -> Option<EndpointDescriptor> {
        self.0.remove(name)
    }

    /// Look up the descriptor registered under `name`.
    pub fn get(&self, name: &str) -> Option<&EndpointDescriptor> {
        self.0.get(name)
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of registered endpoints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no endpoint is registered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate over `(name, descriptor)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EndpointDescriptor)> {
        self.0.iter().map(|(name, descriptor)| (name.as_str(), descriptor))
    }
}

impl<S: Into<String>> FromIterator<(S, EndpointDescriptor)> for EndpointRegistry {
    fn from_iter<I: IntoIterator<Item = (S, EndpointDescriptor)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, descriptor)| (name.into(), descriptor))
                .collect(),
        )
    }
}

impl<S: Into<String>> Extend<(S, EndpointDescriptor)> for EndpointRegistry {
    fn extend<I: IntoIterator<Item = (S, EndpointDescriptor)>>(&mut self, iter: I) {
        for (name, descriptor) in iter {
            self.insert(name, descriptor);
        }
    }
}

/// Auxiliary per-endpoint error messages, keyed by endpoint name.
///
/// Consulted after call-level overrides and the descriptor's own messages.
/// A name with no entry behaves like an empty [`StatusMessages`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMessageTable(HashMap<String, StatusMessages>);

impl ErrorMessageTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, messages: StatusMessages) -> Self {
        self.insert(name, messages);
        self
    }

    /// Set the messages for `name`, returning the previous ones.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        messages: StatusMessages,
    ) -> Option<StatusMessages> {
        self.0.insert(name.into(), messages)
    }

    /// Messages configured for `name`.
    pub fn get(&self, name: &str) -> Option<&StatusMessages> {
        self.0.get(name)
    }

    /// Message for `status` under `name`, treating a missing entry as empty.
    pub fn message(&self, name: &str, status: u16) -> Option<&str> {
        self.get(name).and_then(|messages| messages.get(status))
    }

    /// Number of endpoint names with messages.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, StatusMessages)> for ErrorMessageTable {
    fn from_iter<I: IntoIterator<Item = (S, StatusMessages)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, messages)| (name.into(), messages))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_messages_skip_empty() {
        let messages = StatusMessages::new().with(400, "bad request").with(500, "");
        assert_eq!(messages.get(400), Some("bad request"));
        assert_eq!(messages.get(500), None);
        assert_eq!(messages.get(404), None);
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_status_messages_string_keys() {
        let messages: StatusMessages =
            serde_json::from_value(json!({"400": "bad request", "503": "down"})).unwrap();
        assert_eq!(messages.get(400), Some("bad request"));
        assert_eq!(messages.get(503), Some("down"));

        let back = serde_json::to_value(&messages).unwrap();
        assert_eq!(back, json!({"400": "bad request", "503": "down"}));

        let invalid = serde_json::from_value::<StatusMessages>(json!({"oops": "x"}));
        assert!(invalid.is_err());
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: EndpointDescriptor =
            serde_json::from_value(json!({"url": "/v1/test", "method": "get"})).unwrap();
        assert_eq!(descriptor, EndpointDescriptor::get("/v1/test"));
        assert!(!descriptor.requires_auth);
        assert!(descriptor.error_messages.is_empty());
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = EndpointDescriptor::post("/books")
            .with_auth()
            .error_message(400, "bad request");
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert!(descriptor.requires_auth);
        assert_eq!(descriptor.error_messages.get(400), Some("bad request"));
    }

    #[test]
    fn test_registry_replace_and_remove() {
        let mut registry = EndpointRegistry::new().with("test", EndpointDescriptor::get("/a"));
        let previous = registry.insert("test", EndpointDescriptor::put("/b"));
        assert_eq!(previous.map(|d| d.url), Some("/a".to_string()));
        assert_eq!(registry.get("test").map(|d| d.method), Some(HttpMethod::Put));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove("test").is_some());
        assert!(!registry.contains("test"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_error_table_missing_entry() {
        let table = ErrorMessageTable::new()
            .with("known", StatusMessages::new().with(500, "server error"));
        assert_eq!(table.message("known", 500), Some("server error"));
        assert_eq!(table.message("known", 404), None);
        assert_eq!(table.message("unknown", 500), None);
    }
}
