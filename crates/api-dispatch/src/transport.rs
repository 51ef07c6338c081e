//! The seam between the dispatcher and the network.
//!
//! [`RequestDispatcher`](crate::RequestDispatcher) builds a [`TransportRequest`]
//! and hands it to a [`Transport`]. The crate ships one implementation on
//! top of reqwest ([`HttpClient`](crate::http::HttpClient)); tests and
//! embedders can supply their own.
//!
//! # Example
//!
//! ```
//! use api_dispatch::transport::{Transport, TransportRequest, TransportResponse};
//! use api_dispatch::Result;
//! use futures_util::future::BoxFuture;
//!
//! struct Offline;
//!
//! impl Transport for Offline {
//!     fn execute(
//!         &self,
//!         _request: TransportRequest,
//!     ) -> BoxFuture<'_, Result<Box<dyn TransportResponse>>> {
//!         Box::pin(async {
//!             Err::<Box<dyn TransportResponse>, _>(api_dispatch::DispatchError::Transport(
//!                 "Failed to fetch".into(),
//!             ))
//!         })
//!     }
//! }
//! ```

use futures_util::future::BoxFuture;

use crate::error::Result;
use crate::http::{HttpMethod, RequestBody};

/// A fully resolved request, ready for the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: HttpMethod,
    /// The absolute request URL, query string included.
    pub url: String,
    /// Request headers.
    pub headers: http::HeaderMap,
    /// Request body. Always [`RequestBody::None`] for GET and HEAD.
    pub body: RequestBody,
}

impl TransportRequest {
    /// Get a header value as text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A response produced by a [`Transport`].
pub trait TransportResponse: Send {
    /// The HTTP status code.
    fn status(&self) -> u16;

    /// Whether the status is in the 2xx range.
    fn ok(&self) -> bool;

    /// Read the body and parse it as JSON.
    fn json(self: Box<Self>) -> BoxFuture<'static, Result<serde_json::Value>>;
}

/// Something that can execute HTTP requests.
///
/// Returning `Err` means no response was obtained at all (connection
/// refused, DNS failure, invalid URL); the dispatcher reports that as a
/// transport failure with status `-1`. Error statuses such as 404 or 500
/// are responses and must be returned as `Ok`.
pub trait Transport: Send + Sync {
    /// Execute a single request.
    fn execute(&self, request: TransportRequest)
    -> BoxFuture<'_, Result<Box<dyn TransportResponse>>>;
}
