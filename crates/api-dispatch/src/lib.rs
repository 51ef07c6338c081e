//! Declarative HTTP request dispatching.
//!
//! This crate centralizes endpoint configuration for HTTP API clients.
//! Instead of building URLs, headers and bodies at every call site, you
//! register named endpoints once and send requests by name:
//!
//! - **Registry**: [`EndpointDescriptor`]s (URL template, method, auth flag,
//!   per-status messages) keyed by name in an [`EndpointRegistry`]
//! - **Templating**: `:param` placeholders and query strings via [`compute_url`]
//! - **Bodies**: JSON by default, multipart forms via [`build_form_body`]
//! - **Results**: every call yields a [`SendResult`], never an error
//!
//! # Example
//!
//! ```ignore
//! use api_dispatch::{EndpointDescriptor, RequestDispatcher, SendOptions};
//! use serde_json::json;
//!
//! let dispatcher = RequestDispatcher::builder("https://api.example.com")
//!     .token("Bearer my-token")
//!     .api("listBooks", EndpointDescriptor::get("/accounts/:accountId/books"))
//!     .api(
//!         "createBook",
//!         EndpointDescriptor::post("/accounts/:accountId/books")
//!             .with_auth()
//!             .error_message(400, "the book is missing a title"),
//!     )
//!     .build()?;
//!
//! // GET https://api.example.com/accounts/a1/books?limit=10
//! let books = dispatcher
//!     .send(SendOptions::new("listBooks").path_param("accountId", "a1").query("limit", 10))
//!     .await;
//!
//! // POST with a JSON body and the token in `Authorization`
//! let created = dispatcher
//!     .send(
//!         SendOptions::new("createBook")
//!             .path_param("accountId", "a1")
//!             .data(json!({"title": "Dune"})),
//!     )
//!     .await;
//!
//! if !created.ok {
//!     eprintln!("{}: {}", created.status, created.err_msg);
//! }
//! ```
//!
//! # Result statuses
//!
//! | `status` | meaning |
//! |---|---|
//! | `0` | local error: unknown endpoint, missing transport, invalid header, unparsable body |
//! | `-1` | the transport failed (network error) |
//! | `> 0` | the HTTP status of the response |
//!
//! # Transports
//!
//! Requests go through the [`Transport`](transport::Transport) trait. The
//! default implementation is [`HttpClient`](http::HttpClient), built on
//! reqwest; inject your own with
//! [`RequestDispatcherBuilder::transport`].
//!
//! # Logging
//!
//! The crate emits [`tracing`] events under the `api_dispatch::*` targets
//! and never installs a subscriber itself.

mod config;
mod dispatcher;
mod error;
mod form;
pub mod http;
mod registry;
mod template;
pub mod transport;

pub use config::{DispatcherConfig, TransportSettings};
pub use dispatcher::{RequestDispatcher, RequestDispatcherBuilder, SendOptions, SendResult};
pub use error::{DispatchError, Result};
pub use form::{FormPayload, build_form_body};
pub use registry::{EndpointDescriptor, EndpointRegistry, ErrorMessageTable, StatusMessages};
pub use template::{compute_url, encode_uri};

pub use crate::http::HttpMethod;
