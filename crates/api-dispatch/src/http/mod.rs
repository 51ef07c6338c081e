//! HTTP types and the default reqwest transport.
//!
//! # Example
//!
//! ```ignore
//! use api_dispatch::http::HttpClient;
//! use api_dispatch::RequestDispatcher;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("shelf/1.0")
//!     .build()?;
//!
//! let dispatcher = RequestDispatcher::builder("https://api.example.com")
//!     .http_client(client)
//!     .build()?;
//! ```

mod client;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};
pub use request::{HttpMethod, RequestBody};
pub use response::HttpResponse;
