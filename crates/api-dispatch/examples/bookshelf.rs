//! Bookshelf client example.
//!
//! Loads a dispatcher from TOML and talks to an in-memory library through a
//! custom transport, so it runs without a network.
//!
//! Run with: cargo run -p api-dispatch --example bookshelf

use std::collections::BTreeMap;
use std::sync::Arc;

use api_dispatch::http::{HttpMethod, RequestBody};
use api_dispatch::transport::{Transport, TransportRequest, TransportResponse};
use api_dispatch::{DispatcherConfig, Result, SendOptions, SendResult};
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::{Value, json};

const CONFIG: &str = r#"
host = "https://library.invalid"
token = "Bearer librarian"

[headers]
Accept = "application/json"

[apis.listBooks]
url = "/books"
method = "GET"

[apis.getBook]
url = "/books/:bookId"
method = "GET"
error_messages = { "404" = "no such book" }

[apis.addBook]
url = "/books"
method = "POST"
requires_auth = true

[error_messages.addBook]
"401" = "only librarians may add books"
"#;

/// A tiny library kept in memory.
#[derive(Default)]
struct Library {
    books: Mutex<BTreeMap<u64, Value>>,
}

struct Reply {
    status: u16,
    body: Value,
}

impl TransportResponse for Reply {
    fn status(&self) -> u16 {
        self.status
    }

    fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn json(self: Box<Self>) -> BoxFuture<'static, Result<Value>> {
        Box::pin(async move { Ok(self.body) })
    }
}

impl Library {
    fn handle(&self, request: &TransportRequest) -> Reply {
        let path = request
            .url
            .trim_start_matches("https://library.invalid")
            .split('?')
            .next()
            .unwrap_or_default();
        let mut books = self.books.lock();

        match (request.method, path) {
            (HttpMethod::Get, "/books") => Reply {
                status: 200,
                body: Value::Array(books.values().cloned().collect()),
            },
            (HttpMethod::Post, "/books") => {
                if request.header("authorization") != Some("Bearer librarian") {
                    return Reply { status: 401, body: json!({}) };
                }
                let RequestBody::Json(book) = &request.body else {
                    return Reply { status: 400, body: json!({}) };
                };
                let id = books.len() as u64 + 1;
                let mut book = book.clone();
                book["id"] = json!(id);
                books.insert(id, book.clone());
                Reply { status: 201, body: book }
            }
            (HttpMethod::Get, other) => {
                let found = other
                    .strip_prefix("/books/")
                    .and_then(|id| id.parse::<u64>().ok())
                    .and_then(|id| books.get(&id).cloned());
                match found {
                    Some(book) => Reply { status: 200, body: book },
                    None => Reply { status: 404, body: json!({"error": "not found"}) },
                }
            }
            _ => Reply { status: 405, body: json!({}) },
        }
    }
}

impl Transport for Library {
    fn execute(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<Box<dyn TransportResponse>>> {
        let reply = self.handle(&request);
        Box::pin(async move { Ok(Box::new(reply) as Box<dyn TransportResponse>) })
    }
}

fn report(label: &str, result: &SendResult) {
    if result.ok {
        println!("{label}: {} {}", result.status, result.data.as_ref().unwrap_or(&Value::Null));
    } else {
        println!("{label}: {} \"{}\"", result.status, result.err_msg);
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("Bookshelf example");
    println!("=================");
    println!();

    let config = DispatcherConfig::from_toml_str(CONFIG).expect("Failed to parse config");
    let dispatcher = config
        .into_builder()
        .transport(Arc::new(Library::default()))
        .build()
        .expect("Failed to build dispatcher");

    for title in ["Dune", "Solaris"] {
        let result = dispatcher
            .send(SendOptions::new("addBook").data(json!({"title": title})))
            .await;
        report("addBook", &result);
    }

    report("listBooks", &dispatcher.send(SendOptions::new("listBooks")).await);
    report(
        "getBook(1)",
        &dispatcher.send(SendOptions::new("getBook").path_param("bookId", 1)).await,
    );
    report(
        "getBook(99)",
        &dispatcher.send(SendOptions::new("getBook").path_param("bookId", 99)).await,
    );

    // Without the token, the table message for 401 applies.
    dispatcher.set_token("");
    report(
        "addBook (anonymous)",
        &dispatcher
            .send(SendOptions::new("addBook").data(json!({"title": "Ubik"})))
            .await,
    );

    // Unknown names never reach the transport.
    report("burnBook", &dispatcher.send(SendOptions::new("burnBook")).await);
}
