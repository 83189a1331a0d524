//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the async client
//! with the real `ureq` transport through create, read, search, update,
//! delete, every classified status, and an unreachable host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use httpreq_core::{
    ClientConfig, CodecError, Decodable, FieldKind, FieldRef, FieldSpec, Fields, HttpRequestClient,
    MessageKind, ResponseHandler, Serializable,
};

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: String,
    name: String,
    age: i64,
    active: bool,
    score: f64,
}

impl Decodable for User {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::String),
        FieldSpec::new("name", FieldKind::String),
        FieldSpec::new("age", FieldKind::Int),
        FieldSpec::new("active", FieldKind::Bool),
        FieldSpec::new("score", FieldKind::Double),
    ];

    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
        Ok(User {
            id: fields.string("id")?,
            name: fields.string("name")?,
            age: fields.int("age")?,
            active: fields.bool("active")?,
            score: fields.double("score")?,
        })
    }
}

struct NewUser {
    name: String,
    age: i64,
    active: bool,
    score: f64,
}

impl Serializable for NewUser {
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![
            ("name", (&self.name).into()),
            ("age", self.age.into()),
            ("active", self.active.into()),
            ("score", self.score.into()),
        ]
    }
}

struct AgeUpdate {
    age: i64,
}

impl Serializable for AgeUpdate {
    fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        vec![("age", self.age.into())]
    }
}

#[derive(Debug)]
struct SearchResult {
    query: String,
    count: i64,
}

impl Decodable for SearchResult {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("query", FieldKind::String),
        FieldSpec::new("count", FieldKind::Int),
    ];

    fn from_fields(fields: &mut Fields) -> Result<Self, CodecError> {
        Ok(SearchResult {
            query: fields.string("query")?,
            count: fields.int("count")?,
        })
    }
}

#[derive(Default)]
struct CountingHandler {
    not_found: AtomicUsize,
    other: AtomicUsize,
}

impl ResponseHandler for CountingHandler {
    fn on_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::SeqCst);
    }
    fn on_bad_request(&self) {
        self.other.fetch_add(1, Ordering::SeqCst);
    }
    fn on_unauthorized(&self) {
        self.other.fetch_add(1, Ordering::SeqCst);
    }
    fn on_gateway_timeout(&self) {
        self.other.fetch_add(1, Ordering::SeqCst);
    }
    fn on_internal_error(&self) {
        self.other.fetch_add(1, Ordering::SeqCst);
    }
    fn on_unavailable(&self) {
        self.other.fetch_add(1, Ordering::SeqCst);
    }
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn user_lifecycle() {
    let handler = Arc::new(CountingHandler::default());
    let config = ClientConfig::builder(start_server())
        .log_enabled(true)
        .shared_handler(handler.clone())
        .build();
    let client = HttpRequestClient::new(config);

    // Step 1: create.
    let input = NewUser {
        name: "Ada Lovelace".to_string(),
        age: 36,
        active: true,
        score: 4.5,
    };
    let (created, response) = client.post::<User, _>("/users", input, &[], &[]).await;
    let created = created.expect("created user");
    assert_eq!(created.name, "Ada Lovelace");
    assert_eq!(created.age, 36);
    assert!(created.active);
    assert_eq!(created.score, 4.5);
    let response = response.expect("envelope");
    assert!(response.result_message.is_none());
    let id = created.id.clone();

    // Step 2: read it back through a path parameter.
    let (fetched, _) = client
        .get::<User>("/users/{id}", &[], &[("id", id.as_str())])
        .await;
    assert_eq!(fetched, Some(created.clone()));

    // Step 3: search with a query value that needs encoding.
    let (found, _) = client
        .get::<SearchResult>("/search", &[("q", "Ada L")], &[])
        .await;
    let found = found.expect("search result");
    assert_eq!(found.query, "Ada L");
    assert_eq!(found.count, 1);

    // Step 4: update.
    let (updated, _) = client
        .put::<User, _>("/users/{id}", AgeUpdate { age: 37 }, &[], &[("id", id.as_str())])
        .await;
    let updated = updated.expect("updated user");
    assert_eq!(updated.age, 37);
    assert_eq!(updated.name, "Ada Lovelace");

    // Step 5: delete.
    let (removed, _) = client
        .delete::<User>("/users/{id}", &[], &[("id", id.as_str())])
        .await;
    assert_eq!(removed.map(|user| user.id), Some(id.clone()));

    // Step 6: gone, and the 404 hook fires once.
    let (missing, response) = client
        .get::<User>("/users/{id}", &[], &[("id", id.as_str())])
        .await;
    assert!(missing.is_none());
    let message = response.unwrap().result_message.unwrap();
    assert_eq!(message.title, "HTTP_NOT_FOUND");
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(message.message, "Not Found");
    assert_eq!(handler.not_found.load(Ordering::SeqCst), 1);
    assert_eq!(handler.other.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn every_status_is_classified() {
    let handler = Arc::new(CountingHandler::default());
    let config = ClientConfig::builder(start_server())
        .shared_handler(handler.clone())
        .build();
    let client = HttpRequestClient::new(config);

    let cases = [
        (400, "HTTP_BAD_REQUEST", "Bad Request"),
        (401, "HTTP_UNAUTHORIZED", "Unauthorized"),
        (404, "HTTP_NOT_FOUND", "Not Found"),
        (500, "HTTP_INTERNAL_ERROR", "Internal Server Error"),
        (503, "HTTP_UNAVAILABLE", "Service Unavailable"),
        (504, "HTTP_GATEWAY_TIMEOUT", "Gateway Timeout"),
        (418, "UNKNOWN_ERROR", "I'm a teapot"),
    ];
    for (code, title, reason) in cases {
        let code = code.to_string();
        let (result, response) = client
            .get::<SearchResult>("/status/{code}", &[], &[("code", code.as_str())])
            .await;
        assert!(result.is_none(), "{code}");
        let message = response.unwrap().result_message.unwrap();
        assert_eq!(message.title, title, "{code}");
        assert_eq!(message.kind, MessageKind::Error, "{code}");
        assert_eq!(message.message, reason, "{code}");
    }

    assert_eq!(handler.not_found.load(Ordering::SeqCst), 1);
    assert_eq!(handler.other.load(Ordering::SeqCst), 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_host_is_an_exception() {
    let client = HttpRequestClient::new(ClientConfig::new("http://127.0.0.1:1"));

    let (result, response) = client.get::<User>("/users", &[], &[]).await;

    assert!(result.is_none());
    let message = response.unwrap().result_message.unwrap();
    assert_eq!(message.title, "Exception");
    assert_eq!(message.kind, MessageKind::Exception);
    assert!(!message.message.is_empty());
}
