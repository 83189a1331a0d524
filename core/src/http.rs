//! Request description types.
//!
//! # Design
//! A `RequestSpec` is plain data built per call and dropped when the call
//! completes. It holds the endpoint template rather than the final URL; the
//! executor composes the URL against the client's base URL.

use std::fmt;

use crate::codec::Serializable;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered key/value pairs used for path and query parameters.
pub type Params = Vec<(String, String)>;

/// Convert borrowed pairs into owned `Params`.
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// One request, described as data.
pub struct RequestSpec {
    pub method: HttpMethod,
    pub endpoint: String,
    pub path_params: Params,
    pub query_params: Params,
    pub body: Option<Box<dyn Serializable + Send>>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            path_params: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    pub fn path_params(mut self, pairs: &[(&str, &str)]) -> Self {
        self.path_params = params(pairs);
        self
    }

    pub fn query_params(mut self, pairs: &[(&str, &str)]) -> Self {
        self.query_params = params(pairs);
        self
    }

    pub fn body(mut self, body: impl Serializable + Send + 'static) -> Self {
        self.body = Some(Box::new(body));
        self
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("path_params", &self.path_params)
            .field("query_params", &self.query_params)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}
