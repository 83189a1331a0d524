//! Async request client.
//!
//! # Design
//! `HttpRequestClient` holds an `Arc<ClientConfig>` and an `Arc` transport
//! and carries no mutable state between calls. Each call moves its
//! `RequestSpec` onto tokio's blocking pool and awaits the executor there,
//! so the calling task never performs I/O itself. Calls are independent
//! and may run concurrently from clones of the same client.

use std::sync::Arc;

use tracing::warn;

use crate::codec::{Decodable, Serializable};
use crate::config::ClientConfig;
use crate::executor::{self, exception_text, into_outcome};
use crate::http::{HttpMethod, RequestSpec};
use crate::transport::{Transport, UreqTransport};
use crate::types::Outcome;

/// Client bound to one base URL and header set.
pub struct HttpRequestClient<T: Transport = UreqTransport> {
    config: Arc<ClientConfig>,
    transport: Arc<T>,
}

impl<T: Transport> Clone for HttpRequestClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl HttpRequestClient {
    /// Client using the blocking `ureq` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> HttpRequestClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET endpoint`. `query` and `path` may be empty.
    pub async fn get<R>(&self, endpoint: &str, query: &[(&str, &str)], path: &[(&str, &str)]) -> Outcome<R>
    where
        R: Decodable + Send + 'static,
    {
        let spec = RequestSpec::new(HttpMethod::Get, endpoint)
            .query_params(query)
            .path_params(path);
        self.send(spec).await
    }

    /// `POST endpoint` with `body` encoded as JSON.
    pub async fn post<R, B>(
        &self,
        endpoint: &str,
        body: B,
        query: &[(&str, &str)],
        path: &[(&str, &str)],
    ) -> Outcome<R>
    where
        R: Decodable + Send + 'static,
        B: Serializable + Send + 'static,
    {
        let spec = RequestSpec::new(HttpMethod::Post, endpoint)
            .body(body)
            .query_params(query)
            .path_params(path);
        self.send(spec).await
    }

    pub async fn put<R, B>(
        &self,
        endpoint: &str,
        body: B,
        query: &[(&str, &str)],
        path: &[(&str, &str)],
    ) -> Outcome<R>
    where
        R: Decodable + Send + 'static,
        B: Serializable + Send + 'static,
    {
        let spec = RequestSpec::new(HttpMethod::Put, endpoint)
            .body(body)
            .query_params(query)
            .path_params(path);
        self.send(spec).await
    }

    pub async fn delete<R>(&self, endpoint: &str, query: &[(&str, &str)], path: &[(&str, &str)]) -> Outcome<R>
    where
        R: Decodable + Send + 'static,
    {
        let spec = RequestSpec::new(HttpMethod::Delete, endpoint)
            .query_params(query)
            .path_params(path);
        self.send(spec).await
    }

    /// Run a prepared request on the blocking pool.
    pub async fn send<R>(&self, spec: RequestSpec) -> Outcome<R>
    where
        R: Decodable + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let transport = Arc::clone(&self.transport);
        let log = config.log_enabled();

        let joined = tokio::task::spawn_blocking(move || {
            executor::execute::<T, R>(&config, transport.as_ref(), &spec)
        })
        .await;

        match joined {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("request worker did not finish: {err}");
                into_outcome(&exception_text(&err.to_string()), log)
            }
        }
    }
}
