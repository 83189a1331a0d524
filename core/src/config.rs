//! Client configuration.
//!
//! # Design
//! `ClientConfig` is an immutable value built once through
//! `ClientConfigBuilder` and shared by reference with every request. Nothing
//! in it changes after `build`, so concurrent calls need no locking.

use std::fmt;
use std::sync::Arc;

use crate::handler::ResponseHandler;

const USER_AGENT: &str = concat!("httpreq/", env!("CARGO_PKG_VERSION"));

/// TLS customization applied to every connection a client opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsFactory {
    root_certificates: Vec<Vec<u8>>,
    accept_invalid_certificates: bool,
}

impl TlsFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust only the given DER-encoded root certificates (plus any added
    /// later) instead of the platform defaults.
    pub fn root_certificate(mut self, der: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(der.into());
        self
    }

    /// Skip certificate verification entirely. Development servers only.
    pub fn accept_invalid_certificates(mut self, accept: bool) -> Self {
        self.accept_invalid_certificates = accept;
        self
    }

    pub fn root_certificates(&self) -> &[Vec<u8>] {
        &self.root_certificates
    }

    pub fn accepts_invalid_certificates(&self) -> bool {
        self.accept_invalid_certificates
    }
}

/// Everything a client needs to issue requests.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    headers: Vec<(String, String)>,
    tls_factory: Option<TlsFactory>,
    log_enabled: bool,
    handler: Option<Arc<dyn ResponseHandler>>,
}

impl ClientConfig {
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                base_url: base_url.into(),
                headers: default_headers(),
                tls_factory: None,
                log_enabled: false,
                handler: None,
            },
        }
    }

    /// A config with default headers and nothing else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers in the order they are applied to each connection.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn tls_factory(&self) -> Option<&TlsFactory> {
        self.tls_factory.as_ref()
    }

    pub fn log_enabled(&self) -> bool {
        self.log_enabled
    }

    pub fn handler(&self) -> Option<&dyn ResponseHandler> {
        self.handler.as_deref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("headers", &self.headers)
            .field("tls_factory", &self.tls_factory)
            .field("log_enabled", &self.log_enabled)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

fn default_headers() -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
    ]
}

#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Replace the whole header set, defaults included.
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.config.headers = headers
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Set one header, replacing an existing entry with the same name
    /// (ASCII case-insensitive) in place, or appending it.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .config
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.config.headers.push((key, value)),
        }
        self
    }

    pub fn tls_factory(mut self, factory: TlsFactory) -> Self {
        self.config.tls_factory = Some(factory);
        self
    }

    pub fn log_enabled(mut self, enabled: bool) -> Self {
        self.config.log_enabled = enabled;
        self
    }

    pub fn handler(mut self, handler: impl ResponseHandler + 'static) -> Self {
        self.config.handler = Some(Arc::new(handler));
        self
    }

    pub fn shared_handler(mut self, handler: Arc<dyn ResponseHandler>) -> Self {
        self.config.handler = Some(handler);
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
