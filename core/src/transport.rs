//! Connection-level transport abstraction and its `ureq` implementation.
//!
//! # Design
//! The executor drives a `Connection` the way a platform URL connection is
//! driven: configure it, optionally write a body, then read the status,
//! which is what actually sends the request. Keeping the trait at this
//! granularity lets tests count every call, `disconnect` in particular,
//! without a network.
//!
//! `UreqConnection` buffers configuration and dispatches on the first
//! status read. Each connection builds its own agent, so nothing is pooled
//! across requests.

use std::sync::Arc;

use ureq::http::Response;
use ureq::tls::{Certificate, RootCerts, TlsConfig};
use ureq::{Agent, Body, RequestBuilder};

use crate::config::TlsFactory;
use crate::error::TransportError;
use crate::http::HttpMethod;

/// Opens connections. Shared by every call a client makes.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;

    fn open(&self, url: &str) -> Result<Self::Connection, TransportError>;
}

/// A single-use connection owned by one in-flight request.
pub trait Connection {
    fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    fn set_method(&mut self, method: HttpMethod) -> Result<(), TransportError>;

    fn set_tls_factory(&mut self, factory: &TlsFactory) -> Result<(), TransportError>;

    /// Mark the connection for output and write the request body.
    fn write_body(&mut self, body: &[u8]) -> Result<(), TransportError>;

    /// Send the request if it has not been sent yet and return the status.
    fn status_code(&mut self) -> Result<u16, TransportError>;

    /// Human-readable reason phrase for the status.
    fn status_reason(&mut self) -> Result<String, TransportError>;

    /// The full response body as text.
    fn read_body(&mut self) -> Result<String, TransportError>;

    /// Release the connection. The executor calls this exactly once.
    fn disconnect(&mut self);
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    type Connection = UreqConnection;

    fn open(&self, url: &str) -> Result<UreqConnection, TransportError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }
        Ok(UreqConnection {
            url: url.to_string(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            tls: None,
            response: None,
            closed: false,
        })
    }
}

pub struct UreqConnection {
    url: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    tls: Option<TlsConfig>,
    response: Option<Response<Body>>,
    closed: bool,
}

impl UreqConnection {
    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    fn agent(&self) -> Agent {
        let mut config = Agent::config_builder().http_status_as_error(false);
        if let Some(tls) = &self.tls {
            config = config.tls_config(tls.clone());
        }
        config.build().new_agent()
    }

    fn dispatch(&mut self) -> Result<Response<Body>, TransportError> {
        let agent = self.agent();
        let url = self.url.as_str();
        let headers = self.headers.as_slice();

        let response = match (self.method, self.body.take()) {
            (HttpMethod::Get, Some(body)) => with_headers(agent.get(url), headers)
                .force_send_body()
                .send(&body[..]),
            (HttpMethod::Get, None) => with_headers(agent.get(url), headers).call(),
            (HttpMethod::Delete, Some(body)) => with_headers(agent.delete(url), headers)
                .force_send_body()
                .send(&body[..]),
            (HttpMethod::Delete, None) => with_headers(agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(agent.post(url), headers).send(&body[..]),
            (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(agent.put(url), headers).send(&body[..]),
            (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
        }?;
        Ok(response)
    }

    fn response(&mut self) -> Result<&mut Response<Body>, TransportError> {
        self.ensure_open()?;
        let response = match self.response.take() {
            Some(response) => response,
            None => self.dispatch()?,
        };
        Ok(self.response.insert(response))
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn tls_config(factory: &TlsFactory) -> TlsConfig {
    let mut builder =
        TlsConfig::builder().disable_verification(factory.accepts_invalid_certificates());
    if !factory.root_certificates().is_empty() {
        let certificates = factory
            .root_certificates()
            .iter()
            .map(|der| Certificate::from_der(der).to_owned())
            .collect::<Vec<_>>();
        builder = builder.root_certs(RootCerts::Specific(Arc::new(certificates)));
    }
    builder.build()
}

impl Connection for UreqConnection {
    fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.headers.push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn set_method(&mut self, method: HttpMethod) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.method = method;
        Ok(())
    }

    fn set_tls_factory(&mut self, factory: &TlsFactory) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.tls = Some(tls_config(factory));
        Ok(())
    }

    fn write_body(&mut self, body: &[u8]) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.body
            .get_or_insert_with(Vec::new)
            .extend_from_slice(body);
        Ok(())
    }

    fn status_code(&mut self) -> Result<u16, TransportError> {
        Ok(self.response()?.status().as_u16())
    }

    fn status_reason(&mut self) -> Result<String, TransportError> {
        let status = self.response()?.status();
        // Codes without a registered phrase report the bare number.
        Ok(status
            .canonical_reason()
            .map_or_else(|| status.as_u16().to_string(), str::to_string))
    }

    fn read_body(&mut self) -> Result<String, TransportError> {
        Ok(self.response()?.body_mut().read_to_string()?)
    }

    fn disconnect(&mut self) {
        self.closed = true;
        self.response = None;
        self.body = None;
    }
}


#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Accept one connection, answer it with `reply`, and hand back the raw
    /// request that arrived.
    fn serve_once(reply: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/items", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0_u8; 1024];
            loop {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
                if request_complete(&raw) {
                    break;
                }
            }
            stream.write_all(reply.as_bytes()).unwrap();
            String::from_utf8(raw).unwrap()
        });
        (url, handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        raw.len() >= end + 4 + length
    }

    const EMPTY_OK: &str = "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}";

    #[test]
    fn delete_sends_a_written_body() {
        let (url, server) = serve_once(EMPTY_OK);
        let mut connection = UreqTransport::new().open(&url).unwrap();
        connection.set_header("Content-Type", "application/json").unwrap();
        connection.write_body(br#"{"v":5}"#).unwrap();
        connection.set_method(HttpMethod::Delete).unwrap();

        assert_eq!(connection.status_code().unwrap(), 200);
        connection.disconnect();

        let request = server.join().unwrap();
        assert!(request.starts_with("DELETE /items HTTP/1.1"), "{request}");
        assert!(request.to_ascii_lowercase().contains("content-length: 7"), "{request}");
        assert!(request.ends_with(r#"{"v":5}"#), "{request}");
    }

    #[test]
    fn get_without_body_sends_none() {
        let (url, server) = serve_once(EMPTY_OK);
        let mut connection = UreqTransport::new().open(&url).unwrap();

        assert_eq!(connection.status_code().unwrap(), 200);
        assert_eq!(connection.read_body().unwrap(), "{}");
        connection.disconnect();

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /items HTTP/1.1"), "{request}");
        assert!(request.ends_with("\r\n\r\n"), "{request}");
    }

    #[test]
    fn unregistered_status_reports_its_number() {
        let (url, server) =
            serve_once("HTTP/1.1 499 Client Gone\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        let mut connection = UreqTransport::new().open(&url).unwrap();

        assert_eq!(connection.status_code().unwrap(), 499);
        assert_eq!(connection.status_reason().unwrap(), "499");
        connection.disconnect();
        server.join().unwrap();
    }

    #[test]
    fn registered_status_reports_its_phrase() {
        let (url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        let mut connection = UreqTransport::new().open(&url).unwrap();

        assert_eq!(connection.status_reason().unwrap(), "Not Found");
        connection.disconnect();
        server.join().unwrap();
    }

    #[test]
    fn open_rejects_non_http_urls() {
        let err = UreqTransport::new().open("ftp://files").err().unwrap();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }

    #[test]
    fn closed_connection_refuses_further_use() {
        let mut connection = UreqTransport::new().open("http://127.0.0.1:1/").unwrap();
        connection.set_header("Accept", "application/json").unwrap();
        connection.write_body(b"{}").unwrap();
        connection.disconnect();
        assert!(matches!(
            connection.set_method(HttpMethod::Post),
            Err(TransportError::Closed)
        ));
        assert!(matches!(connection.status_code(), Err(TransportError::Closed)));
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        let mut connection = UreqTransport::new().open("http://127.0.0.1:1/").unwrap();
        assert!(connection.status_code().is_err());
        connection.disconnect();
    }

    #[test]
    fn tls_factory_is_applied_to_the_connection() {
        let mut connection = UreqTransport::new().open("https://localhost/").unwrap();
        let factory = TlsFactory::new()
            .accept_invalid_certificates(true)
            .root_certificate(vec![0x30_u8, 0x82, 0x01, 0x0a]);
        connection.set_tls_factory(&factory).unwrap();

        let tls = connection.tls.as_ref().unwrap();
        assert!(tls.disable_verification());
        assert!(matches!(tls.root_certs(), RootCerts::Specific(certs) if certs.len() == 1));
    }

    #[test]
    fn default_tls_factory_keeps_verification() {
        let tls = tls_config(&TlsFactory::new());
        assert!(!tls.disable_verification());
        assert!(!matches!(tls.root_certs(), RootCerts::Specific(_)));
    }
}
