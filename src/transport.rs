//! The HTTP transport boundary.
//!
//! [`RestClient`](crate::RestClient) never talks to the network directly. It
//! builds a [`TransportRequest`] with a fully resolved URL, a header set
//! computed for that call only, an optional buffered body and optional
//! platform credentials, and hands it to a [`Transport`]. The default
//! implementation is [`ReqwestTransport`].

use crate::auth::{AuthScheme, Credentials};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use url::Url;

/// A failure reported by a [`Transport`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The transport gave up waiting for the server.
    #[error("transport timed out")]
    Timeout,

    /// The transport cannot be used the way the request asks for.
    #[error("unsupported by transport: {0}")]
    Unsupported(String),

    /// Anything else (connection refused, DNS failure, broken body stream).
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// A single outgoing request.
#[derive(Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The absolute URL.
    pub url: Url,
    /// Headers for this request only.
    pub headers: HeaderMap,
    /// The fully buffered body, if any.
    pub body: Option<Bytes>,
    /// Platform credentials the transport should negotiate with.
    pub credentials: Option<Credentials>,
}

impl TransportRequest {
    /// Creates a request with no headers, body or credentials.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            credentials: None,
        }
    }
}

impl fmt::Debug for TransportRequest {
    // Headers and body may carry secrets.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("header_count", &self.headers.len())
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("credentials", &self.credentials.as_ref().map(|c| c.scheme))
            .finish()
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Creates a response with the given status and body and no headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The canonical reason phrase of the status code.
    pub fn reason(&self) -> Option<&'static str> {
        self.status.canonical_reason()
    }
}

/// Executes HTTP requests on behalf of a client.
///
/// Implementations must be safe to share between concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and buffers the whole response.
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// A [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Other(Box::new(error))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = self
            .http_client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(credentials) = request.credentials {
            match credentials.scheme {
                AuthScheme::Basic => {
                    builder = builder.basic_auth(credentials.username, Some(credentials.password));
                }
                scheme => {
                    return Err(TransportError::Unsupported(format!(
                        "{} credentials require a platform transport",
                        scheme
                    )));
                }
            }
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
