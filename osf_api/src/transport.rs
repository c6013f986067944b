//! One HTTP request in, raw bytes and response metadata out.
//!
//! The transport knows nothing about JSON:API. It never looks at the body;
//! status handling and decoding happen in [`crate::Client`] and
//! [`crate::codec`].

use reqwest::{
    header::{HeaderMap, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
    Method, StatusCode,
};
use url::Url;

use crate::Error;

/// User agent sent with every request.
pub const USER_AGENT_VALUE: &str = concat!("osf-rs/", env!("CARGO_PKG_VERSION"));

/// Body of an outgoing request.
pub enum RequestBody {
    Empty,
    /// A serialized JSON:API document.
    Json(Vec<u8>),
    /// Opaque bytes streamed to the server, e.g. a file upload.
    Stream {
        body: reqwest::Body,
        content_length: Option<u64>,
    },
}

pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: RequestBody::Empty,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// URL the response came from, after any redirects.
    pub url: Url,
    pub body: Vec<u8>,
}

/// Thin wrapper over a caller-configured `reqwest::Client`.
///
/// Authentication lives in the wrapped client (default headers, middleware,
/// etc.). Cloning is cheap and clones share the connection pool.
#[derive(Clone, Debug)]
pub struct Transport {
    http: reqwest::Client,
}

impl Transport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Sends one request and reads the whole response body.
    pub async fn send(&self, request: TransportRequest) -> Result<TransportResponse, Error> {
        tracing::debug!("{} {}", request.method, request.url);

        let builder = self
            .http
            .request(request.method, request.url)
            .header(ACCEPT, "*/*")
            .header(USER_AGENT, USER_AGENT_VALUE);
        let builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(bytes),
            RequestBody::Stream {
                body,
                content_length,
            } => {
                let builder = builder.header(CONTENT_TYPE, "application/octet-stream");
                match content_length {
                    Some(len) => builder.header(CONTENT_LENGTH, len).body(body),
                    None => builder.body(body),
                }
            }
        };

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request: {}", e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let url = resp.url().clone();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;

        Ok(TransportResponse {
            status,
            headers,
            url,
            body: body.to_vec(),
        })
    }
}
