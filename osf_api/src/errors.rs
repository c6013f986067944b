//! Error types for the API client.

use std::fmt;

use crate::envelope::ErrorObject;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body could not be mapped onto the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] DecodeError),
    /// The service answered with a JSON:API `errors` document.
    #[error("Service returned errors: {0}")]
    Service(ServiceErrors),
    /// The API returned a non-success status without a JSON:API error body.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A request body could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Base URLs are joined by concatenation, so they must end with `/`.
    #[error("Base URL must have a trailing slash, but {0:?} does not")]
    InvalidBaseUrl(String),
    /// An upload source could not be opened or inspected.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The caller's cancellation token fired or the deadline passed.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Ways a response body can fail to decode.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Malformed JSON, or JSON that does not fit the requested shape.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// A single-resource document had neither `data` nor `errors`.
    #[error("document has no primary data")]
    MissingData,
    /// A resource that must have been created came back without an id.
    #[error("resource has no id")]
    MissingId,
    /// The resource `type` did not match the endpoint being called.
    #[error("expected resource type {expected:?}, found {found:?}")]
    TypeMismatch { expected: String, found: String },
}

/// Top-level `errors` member of a JSON:API document, kept structured.
#[derive(Debug, Clone)]
pub struct ServiceErrors {
    /// HTTP status of the response that carried the errors.
    pub status: u16,
    pub errors: Vec<ErrorObject>,
}

impl ServiceErrors {
    /// Returns `(pointer, detail)` pairs; the pointer is empty when the
    /// service did not say which member was at fault.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|e| {
            (
                e.source
                    .as_ref()
                    .and_then(|s| s.pointer.as_deref())
                    .unwrap_or(""),
                e.detail.as_str(),
            )
        })
    }
}

impl fmt::Display for ServiceErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (pointer, detail)) in self.pairs().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if pointer.is_empty() {
                write!(f, "{}", detail)?;
            } else {
                write!(f, "{}: {}", pointer, detail)?;
            }
        }
        Ok(())
    }
}

impl Error {
    /// Returns the structured service errors, if this is a service error.
    pub fn service_errors(&self) -> Option<&ServiceErrors> {
        match self {
            Error::Service(errors) => Some(errors),
            _ => None,
        }
    }
}
