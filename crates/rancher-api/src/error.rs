//! Client error types.
//!
//! Four families of failure reach callers:
//!
//! - [`Error::Transport`]: the request never produced an HTTP response
//!   (connect failure, timeout, TLS).
//! - [`Error::Api`]: the server answered with a non-2xx status. The parsed
//!   error body is kept in [`ApiError`].
//! - [`Error::Conflict`]: a mutating call kept receiving 409 until the retry
//!   budget ran out. The last 409 is the source.
//! - [`Error::Client`]: local misuse, never retried (see [`ClientError`]).

use thiserror::Error;

use crate::object::Record;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP round-trip failed before a response arrived.
    #[error("transport error on {method} {url}: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Every attempt of a mutating call was rejected with 409.
    #[error("conflict persisted after {attempts} attempts: {source}")]
    Conflict {
        attempts: u32,
        #[source]
        source: ApiError,
    },

    /// Local usage error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A text body was not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    /// A call that must return an object got an empty or scalar body.
    #[error("expected an object in the response from {url}")]
    UnexpectedBody { url: String },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status carried by this error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(e) => Some(e.status),
            Error::Conflict { source, .. } => Some(source.status),
            _ => None,
        }
    }

    /// The server-side error, for both plain API errors and exhausted conflicts.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) => Some(e),
            Error::Conflict { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is a 409 conflict, retried or not.
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Check if the request never reached the server.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-2xx response from the server.
///
/// `code` and `message` come from the JSON error body when the server sent
/// one; `body` keeps the whole decoded error object for anything else the
/// server put there (`detail`, `fieldName`, ...).
#[derive(Debug, Clone, Error)]
#[error("API error ({status}) {code}: {message}")]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Error code from the body, or `"unknown"`.
    pub code: String,
    /// Error message from the body, or a synthesized `HTTP <status>`.
    pub message: String,
    /// Decoded error body, when it was a JSON object.
    pub body: Option<Record>,
}

impl ApiError {
    /// Build an error from an HTTP status and an already decoded body.
    pub fn from_body(status: u16, body: Option<Record>) -> Self {
        let field = |name: &str| {
            body.as_ref()
                .and_then(|b| b.get(name))
                .and_then(|v| v.to_plain_string())
        };
        let code = field("code").unwrap_or_else(|| "unknown".to_string());
        let message = field("message").unwrap_or_else(|| format!("HTTP {}", status));
        Self {
            status,
            code,
            message,
            body,
        }
    }
}

/// Local usage errors raised before any request is sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// An operation was attempted before a schema was loaded.
    #[error("schema is not loaded")]
    SchemaNotLoaded,

    /// The fetched schema document declared no types.
    #[error("schema document from {url} contains no schema types")]
    EmptySchema { url: String },

    /// The type name is not in the loaded schema.
    #[error("{type_name} is not a valid type")]
    UnknownType { type_name: String },

    /// Strict mode rejected a list filter.
    #[error("{field} is not a searchable field of {type_name}")]
    NotSearchable { type_name: String, field: String },

    /// The object has no link bound under this name.
    #[error("no link named {name}")]
    MissingLink { name: String },

    /// The object has no action bound under this name.
    #[error("no action named {name}")]
    MissingAction { name: String },

    /// No dynamic method is registered under this name.
    #[error("no method named {name}")]
    UnknownMethod { name: String },

    /// A dynamic method was called without an argument it needs.
    #[error("{method} requires {argument}")]
    MissingArgument { method: String, argument: String },
}
