//!
//! # Client Error Handling
//!
//! This module defines `ClientError`, the single error type returned by the API client,
//! the session storage, and the controllers.
//!
//! Two families of failure exist: transport failures (no response was received) and
//! application failures (the server answered with a non-success status, or with a success
//! status that carries a server-reported error). A 401 answer gets its own variant because
//! it always ends the session, whichever endpoint produced it.
//!
//! `From` implementations for `reqwest::Error`, `serde_json::Error`, `std::io::Error` and
//! `validator::ValidationErrors` allow the `?` operator throughout the crate.

use serde_json::Value;
use std::fmt;
use validator::ValidationErrors;

/// Represents all possible errors that can occur on the client side.
#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response (connection refused, DNS failure, ...).
    Transport(String),
    /// The server answered 401. The stored session is no longer valid.
    Unauthorized(String),
    /// The server answered with any other non-success status.
    /// `body` holds the JSON error payload when the server sent one.
    Api { status: u16, body: Option<Value> },
    /// The server answered with a success status but reported a failure in the body.
    Rejected(String),
    /// Input was refused locally, before any request was sent.
    Validation(String),
    /// A task id is not present in the local cache.
    NotFound(String),
    /// Reading or writing the persisted key-value store failed.
    Storage(String),
    /// A response body could not be decoded into the expected shape.
    Decode(String),
}

impl ClientError {
    /// Returns `true` if this error must end the current session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Returns the server-provided `error` (or `detail`) string carried by the failure, if any.
    /// For `Unauthorized` this falls back to a generic explanation when the server sent none.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected(msg) | ClientError::Unauthorized(msg) => Some(msg),
            ClientError::Api {
                body: Some(body), ..
            } => body
                .get("error")
                .or_else(|| body.get("detail"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Transport Error: {}", msg),
            ClientError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ClientError::Api { status, body } => match body {
                Some(body) => write!(f, "API Error ({}): {}", status, body),
                None => write!(f, "API Error ({})", status),
            },
            ClientError::Rejected(msg) => write!(f, "Rejected: {}", msg),
            ClientError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            ClientError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ClientError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            ClientError::Decode(msg) => write!(f, "Decode Error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Converts `reqwest::Error` into `ClientError`.
///
/// Body decoding failures become `ClientError::Decode`; everything else happened before a
/// usable response existed and becomes `ClientError::Transport`.
impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> ClientError {
        if error.is_decode() {
            ClientError::Decode(error.to_string())
        } else {
            ClientError::Transport(error.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> ClientError {
        ClientError::Decode(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> ClientError {
        ClientError::Storage(error.to_string())
    }
}

/// Converts `validator::ValidationErrors` into `ClientError::Validation`.
impl From<ValidationErrors> for ClientError {
    fn from(error: ValidationErrors) -> ClientError {
        ClientError::Validation(error.to_string())
    }
}
