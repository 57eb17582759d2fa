use serde_json::{json, Value};
use shared::error::ApiErrorBody;
use thiserror::Error;

use crate::dialog::DialogVariant;

pub const GENERIC_REQUEST_MESSAGE: &str = "Request failed";
pub const CONNECTION_ERROR_MESSAGE: &str = "Connection error";
pub const UNEXPECTED_BODY_MESSAGE: &str = "Unexpected response body";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No HTTP status was obtained: connect, DNS, timeout or body read.
    Transport,
    /// The server answered with a non-success status.
    Api,
    /// A success response whose body did not match the expected shape.
    Decode,
}

/// Uniform failure surfaced by [`crate::http::RequestClient`].
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message} (status {status_code})")]
pub struct RequestFailure {
    pub message: String,
    pub status_code: u16,
    pub details: Option<Value>,
}

impl RequestFailure {
    pub fn transport(original_error: impl std::fmt::Display) -> Self {
        Self {
            message: CONNECTION_ERROR_MESSAGE.to_string(),
            status_code: 0,
            details: Some(json!({ "originalError": original_error.to_string() })),
        }
    }

    /// Builds an API failure from the parsed error body, if any.
    pub fn api(status_code: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(ApiErrorBody::from_value)
            .and_then(|parsed| parsed.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| GENERIC_REQUEST_MESSAGE.to_string());
        Self {
            message,
            status_code,
            details: body,
        }
    }

    pub fn decode(status_code: u16, error: impl std::fmt::Display) -> Self {
        Self {
            message: UNEXPECTED_BODY_MESSAGE.to_string(),
            status_code,
            details: Some(json!({ "originalError": error.to_string() })),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self.status_code {
            0 => FailureKind::Transport,
            200..=299 => FailureKind::Decode,
            _ => FailureKind::Api,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == FailureKind::Transport
    }

    /// The structured error body, when the server sent one.
    pub fn error_body(&self) -> Option<ApiErrorBody> {
        match self.kind() {
            FailureKind::Api => self.details.as_ref().and_then(ApiErrorBody::from_value),
            _ => None,
        }
    }

    /// Per-field messages from a `{ details: [...] }` error body.
    pub fn detail_messages(&self) -> Vec<String> {
        self.error_body()
            .map(|body| body.details)
            .unwrap_or_default()
    }

    /// Text to show the user: joined details, then the server message,
    /// then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        let Some(body) = self.error_body() else {
            return fallback.to_string();
        };
        if !body.details.is_empty() {
            return body.details.join(", ");
        }
        body.message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DialogError {
    #[error("dialog variant '{0}' not found")]
    UnknownVariant(String),
    #[error("no {0} dialog template is mounted")]
    TemplateMissing(DialogVariant),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("form has no field named '{0}'")]
    UnknownField(String),
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),
}
