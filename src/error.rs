//! Error types for the Arca SDK.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur when using the Arca SDK.
#[derive(Error, Debug)]
pub enum ArcaError {
    /// The API key was rejected (HTTP 401) or was never provided.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The server returned a non-2xx response other than 401.
    #[error("{0}")]
    Api(ApiError),

    /// A network or transport error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to serialize a request or deserialize a response body.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A request argument was rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid configuration (malformed base URL, unreadable config file, ...).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArcaError {
    /// HTTP status code associated with this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArcaError::Auth(_) => None,
            ArcaError::Api(err) => Some(err.status),
            ArcaError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn unauthorized() -> Self {
        ArcaError::Auth("Invalid API key".to_string())
    }
}

/// Structured error returned by the Arca API.
///
/// The server attaches optional guidance to most failures, e.g. a `suggestion`
/// on how to fix a malformed WHERE clause and the `problematic_query` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Primary error message from the server.
    pub message: String,
    /// What went wrong, in plain language.
    pub details: Option<String>,
    /// How to fix it.
    pub suggestion: Option<String>,
    /// Low-level error text from the storage engine.
    pub technical_details: Option<String>,
    /// The SQL fragment that triggered the failure.
    pub problematic_query: Option<String>,
}

impl ApiError {
    /// An error carrying only a status and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            suggestion: None,
            technical_details: None,
            problematic_query: None,
        }
    }

    /// Build an error from a raw response body.
    ///
    /// `default_message` is used when the body carries no `error` key.
    pub(crate) fn from_body(status: u16, body: &str, default_message: &str) -> Self {
        if body.trim().is_empty() {
            return Self::new(status, default_message);
        }

        let parsed = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => {
                return Self {
                    details: Some(body.trim().to_string()),
                    ..Self::new(status, default_message)
                }
            }
        };

        Self {
            status,
            message: guidance(&parsed, "error")
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| default_message.to_string()),
            details: guidance(&parsed, "details"),
            suggestion: guidance(&parsed, "suggestion"),
            technical_details: guidance(&parsed, "technicalDetails"),
            problematic_query: guidance(&parsed, "problematicQuery"),
        }
    }
}

/// A string field as-is; any other non-null JSON value in its compact form.
fn guidance(body: &Map<String, Value>, key: &str) -> Option<String> {
    match body.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error (status {}): {}", self.status, self.message)?;
        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        if let Some(query) = &self.problematic_query {
            write!(f, "\nProblematic Query: {query}")?;
        }
        if let Some(technical) = &self.technical_details {
            write!(f, "\nTechnical Details: {technical}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Convenience type alias for SDK results.
pub type ArcaResult<T> = Result<T, ArcaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_every_populated_field_in_order() {
        let err = ApiError {
            status: 400,
            message: "Type mismatch in comparison".into(),
            details: Some("Cannot compare VARCHAR column 'name' with TIMESTAMP value".into()),
            suggestion: Some("Use CAST to convert types".into()),
            technical_details: Some("operator does not exist: character varying >= timestamp".into()),
            problematic_query: Some("name >= CURRENT_DATE - INTERVAL 1 DAY".into()),
        };

        let text = err.to_string();
        assert!(text.starts_with("API Error (status 400): Type mismatch in comparison"));
        let details = text.find("\nDetails: ").unwrap();
        let suggestion = text.find("\nSuggestion: ").unwrap();
        let query = text.find("\nProblematic Query: ").unwrap();
        let technical = text.find("\nTechnical Details: ").unwrap();
        assert!(details < suggestion && suggestion < query && query < technical);
    }

    #[test]
    fn display_skips_missing_fields() {
        let err = ApiError::new(500, "Something went wrong");
        assert_eq!(err.to_string(), "API Error (status 500): Something went wrong");
    }

    #[test]
    fn from_body_reads_camel_case_keys() {
        let body = r#"{
            "error": "Table not found",
            "details": "The table 'ghost' does not exist in your account",
            "suggestion": "Use list_tables() to see available tables",
            "technicalDetails": "no such file",
            "problematicQuery": "SELECT * FROM ghost"
        }"#;

        let err = ApiError::from_body(404, body, "fallback");
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Table not found");
        assert_eq!(err.technical_details.as_deref(), Some("no such file"));
        assert_eq!(err.problematic_query.as_deref(), Some("SELECT * FROM ghost"));
    }

    #[test]
    fn from_body_falls_back_on_empty_or_non_json() {
        let empty = ApiError::from_body(502, "", "Request failed with status 502");
        assert_eq!(empty.message, "Request failed with status 502");
        assert_eq!(empty.details, None);

        let html = ApiError::from_body(502, "<html>Bad Gateway</html>", "Export failed");
        assert_eq!(html.message, "Export failed");
        assert_eq!(html.details.as_deref(), Some("<html>Bad Gateway</html>"));

        let no_error_key = ApiError::from_body(400, r#"{"details":"d"}"#, "Request failed with status 400");
        assert_eq!(no_error_key.message, "Request failed with status 400");
        assert_eq!(no_error_key.details.as_deref(), Some("d"));
    }

    #[test]
    fn status_is_exposed_for_server_errors_only() {
        assert_eq!(ArcaError::Api(ApiError::new(409, "conflict")).status(), Some(409));
        assert_eq!(ArcaError::Validation("x".into()).status(), None);
        assert_eq!(ArcaError::unauthorized().status(), None);
    }
}
