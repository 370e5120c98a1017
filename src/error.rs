//! Error types and handling for the `ForageGuide` service

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the `ForageGuide` service
#[derive(Error, Debug)]
pub enum ForageError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Geocoding service errors; fatal for the request
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Agent orchestration errors
    #[error("Agent error: {message}")]
    Agent { message: String },

    /// The agent endpoint was called without an LLM key configured
    #[error("Agent unavailable: {message}")]
    AgentUnavailable { message: String },

    /// Plant catalog loading errors
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON encoding or decoding errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl ForageError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create a new agent error
    pub fn agent<S: Into<String>>(message: S) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    pub fn agent_unavailable<S: Into<String>>(message: S) -> Self {
        Self::AgentUnavailable {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForageError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            ForageError::Validation { message } => format!("Invalid input: {message}"),
            ForageError::Geocoding { .. } => {
                "Unable to resolve the region. The geocoding service is unavailable.".to_string()
            }
            ForageError::Agent { message } => format!("Agent failed: {message}"),
            ForageError::AgentUnavailable { .. } => {
                "The agent endpoint is disabled. Set OPENAI_API_KEY to enable it.".to_string()
            }
            ForageError::Catalog { .. } => "Plant catalog could not be loaded.".to_string(),
            ForageError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            ForageError::Json { .. } => "Malformed data received.".to_string(),
            ForageError::General { message } => message.clone(),
        }
    }

    /// HTTP status this error maps to
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForageError::Validation { .. } => StatusCode::BAD_REQUEST,
            ForageError::Geocoding { .. } | ForageError::Agent { .. } => StatusCode::BAD_GATEWAY,
            ForageError::AgentUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ForageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.user_message(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
