//! Error handling

use axum::response::IntoResponse;
use tracing::info;

/// Message used when a failure carries no text of its own
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// definitions for the wallpaper studio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudioError {
    /// No API credential could be found
    Configuration(String),
    /// The provider failed or returned nothing
    Generation(String),
    /// Anything else that went wrong during a generation
    Unknown(String),
    /// When you didn't do the right thing
    BadRequest,
    /// Missing or invalid session / CSRF token
    Unauthorized,
    /// When a requested image is not found
    NotFound(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl StudioError {
    /// Wraps an arbitrary failure, falling back to a generic message when it has none.
    pub fn unknown(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Unknown(UNEXPECTED_ERROR.to_string())
        } else {
            Self::Unknown(message)
        }
    }

    /// The single string shown to the user next to the trigger.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration(message)
            | Self::Generation(message)
            | Self::Unknown(message)
            | Self::InternalServerError(message) => message.clone(),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::BadRequest => "Bad request".to_string(),
            Self::Unauthorized => "Unauthorized: invalid or missing session.".to_string(),
        }
    }
}

impl std::fmt::Display for StudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(message) => write!(f, "Configuration error: {message}"),
            Self::Generation(message) => write!(f, "Generation error: {message}"),
            Self::Unknown(message) => write!(f, "Unknown error: {message}"),
            Self::BadRequest => write!(f, "Bad request"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::NotFound(what) => write!(f, "Not found: {what}"),
            Self::InternalServerError(message) => write!(f, "Internal server error: {message}"),
        }
    }
}

impl std::error::Error for StudioError {}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for StudioError {
    fn from(err: axum::http::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for StudioError {
    fn from(err: tower_sessions::session::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl From<askama::Error> for StudioError {
    fn from(err: askama::Error) -> Self {
        StudioError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for StudioError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            StudioError::BadRequest => {
                info!("Bad request received");
                (axum::http::StatusCode::BAD_REQUEST, "Bad Request".to_string())
            }
            StudioError::Unauthorized => {
                info!("Unauthorized request received");
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    "Unauthorized: invalid or missing session.".to_string(),
                )
            }
            StudioError::NotFound(what) => {
                tracing::error!("404 {what}");
                (axum::http::StatusCode::NOT_FOUND, "Not Found".to_string())
            }
            StudioError::Configuration(message)
            | StudioError::Generation(message)
            | StudioError::Unknown(message) => {
                // these normally stop at the trigger boundary
                tracing::error!("Generation failure escaped to a response: {}", message);
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            StudioError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let mut response = axum::response::Response::new(axum::body::Body::from(body));
        *response.status_mut() = status;
        response
    }
}
