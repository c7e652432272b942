//! services/api/src/error.rs
//!
//! Defines the primary error type for the API service and the mapping of core
//! errors onto HTTP responses.

use axum::http::StatusCode;
use pantry_planner_core::{GenerateError, PortError};
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying database migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The error half of every REST handler's return type.
pub type HandlerError = (StatusCode, String);

/// Maps a port failure onto a response. `context` is logged, never sent to the client.
pub fn port_error_response(context: &str, e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Conflict(message) => (StatusCode::CONFLICT, message),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Unexpected(_) => {
            error!("{}: {:?}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

pub fn generate_error_response(e: GenerateError) -> HandlerError {
    match e {
        GenerateError::NoRecipes => (StatusCode::NOT_FOUND, e.to_string()),
        GenerateError::Port(port) => port_error_response("Failed to generate grocery list", port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_the_resource_message() {
        let (status, message) =
            port_error_response("ignored", PortError::NotFound("List not found".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "List not found");
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let (status, message) = port_error_response(
            "Failed to fetch pantry",
            PortError::Unexpected("connection refused".to_string()),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to fetch pantry");
    }

    #[test]
    fn empty_recipe_set_is_a_404() {
        let (status, message) = generate_error_response(GenerateError::NoRecipes);
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "No recipes found to generate list from.");
    }

    #[test]
    fn infrastructure_failure_during_generation_is_a_500() {
        let (status, _) = generate_error_response(GenerateError::Port(PortError::Unexpected(
            "timeout".to_string(),
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
