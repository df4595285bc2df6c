//! Common error types for the inpainting service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Inference call failed: {0}")]
    ProviderCall(String),

    #[error("No output generated from the model: {0}")]
    ProviderOutput(String),
}

impl AppError {
    /// Shorthand for the fatal missing-setting case raised at startup
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(config::ConfigError::Message(message.into()))
    }
}

/// Error body returned by the processing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Categories are not exposed to the client; every failure is a 500
        // carrying the error message.
        let body = Json(ErrorResponse {
            error: format!("Internal Server Error: {}", self),
        });

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
