//! Error types for wx-core

use thiserror::Error;

/// Main error type for wx-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Weather API error: {0}")]
    WeatherApi(String),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Failure of an outbound provider call (weather or LLM)
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::WeatherApi(_) | Error::LlmApi(_) | Error::Http(_))
    }
}

/// Result type alias for wx-core
pub type Result<T> = std::result::Result<T, Error>;
