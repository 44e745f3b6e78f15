//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{chatbot, fetch_weather, health, suggestions, weather_data};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Stored observations
        .route("/weather-data", get(weather_data))
        // Live fetch + persist
        .route("/fetch-weather", post(fetch_weather))
        // Location autocomplete
        .route("/suggestions", get(suggestions))
        // Weather chatbot
        .route("/chatbot", post(chatbot))
}
