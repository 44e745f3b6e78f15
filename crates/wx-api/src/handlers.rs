//! HTTP API handlers
//!
//! Request handlers for weather data, autocomplete and the chatbot.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use wx_core::chat::ConversationTurn;
use wx_core::suggest::{Suggestion, suggest};
use wx_core::weather::{WeatherDetails, WeatherSnapshot, lookup};

use crate::error::{ApiError, Result};
use crate::server::AppState;

/// Location used when a request does not name one
pub const DEFAULT_LOCATION: &str = "Chicago";

// ============================================================================
// Request/Response types
// ============================================================================

/// `?location=` query of the stored-data endpoint
#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    pub location: Option<String>,
}

/// Body of the live fetch endpoint
#[derive(Debug, Default, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub location: Option<String>,
}

/// Live fetch response payload
#[derive(Debug, Serialize)]
pub struct FetchResponse {
    pub message: String,
    pub data: WeatherDetails,
}

/// `?query=` of the autocomplete endpoint
#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub query: String,
}

/// Chatbot request payload
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User message
    pub message: String,
}

fn location_or_default(location: Option<String>) -> String {
    location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Most recent stored observation for a location
///
/// 200 with a one-element array, or 404 with an empty array.
pub async fn weather_data(
    State(state): State<AppState>,
    Query(params): Query<LocationQuery>,
) -> Result<(StatusCode, Json<Vec<WeatherSnapshot>>)> {
    let location = location_or_default(params.location);
    debug!("Weather data request: {}", location);

    match lookup(&state.store, &location)? {
        Some(snapshot) => Ok((StatusCode::OK, Json(vec![snapshot]))),
        None => {
            debug!("No stored weather for {}", location);
            Ok((StatusCode::NOT_FOUND, Json(Vec::new())))
        }
    }
}

/// Fetch live weather, persist it and return the details
pub async fn fetch_weather(
    State(state): State<AppState>,
    Json(req): Json<FetchRequest>,
) -> Result<Json<FetchResponse>> {
    let location = location_or_default(req.location);
    debug!("Fetch weather request: {}", location);

    let fetched = match state.gateway.fetch(&location).await {
        Ok(Some(fetched)) => fetched,
        Ok(None) => return Err(ApiError::FetchFailed),
        Err(e) if e.is_upstream() => {
            warn!("Weather provider call failed for {}: {}", location, e);
            return Err(ApiError::FetchFailed);
        }
        Err(e) => return Err(e.into()),
    };

    let doc = &fetched.document;
    info!("Fetched weather for {}", doc.location.display_name());

    Ok(Json(FetchResponse {
        message: format!(
            "Weather data fetched and stored successfully for {}!",
            doc.location.display_name()
        ),
        data: WeatherDetails::from(doc),
    }))
}

/// Location autocomplete
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionQuery>,
) -> Json<Vec<Suggestion>> {
    Json(suggest(&state.directory, &params.query))
}

/// Chatbot endpoint
///
/// 500 when the LLM call failed; the body then carries `reply: {error}`.
pub async fn chatbot(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ConversationTurn>) {
    debug!("Chatbot request: {:?}", req.message);

    let turn = state.chat.respond(&req.message).await;
    let status = if turn.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(turn))
}
