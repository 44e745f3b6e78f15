//! Conversation Handler
//!
//! Normalize → resolve a location → fetch current weather → ask the LLM.
//! Linear: every step runs at most once and nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::directory::LocationDirectory;
use crate::llm::LlmClient;
use crate::resolver::LocationResolver;
use crate::text::SpellChecker;
use crate::weather::{WeatherDocument, WeatherGateway};

/// System instruction sent with every completion
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant for weather-related queries.";

const NO_LOCATION_REPLY: &str =
    "I'm sorry, I couldn't identify a location in your message. Could you please mention a city name?";

/// Reply payload: assistant text, or an error description when the LLM failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Text(String),
    Failed { error: String },
}

/// Outcome of one chat request (not persisted)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationTurn {
    pub reply: Reply,
    pub original_message: String,
    pub corrected_message: String,
    #[serde(skip)]
    pub resolved_location: Option<String>,
}

impl ConversationTurn {
    /// True when the LLM call failed
    pub fn is_error(&self) -> bool {
        matches!(self.reply, Reply::Failed { .. })
    }
}

/// Chat orchestration over shared, read-only collaborators
#[derive(Clone)]
pub struct ChatService {
    spell: Arc<SpellChecker>,
    directory: Arc<LocationDirectory>,
    gateway: WeatherGateway,
    llm: LlmClient,
}

impl ChatService {
    pub fn new(
        spell: Arc<SpellChecker>,
        directory: Arc<LocationDirectory>,
        gateway: WeatherGateway,
        llm: LlmClient,
    ) -> Self {
        Self {
            spell,
            directory,
            gateway,
            llm,
        }
    }

    /// Handle one user message
    pub async fn respond(&self, message: &str) -> ConversationTurn {
        let corrected = self.normalize(message).await;

        let turn = |reply: Reply, location: Option<String>| ConversationTurn {
            reply,
            original_message: message.to_string(),
            corrected_message: corrected.clone(),
            resolved_location: location,
        };

        let Some(location) = LocationResolver::new(&self.directory).resolve(&corrected) else {
            info!("No location found in message: {:?}", message);
            return turn(Reply::Text(NO_LOCATION_REPLY.to_string()), None);
        };
        info!("Resolved location: {}", location);

        let fetched = match self.gateway.fetch(&location).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("Weather fetch failed for {}: {}", location, e);
                None
            }
        };

        let Some(fetched) = fetched else {
            let reply = format!(
                "I'm sorry, I couldn't fetch the weather data for {location}. \
                 Please try again later or check the spelling of the location."
            );
            return turn(Reply::Text(reply), Some(location));
        };

        let prompt = format!(
            "{}\n\nUser question: {}\n\nPlease provide a helpful response about the weather based on this information.",
            weather_context(&fetched.document),
            corrected
        );

        let reply = match self.llm.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => Reply::Text(text),
            Err(e) => {
                warn!("LLM completion failed: {}", e);
                Reply::Failed { error: e.to_string() }
            }
        };

        turn(reply, Some(location))
    }

    /// Spelling correction on the blocking pool; CPU-bound per token
    async fn normalize(&self, message: &str) -> String {
        let spell = Arc::clone(&self.spell);
        let text = message.to_string();

        match tokio::task::spawn_blocking(move || spell.normalize(&text)).await {
            Ok(normalized) => normalized.corrected,
            Err(e) => {
                warn!("Normalization task failed: {}", e);
                message.split_whitespace().collect::<Vec<_>>().join(" ")
            }
        }
    }
}

/// Fixed-format summary of a provider document for the LLM prompt
pub fn weather_context(doc: &WeatherDocument) -> String {
    let c = &doc.current;
    format!(
        "Current weather in {location}:\n\
         Temperature: {}°C ({}°F)\n\
         Feels like: {}°C ({}°F)\n\
         Condition: {}\n\
         Humidity: {}%\n\
         Wind: {} mph ({} kph) {}\n\
         Visibility: {} km ({} miles)\n\
         Last updated: {}",
        c.temp_c,
        c.temp_f,
        c.feelslike_c,
        c.feelslike_f,
        c.condition.text,
        c.humidity,
        c.wind_mph,
        c.wind_kph,
        c.wind_dir,
        c.vis_km,
        c.vis_miles,
        c.last_updated,
        location = doc.location.display_name(),
    )
}
