//! wx-core: Weather Gateway Core Library
//!
//! 地名ディレクトリ、スペル補正、天気プロバイダ連携、
//! ドキュメントストア、LLMチャットのコア機能を提供します。

pub mod chat;
pub mod config;
pub mod directory;
pub mod error;
pub mod llm;
pub mod resolver;
pub mod store;
pub mod suggest;
pub mod text;
pub mod weather;

pub use chat::{ChatService, ConversationTurn, Reply};
pub use config::{ApiConfig, Config, LlmConfig, LlmProvider, StoreConfig, WeatherConfig};
pub use directory::{LocationDirectory, PlaceEntry, Region};
pub use error::{Error, Result};
pub use llm::LlmClient;
pub use resolver::LocationResolver;
pub use store::WeatherStore;
pub use suggest::{Suggestion, suggest};
pub use text::{Normalized, SpellChecker};
pub use weather::{WeatherDetails, WeatherDocument, WeatherGateway, WeatherSnapshot};
