//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. wx-gateway.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// LLM Provider type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Anthropic Claude API
    Claude,
    /// OpenAI-compatible chat completions API
    #[default]
    OpenAi,
}

impl LlmProvider {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "claude" | "anthropic" => LlmProvider::Claude,
            _ => LlmProvider::OpenAi,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key
    pub api_key: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// API provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL (optional, for custom endpoints)
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            provider: LlmProvider::OpenAi,
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

/// Weather provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// weatherapi.com API key
    pub api_key: String,

    /// Provider base URL (`current.json` is appended)
    #[serde(default = "default_weather_url")]
    pub base_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_url(),
            timeout_secs: default_weather_timeout(),
        }
    }
}

fn default_weather_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_weather_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Port for HTTP API server
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Allowed CORS origins (e.g., ["http://localhost:3000"])
    /// If unset, any origin is allowed
    #[serde(default)]
    pub allowed_origins: Option<Vec<String>>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
            allowed_origins: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite document store
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_api_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "data/wx-gateway.db".to_string()
}

/// Main configuration for wx-gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Document store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後、環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;

        // 既存の環境変数で上書き（環境変数が優先）
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// TOML 文字列から設定を構築（環境変数の上書きなし）
    fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded_content = Self::expand_env_vars(content);

        let toml: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(toml))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// `./wx-gateway.toml` があればそれを使い、なければ環境変数のみで構築します。
    pub fn load() -> crate::Result<Self> {
        let cfg = if Path::new("wx-gateway.toml").exists() {
            Self::from_toml_file("wx-gateway.toml")?
        } else {
            Self::from_env()
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let llm = toml.llm.unwrap_or_default();
        let llm_config = LlmConfig {
            api_key: llm.api_key.unwrap_or_default(),
            model: llm.model.unwrap_or_else(default_model),
            provider: llm
                .provider
                .map(|p| LlmProvider::parse(&p))
                .unwrap_or_default(),
            base_url: llm.base_url,
        };

        let weather = toml.weather.unwrap_or_default();
        let weather_config = WeatherConfig {
            api_key: weather.api_key.unwrap_or_default(),
            base_url: weather.base_url.unwrap_or_else(default_weather_url),
            timeout_secs: weather.timeout_secs.unwrap_or_else(default_weather_timeout),
        };

        let api = toml.api.unwrap_or_default();
        let api_config = ApiConfig {
            port: api.port.unwrap_or_else(default_api_port),
            allowed_origins: api.allowed_origins,
        };

        let store = toml.store.unwrap_or_default();
        let store_config = StoreConfig {
            db_path: store.db_path.unwrap_or_else(default_db_path),
        };

        Config {
            llm: llm_config,
            weather: weather_config,
            api: api_config,
            store: store_config,
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        // LLM 設定の上書き
        if let Some(api_key) = env_non_empty("LLM_API_KEY").or_else(|| env_non_empty("OPENAI_API_KEY")) {
            self.llm.api_key = api_key;
        }
        if let Some(model) = env_non_empty("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(provider) = env_non_empty("LLM_PROVIDER") {
            self.llm.provider = LlmProvider::parse(&provider);
        }
        if let Some(base_url) = env_non_empty("LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }

        // Weather 設定の上書き
        if let Some(api_key) = env_non_empty("WEATHER_API_KEY") {
            self.weather.api_key = api_key;
        }
        if let Some(url) = env_non_empty("WEATHER_API_URL") {
            self.weather.base_url = url;
        }
        if let Some(secs) = env_non_empty("WEATHER_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.weather.timeout_secs = secs;
        }

        // API 設定の上書き
        if let Some(port) = env_non_empty("API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }
        if let Some(origins) = env_non_empty("API_ALLOWED_ORIGINS") {
            self.api.allowed_origins = Some(split_list(&origins));
        }

        // Store 設定の上書き
        if let Some(path) = env_non_empty("DB_PATH") {
            self.store.db_path = path;
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// Reject configurations that cannot serve requests
    ///
    /// The weather key, LLM key and store path are all required.
    pub fn validate(&self) -> crate::Result<()> {
        let mut missing = Vec::new();
        if self.weather.api_key.is_empty() {
            missing.push("WEATHER_API_KEY");
        }
        if self.llm.api_key.is_empty() {
            missing.push("LLM_API_KEY");
        }
        if self.store.db_path.is_empty() {
            missing.push("DB_PATH");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!("missing required settings: {}", missing.join(", "))))
        }
    }

    /// Get the effective LLM configuration
    pub fn llm_config(&self) -> &LlmConfig {
        &self.llm
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// LLM 設定
    llm: Option<TomlLlmConfig>,
    /// 天気 API 設定
    weather: Option<TomlWeatherConfig>,
    /// HTTP API 設定
    api: Option<TomlApiConfig>,
    /// ストア設定
    store: Option<TomlStoreConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLlmConfig {
    /// API プロバイダー ("openai" または "claude")
    #[serde(default)]
    provider: Option<String>,
    /// モデル名
    #[serde(default)]
    model: Option<String>,
    /// API キー
    #[serde(default)]
    api_key: Option<String>,
    /// ベース URL (オプション)
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlWeatherConfig {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlApiConfig {
    /// ポート番号
    #[serde(default)]
    port: Option<u16>,
    /// 許可する CORS オリジン
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlStoreConfig {
    /// データベースパス
    #[serde(default)]
    db_path: Option<String>,
}
