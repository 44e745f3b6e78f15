//! HTTP API Server
//!
//! Builds shared state once at startup and serves the axum router.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wx_core::{
    ChatService, Config, LlmClient, LocationDirectory, SpellChecker, WeatherGateway, WeatherStore,
};

use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<LocationDirectory>,
    pub store: Arc<WeatherStore>,
    pub gateway: WeatherGateway,
    pub chat: ChatService,
}

impl AppState {
    /// Construct every collaborator from configuration
    pub fn from_config(config: &Config) -> wx_core::Result<Self> {
        let directory = Arc::new(LocationDirectory::us_states());
        let store = Arc::new(WeatherStore::new(&config.store.db_path)?);
        Self::with_store(config, directory, store)
    }

    /// Like [`AppState::from_config`] but with an existing store
    pub fn with_store(
        config: &Config,
        directory: Arc<LocationDirectory>,
        store: Arc<WeatherStore>,
    ) -> wx_core::Result<Self> {
        let gateway = WeatherGateway::new(&config.weather, Arc::clone(&directory), Arc::clone(&store))?;
        let llm = LlmClient::new(config.llm_config())?;
        let spell = Arc::new(SpellChecker::with_directory(&directory));
        let chat = ChatService::new(spell, Arc::clone(&directory), gateway.clone(), llm);

        info!(
            "AppState ready: {} regions, model {}",
            directory.len(),
            config.llm.model
        );

        Ok(Self {
            directory,
            store,
            gateway,
            chat,
        })
    }
}

/// CORS: any origin unless an allow-list is configured
fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    match allowed_origins {
        None => CorsLayer::permissive(),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match o.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", o);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState, allowed_origins: Option<&[String]>) -> Router {
    Router::new()
        .merge(routes())
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP API server, stopping when `shutdown` resolves
pub async fn start_server(
    config: &Config,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_router(state, config.api.allowed_origins.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api.port));
    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP API stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wx_core::{LlmConfig, LlmProvider, StoreConfig, WeatherConfig};

    fn chicago() -> Value {
        json!({
            "location": {
                "name": "Chicago",
                "region": "Illinois",
                "country": "United States of America",
                "localtime_epoch": 1718900000,
                "localtime": "2024-06-20 11:13"
            },
            "current": {
                "last_updated": "2024-06-20 11:00",
                "temp_c": 27.2,
                "temp_f": 81.0,
                "feelslike_c": 28.9,
                "feelslike_f": 84.1,
                "humidity": 62,
                "wind_mph": 11.9,
                "wind_kph": 19.1,
                "wind_dir": "SSW",
                "pressure_mb": 1016.0,
                "dewpoint_c": 19.4,
                "vis_km": 16.0,
                "vis_miles": 9.0,
                "condition": { "text": "Partly cloudy", "icon": "", "code": 1003 }
            }
        })
    }

    struct TestApp {
        weather: MockServer,
        llm: MockServer,
        store: Arc<WeatherStore>,
        router: Router,
    }

    async fn test_app() -> TestApp {
        test_app_with_origins(None).await
    }

    async fn test_app_with_origins(allowed_origins: Option<&[String]>) -> TestApp {
        let weather = MockServer::start().await;
        let llm = MockServer::start().await;
        let config = Config {
            llm: LlmConfig {
                api_key: "llm-key".into(),
                model: "test-model".into(),
                provider: LlmProvider::OpenAi,
                base_url: Some(llm.uri()),
            },
            weather: WeatherConfig {
                api_key: "weather-key".into(),
                base_url: weather.uri(),
                timeout_secs: 5,
            },
            store: StoreConfig {
                db_path: String::new(),
            },
            ..Config::default()
        };

        let store = Arc::new(WeatherStore::in_memory().unwrap());
        let state = AppState::with_store(
            &config,
            Arc::new(LocationDirectory::us_states()),
            Arc::clone(&store),
        )
        .unwrap();

        TestApp {
            weather,
            llm,
            store,
            router: build_router(state, allowed_origins),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("OK".into()));
    }

    #[tokio::test]
    async fn test_weather_data_not_found() {
        let app = test_app().await;
        let (status, body) = send(&app.router, get("/weather-data?location=Chicago,%20Illinois")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_weather_data_returns_latest_snapshot() {
        let app = test_app().await;
        app.store.insert(&chicago()).unwrap();

        let (status, body) = send(&app.router, get("/weather-data?location=Chicago,%20Illinois")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{
                "timestamp": 1718900000,
                "temperature": 27.2,
                "humidity": 62,
                "location": "Chicago, Illinois, United States of America"
            }])
        );

        // No query parameter falls back to Chicago
        let (status, _) = send(&app.router, get("/weather-data")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fetch_weather_success() {
        let app = test_app().await;
        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("q", "Chicago"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chicago()))
            .expect(1)
            .mount(&app.weather)
            .await;

        let (status, body) =
            send(&app.router, post_json("/fetch-weather", json!({"location": "Illinois"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            "Weather data fetched and stored successfully for Chicago, Illinois, United States of America!"
        );
        assert_eq!(body["data"]["wind_dir"], "SSW");
        assert_eq!(body["data"]["condition"]["text"], "Partly cloudy");
        assert_eq!(body["data"]["vis_km"], 16.0);
        assert_eq!(app.store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_weather_provider_error_is_404() {
        let app = test_app().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&app.weather)
            .await;

        let (status, body) =
            send(&app.router, post_json("/fetch-weather", json!({"location": "Atlantis"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Failed to fetch weather data"}));
    }

    #[tokio::test]
    async fn test_suggestions() {
        let app = test_app().await;
        let (status, body) = send(&app.router, get("/suggestions?query=york")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"type": "state", "name": "New York"},
                {"type": "city", "name": "New York City", "state": "New York"}
            ])
        );

        let (_, body) = send(&app.router, get("/suggestions")).await;
        assert_eq!(body.as_array().map(Vec::len), Some(10));
    }

    #[tokio::test]
    async fn test_chatbot_without_location() {
        let app = test_app().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chicago()))
            .expect(0)
            .mount(&app.weather)
            .await;

        let (status, body) =
            send(&app.router, post_json("/chatbot", json!({"message": "hello how are you"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["original_message"], "hello how are you");
        assert_eq!(body["corrected_message"], "hello how are you");
        assert!(body["reply"].as_str().unwrap().contains("couldn't identify a location"));
        assert!(body.get("resolved_location").is_none());
    }

    #[tokio::test]
    async fn test_chatbot_llm_failure_is_500() {
        let app = test_app().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chicago()))
            .mount(&app.weather)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&app.llm)
            .await;

        let (status, body) =
            send(&app.router, post_json("/chatbot", json!({"message": "weather in Chicago"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["reply"]["error"].as_str().unwrap().contains("overloaded"));
        assert_eq!(body["corrected_message"], "weather in Chicago");
    }

    #[tokio::test]
    async fn test_chatbot_success() {
        let app = test_app().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chicago()))
            .mount(&app.weather)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Warm, 27°C."}}]
            })))
            .mount(&app.llm)
            .await;

        let (status, body) =
            send(&app.router, post_json("/chatbot", json!({"message": "weather in Chicago"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Warm, 27°C.");
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/suggestions?query=chi")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allow_list_preflight() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "bad\norigin".to_string(),
        ];
        let app = test_app_with_origins(Some(&origins)).await;

        let response = app
            .router
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        let response = app
            .router
            .clone()
            .oneshot(preflight("http://evil.example"))
            .await
            .unwrap();
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cors_permissive_without_allow_list() {
        let app = test_app().await;
        let response = app
            .router
            .clone()
            .oneshot(preflight("http://anywhere.example"))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
