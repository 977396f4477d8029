use serde::{Deserialize, Serialize};

pub mod api;
pub mod exif;
pub mod geocode;
pub mod jpeg;
pub mod map;
pub mod stamp;
pub mod startup_checks;
pub mod templating;
pub mod watermark;

#[cfg(test)]
mod test_util;

use geocode::GeocodingConfig;
use jpeg::OutputConfig;
use map::MapConfig;
use stamp::{DateLocale, StampError, StampService};
use watermark::{FontConfig, WatermarkConfig};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub watermark: WatermarkConfig,
    pub fonts: FontConfig,
    pub geocoding: GeocodingConfig,
    pub map: MapConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload, in megabytes
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_mb: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub date_locale: DateLocale,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "GeoStamp".to_string(),
            date_locale: DateLocale::Id,
        }
    }
}

use axum::{Router, extract::DefaultBodyLimit};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub template_engine: Arc<templating::TemplateEngine>,
    pub service: Arc<StampService>,
}

pub fn create_app(config: Config) -> Result<Router, StampError> {
    let service = Arc::new(StampService::new(&config)?);
    create_app_with_service(config, service)
}

/// Router around an already built service, so tests can swap collaborators.
pub fn create_app_with_service(
    config: Config,
    service: Arc<StampService>,
) -> Result<Router, StampError> {
    let template_engine =
        Arc::new(templating::TemplateEngine::new(&config).map_err(StampError::TemplateError)?);
    let upload_limit = config.server.max_upload_mb * 1024 * 1024;

    let app_state = AppState {
        template_engine,
        service,
    };

    Ok(Router::new()
        .route("/", axum::routing::get(templating::index_handler))
        .route("/api/address", axum::routing::post(api::address_handler))
        .route("/api/watermark", axum::routing::post(api::watermark_handler))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state))
}
