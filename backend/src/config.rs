use crate::services::demo_service::DemoSource;
use crate::services::youtube_service::{CommentSource, YouTubeClient, DEFAULT_BASE_URL};
use anyhow::Result;
use env_logger::Builder;
use log::{info, warn, LevelFilter};
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 900_000;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` runs the service on canned demo data.
    pub youtube_api_key: Option<String>,
    pub youtube_api_base_url: String,
    pub port: u16,
    pub frontend_url: String,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            youtube_api_base_url: DEFAULT_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            rate_limit_window: Duration::from_millis(DEFAULT_RATE_LIMIT_WINDOW_MS),
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unset or unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            youtube_api_key: non_empty("YOUTUBE_API_KEY"),
            youtube_api_base_url: non_empty("YOUTUBE_API_BASE_URL")
                .unwrap_or(defaults.youtube_api_base_url),
            port: non_empty("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            frontend_url: non_empty("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            rate_limit_window: non_empty("RATE_LIMIT_WINDOW_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.rate_limit_window),
            rate_limit_max: non_empty("RATE_LIMIT_MAX")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_max),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.youtube_api_key.is_none()
    }
}

pub fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    info!("Starting YouTube Comments Reader backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// The live YouTube client, or demo data when no key is configured.
pub fn create_comment_source(config: &AppConfig) -> Result<Box<dyn CommentSource>> {
    match &config.youtube_api_key {
        Some(key) => {
            info!("Using YouTube Data API at {}", config.youtube_api_base_url);
            Ok(Box::new(YouTubeClient::new(
                key.clone(),
                &config.youtube_api_base_url,
            )?))
        }
        None => {
            warn!("YOUTUBE_API_KEY is not set, serving demo data");
            Ok(Box::new(DemoSource::new()))
        }
    }
}

pub fn create_cors(frontend_url: &str) -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[frontend_url]))
        .allowed_methods(
            vec![
                Method::Get,
                Method::Post,
                Method::Put,
                Method::Delete,
                Method::Options,
            ]
            .into_iter()
            .map(From::from)
            .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Content-Type", "Authorization"]))
        .allow_credentials(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
