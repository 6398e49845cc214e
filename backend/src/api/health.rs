use crate::rate_limit::RateLimited;
use crate::{AppState, API_VERSION};
use rocket::serde::json::{json, Json, Value};
use rocket::{get, State};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    pub version: &'static str,
    pub mode: &'static str,
}

#[get("/")]
pub fn index() -> Json<Value> {
    Json(json!({
        "message": "YouTube Comments Reader API",
        "version": API_VERSION,
        "status": "online",
        "endpoints": {
            "health": "/api/health",
            "comments": "/api/comments?url={youtube_url}&maxResults={number}",
            "videoInfo": "/api/video/{videoId}",
            "filter": "/api/comments/filter"
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[get("/health")]
pub fn health_check(_limit: RateLimited, state: &State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "YouTube Comments Reader API is running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: API_VERSION,
        mode: if state.source.is_demo() { "demo" } else { "live" },
    })
}
