#[macro_use]
extern crate rocket;

mod api;
mod config;
mod error;
mod models;
mod rate_limit;
mod services;
mod utils;

use crate::config::AppConfig;
use crate::rate_limit::RateLimiter;
use crate::services::youtube_service::CommentSource;
use anyhow::Result;
use log::info;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::AdHoc;
use rocket::http::Header;
use rocket::{Build, Rocket};

pub const API_VERSION: &str = "1.0.0";

const JSON_BODY_LIMIT_MIB: u64 = 10;

pub struct AppState {
    pub source: Box<dyn CommentSource>,
}

fn api_headers() -> AdHoc {
    AdHoc::on_response("API headers", |_, res| {
        Box::pin(async move {
            res.set_header(Header::new("X-API-Version", API_VERSION));
            res.set_header(Header::new("X-Powered-By", "YouTube Comments Reader"));
        })
    })
}

pub fn build_rocket(app_config: &AppConfig) -> Result<Rocket<Build>> {
    let source = config::create_comment_source(app_config)?;
    let cors = config::create_cors(&app_config.frontend_url)?;
    let limits = Limits::default().limit("json", JSON_BODY_LIMIT_MIB.mebibytes());
    let figment = rocket::Config::figment()
        .merge(("port", app_config.port))
        .merge(("limits", limits));

    Ok(rocket::custom(figment)
        .manage(AppState { source })
        .manage(RateLimiter::new(
            app_config.rate_limit_window,
            app_config.rate_limit_max,
        ))
        .attach(cors)
        .attach(api_headers())
        .mount("/", routes![api::index])
        .mount(
            "/api",
            routes![
                api::health_check,
                api::get_comments,
                api::filter_comments,
                api::get_video_info
            ],
        )
        .register(
            "/",
            catchers![
                api::not_found,
                api::too_many_requests,
                api::internal_error,
                api::default_catcher
            ],
        ))
}

#[rocket::main]
async fn main() -> Result<()> {
    config::load_environment();
    config::init_logger();

    let app_config = AppConfig::from_env();
    info!(
        "Listening on port {} ({} mode)",
        app_config.port,
        if app_config.is_demo() { "demo" } else { "live" }
    );

    build_rocket(&app_config)?
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed to launch: {e}"))?;
    Ok(())
}
