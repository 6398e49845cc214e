use crate::error::CommentsError;
use crate::models::{ApiResponse, VideoInfo};
use crate::rate_limit::RateLimited;
use crate::AppState;
use log::{error, info};
use rocket::serde::json::Json;
use rocket::{get, State};

#[get("/video/<video_id>")]
pub async fn get_video_info(
    _limit: RateLimited,
    state: &State<AppState>,
    video_id: &str,
) -> Result<Json<ApiResponse<VideoInfo>>, CommentsError> {
    match state.source.fetch_video_info(video_id).await {
        Ok(info) => {
            info!("Fetched video info for {video_id}: {}", info.title);
            Ok(Json(ApiResponse::ok(info)))
        }
        Err(e) => {
            error!("Failed to fetch video info for {video_id}: {e:?}");
            Err(e)
        }
    }
}
