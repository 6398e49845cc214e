use crate::error::CommentsError;
use crate::models::{ApiResponse, Comment, CommentsResponse, FilteredComments};
use crate::rate_limit::RateLimited;
use crate::services::comments_service::{self, MAX_RESULTS, MIN_RESULTS};
use crate::services::filter_service::{filter_and_sort, FilterSpec};
use crate::AppState;
use log::{error, info};
use rocket::http::ContentType;
use rocket::serde::json::{self, Json};
use rocket::{get, post, FromForm, State};
use serde::Deserialize;

const DEFAULT_MAX_RESULTS: u32 = 100;

#[derive(Debug, FromForm)]
pub struct CommentsQuery {
    url: Option<String>,
    #[field(name = "maxResults")]
    max_results: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    comments: Option<Vec<Comment>>,
    #[serde(default)]
    filters: FilterSpec,
}

fn parse_max_results(raw: Option<&str>) -> Result<u32, CommentsError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_RESULTS);
    };

    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (MIN_RESULTS..=MAX_RESULTS).contains(n))
        .ok_or_else(|| {
            CommentsError::validation(
                "INVALID_MAX_RESULTS",
                format!("maxResults must be a number between {MIN_RESULTS} and {MAX_RESULTS}"),
            )
        })
}

#[get("/comments?<query..>")]
pub async fn get_comments(
    _limit: RateLimited,
    state: &State<AppState>,
    query: CommentsQuery,
) -> Result<Json<ApiResponse<CommentsResponse>>, CommentsError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CommentsError::validation("MISSING_URL", "Video URL is required"))?;
    let max_results = parse_max_results(query.max_results.as_deref())?;

    match comments_service::retrieve(&*state.source, url, max_results).await {
        Ok(data) => {
            info!(
                "Fetched {} comment threads for video {} ({} total reported)",
                data.comments.len(),
                data.video_info.id,
                data.total_results
            );
            Ok(Json(ApiResponse::ok(data)))
        }
        Err(e) => {
            if e.is_auth_or_quota() {
                error!("YouTube API rejected the key or quota is exhausted: {e}");
            } else {
                error!("Failed to fetch comments for {url}: {e:?}");
            }
            Err(e)
        }
    }
}

#[post("/comments/filter", data = "<request>")]
pub fn filter_comments(
    _limit: RateLimited,
    content_type: Option<&ContentType>,
    request: Result<Json<FilterRequest>, json::Error<'_>>,
) -> Result<Json<ApiResponse<FilteredComments>>, CommentsError> {
    if !content_type.is_some_and(|ct| ct.is_json()) {
        return Err(CommentsError::validation(
            "INVALID_CONTENT_TYPE",
            "Content-Type must be application/json",
        ));
    }

    let request = request.map_err(|e| {
        error!("Rejected filter request body: {e:?}");
        CommentsError::validation("INVALID_BODY", format!("Invalid request body: {e}"))
    })?;
    let FilterRequest { comments, filters } = request.into_inner();

    let comments = comments.ok_or_else(|| {
        CommentsError::validation("MISSING_COMMENTS", "A list of comments is required")
    })?;

    let result = filter_and_sort(&comments, &filters);
    info!(
        "Filtered comments: {} of {} kept",
        result.total_filtered, result.total_original
    );
    Ok(Json(ApiResponse::ok(result)))
}
