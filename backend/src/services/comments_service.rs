use crate::error::CommentsError;
use crate::models::{flatten_threads, CommentsResponse};
use crate::services::statistics_service::calculate_statistics;
use crate::services::youtube_service::CommentSource;
use crate::utils::extract_video_id;

pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 200;

/// Video metadata, the first page of comment threads and their statistics.
///
/// Both fetches run concurrently; the first failure aborts the whole retrieval.
/// `max_results` is expected in `MIN_RESULTS..=MAX_RESULTS`.
pub async fn retrieve(
    source: &dyn CommentSource,
    url_or_id: &str,
    max_results: u32,
) -> Result<CommentsResponse, CommentsError> {
    let video_id = extract_video_id(url_or_id)
        .ok_or_else(|| CommentsError::InvalidIdentifier(url_or_id.to_string()))?;

    let (video_info, page) = tokio::try_join!(
        source.fetch_video_info(&video_id),
        source.fetch_comments(&video_id, max_results, None),
    )?;

    let statistics = calculate_statistics(flatten_threads(&page.comments));

    Ok(CommentsResponse {
        video_info,
        comments: page.comments,
        total_results: page.total_results,
        next_page_token: page.next_page_token,
        statistics,
    })
}
