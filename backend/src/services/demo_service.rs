//! Canned data source used when no YouTube API key is configured.

use crate::error::CommentsError;
use crate::models::{CommentPage, Thumbnail, Thumbnails, VideoInfo};
use crate::services::youtube_service::{CommentSource, CommentThreadListResponse, MAX_PAGE_SIZE};
use async_trait::async_trait;
use serde_json::json;

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoSource;

impl DemoSource {
    pub fn new() -> Self {
        DemoSource
    }
}

fn thumbnail(video_id: &str, name: &str, width: u32, height: u32) -> Thumbnail {
    Thumbnail {
        url: format!("https://i.ytimg.com/vi/{video_id}/{name}.jpg"),
        width,
        height,
    }
}

fn demo_video(video_id: &str) -> VideoInfo {
    VideoInfo {
        id: video_id.to_string(),
        title: "Rick Astley - Never Gonna Give You Up (Official Music Video)".to_string(),
        description: "Demo data: configure YOUTUBE_API_KEY to read real comments.".to_string(),
        channel_title: "Rick Astley".to_string(),
        channel_id: "UCuAXFkgsw1L7xaCfnd5JJOw".to_string(),
        published_at: "2009-10-25T06:57:33Z".to_string(),
        view_count: "1500000000".to_string(),
        like_count: "17000000".to_string(),
        comment_count: "2300000".to_string(),
        duration: "PT3M33S".to_string(),
        thumbnails: Thumbnails {
            default: thumbnail(video_id, "default", 120, 90),
            medium: thumbnail(video_id, "mqdefault", 320, 180),
            high: thumbnail(video_id, "hqdefault", 480, 360),
        },
    }
}

fn snippet(text: &str, author: &str, likes: u64, published_at: &str) -> serde_json::Value {
    json!({
        "textDisplay": text,
        "authorDisplayName": author,
        "authorChannelId": { "value": format!("UC{}", author.trim_start_matches('@')) },
        "authorProfileImageUrl": format!("https://yt3.ggpht.com/{}", author.trim_start_matches('@')),
        "likeCount": likes,
        "publishedAt": published_at,
        "updatedAt": published_at
    })
}

fn demo_threads() -> serde_json::Value {
    let mut reply = snippet("Same here, never gets old 😄", "@mariana", 12, "2024-03-02T09:30:00Z");
    reply["parentId"] = json!("UgxDemo1");

    let mut second_reply = snippet("bad take, this is a classic", "@rickfan", 4, "2024-03-02T11:00:00Z");
    second_reply["parentId"] = json!("UgxDemo1");

    json!({
        "items": [
            {
                "id": "UgxDemo1",
                "snippet": {
                    "topLevelComment": { "snippet": snippet("This song is amazing, I love it! ❤️", "@julia", 532, "2024-03-01T18:00:00Z") },
                    "totalReplyCount": 14
                },
                "replies": { "comments": [ { "snippet": reply }, { "snippet": second_reply } ] }
            },
            {
                "id": "UgxDemo2",
                "snippet": {
                    "topLevelComment": { "snippet": snippet("Got rickrolled again. Terrible, just terrible 😤", "@pedro", 87, "2024-02-11T08:15:00Z") },
                    "totalReplyCount": 0
                }
            },
            {
                "id": "UgxDemo3",
                "snippet": {
                    "topLevelComment": { "snippet": snippet("Vídeo incrível, parabéns pelo clássico 👏", "@mariana", 41, "2024-01-20T21:45:00Z") },
                    "totalReplyCount": 0
                }
            },
            {
                "id": "UgxDemo4",
                "snippet": {
                    "topLevelComment": { "snippet": snippet("Who is watching this in 2024?", "@lucas", 9, "2024-01-05T12:00:00Z") },
                    "totalReplyCount": 3
                }
            },
            {
                "id": "UgxDemo5",
                "snippet": {
                    "topLevelComment": { "snippet": snippet("The dance moves are the best part 🔥", "@julia", 150, "2023-12-24T23:59:00Z") },
                    "totalReplyCount": 0
                }
            }
        ]
    })
}

#[async_trait]
impl CommentSource for DemoSource {
    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, CommentsError> {
        Ok(demo_video(video_id))
    }

    async fn fetch_comments(
        &self,
        _video_id: &str,
        max_results: u32,
        _page_token: Option<&str>,
    ) -> Result<CommentPage, CommentsError> {
        let response: CommentThreadListResponse = serde_json::from_value(demo_threads())
            .map_err(|e| CommentsError::upstream(None, format!("demo data: {e}")))?;

        let mut page = response.into_page();
        page.total_results = page.comments.len() as u64;
        page.comments.truncate(max_results.min(MAX_PAGE_SIZE) as usize);
        Ok(page)
    }

    fn is_demo(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;

    #[tokio::test]
    async fn demo_data_goes_through_normalization() {
        let page = DemoSource::new()
            .fetch_comments("dQw4w9WgXcQ", 100, None)
            .await
            .unwrap();

        assert_eq!(page.comments.len(), 5);
        assert_eq!(page.total_results, 5);
        assert!(page.next_page_token.is_none());

        let first = &page.comments[0];
        assert_eq!(first.sentiment, Some(Sentiment::Positive));
        assert_eq!(first.reply_count, 14);
        assert_eq!(first.materialized_replies().len(), 2);
        assert!(first.materialized_replies().iter().all(|r| r.is_reply));
        assert_eq!(page.comments[1].sentiment, Some(Sentiment::Negative));
    }

    #[tokio::test]
    async fn demo_respects_page_size() {
        let page = DemoSource::new()
            .fetch_comments("dQw4w9WgXcQ", 2, None)
            .await
            .unwrap();
        assert_eq!(page.comments.len(), 2);
    }

    #[tokio::test]
    async fn demo_video_uses_requested_id() {
        let info = DemoSource::new().fetch_video_info("abcdefghijk").await.unwrap();
        assert_eq!(info.id, "abcdefghijk");
        assert!(info.thumbnails.high.url.contains("abcdefghijk"));
        assert!(DemoSource::new().is_demo());
    }
}
