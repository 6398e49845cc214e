use crate::error::CommentsError;
use crate::models::{Comment, CommentPage, Thumbnail, Thumbnails, VideoInfo};
use crate::services::sentiment_service::classify;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Hard page-size cap of the commentThreads endpoint.
pub const MAX_PAGE_SIZE: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where video metadata and comment threads come from.
#[async_trait]
pub trait CommentSource: Send + Sync {
    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, CommentsError>;

    async fn fetch_comments(
        &self,
        video_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, CommentsError>;

    fn is_demo(&self) -> bool {
        false
    }
}

// Provider wire format. Documentation:
// https://developers.google.com/youtube/v3/docs/videos
// https://developers.google.com/youtube/v3/docs/commentThreads

#[derive(Debug, Deserialize)]
pub(crate) struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct VideoSnippet {
    pub title: String,
    pub description: String,
    pub channel_title: String,
    pub channel_id: String,
    pub published_at: String,
    pub thumbnails: WireThumbnails,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireThumbnails {
    pub default: Option<WireThumbnail>,
    pub medium: Option<WireThumbnail>,
    pub high: Option<WireThumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireThumbnail {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ContentDetails {
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadListResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentThread {
    pub id: String,
    pub snippet: CommentThreadSnippet,
    pub replies: Option<CommentReplies>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentThreadSnippet {
    pub top_level_comment: WireComment,
    #[serde(default)]
    pub total_reply_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentReplies {
    #[serde(default)]
    pub comments: Vec<WireComment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CommentSnippet {
    pub text_display: String,
    pub author_display_name: String,
    pub author_channel_id: Option<AuthorChannelId>,
    pub author_profile_image_url: String,
    pub like_count: u64,
    pub published_at: String,
    pub updated_at: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AuthorChannelId {
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl From<Option<WireThumbnail>> for Thumbnail {
    fn from(thumb: Option<WireThumbnail>) -> Self {
        thumb
            .map(|t| Thumbnail {
                url: t.url,
                width: t.width,
                height: t.height,
            })
            .unwrap_or_default()
    }
}

impl VideoItem {
    pub(crate) fn into_video_info(self) -> VideoInfo {
        let counter = |value: Option<String>| value.unwrap_or_else(|| "0".to_string());
        VideoInfo {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            channel_title: self.snippet.channel_title,
            channel_id: self.snippet.channel_id,
            published_at: self.snippet.published_at,
            view_count: counter(self.statistics.view_count),
            like_count: counter(self.statistics.like_count),
            comment_count: counter(self.statistics.comment_count),
            duration: self.content_details.duration,
            thumbnails: Thumbnails {
                default: self.snippet.thumbnails.default.into(),
                medium: self.snippet.thumbnails.medium.into(),
                high: self.snippet.thumbnails.high.into(),
            },
        }
    }
}

impl CommentSnippet {
    fn into_comment(self, id: String) -> Comment {
        Comment {
            id,
            sentiment: Some(classify(&self.text_display)),
            text: self.text_display,
            author: self.author_display_name,
            author_channel_id: self.author_channel_id.map(|c| c.value).unwrap_or_default(),
            author_profile_image_url: self.author_profile_image_url,
            like_count: self.like_count,
            published_at: self.published_at,
            updated_at: self.updated_at,
            parent_id: None,
            is_reply: false,
            replies: None,
            reply_count: 0,
        }
    }
}

impl CommentThread {
    /// One top-level comment with its inlined replies attached.
    pub(crate) fn into_comment(self) -> Comment {
        let thread_id = self.id;

        // reply ids combine thread id and parent id, so replies of one thread can share an id
        let replies: Vec<Comment> = self
            .replies
            .map(|r| r.comments)
            .unwrap_or_default()
            .into_iter()
            .map(|reply| {
                let parent_id = reply.snippet.parent_id.clone().unwrap_or_default();
                let mut comment = reply
                    .snippet
                    .into_comment(format!("{thread_id}_{parent_id}"));
                comment.parent_id = Some(parent_id);
                comment.is_reply = true;
                comment
            })
            .collect();

        let mut top = self.snippet.top_level_comment.snippet.into_comment(thread_id);
        top.reply_count = self.snippet.total_reply_count;
        top.replies = Some(replies);
        top
    }
}

impl CommentThreadListResponse {
    pub(crate) fn into_page(self) -> CommentPage {
        CommentPage {
            comments: self
                .items
                .into_iter()
                .map(CommentThread::into_comment)
                .collect(),
            next_page_token: self.next_page_token,
            total_results: self.page_info.total_results,
        }
    }
}

/// Turns a non-success provider response into a typed error.
fn upstream_error(status: StatusCode, body: &str, video_id: &str) -> CommentsError {
    if status == StatusCode::NOT_FOUND {
        return CommentsError::NotFound(video_id.to_string());
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string());

    CommentsError::upstream(Some(status.as_u16()), message)
}

pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> Result<Self, CommentsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CommentsError::upstream(None, format!("invalid API base url: {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CommentsError::upstream(None, e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
        })
    }

    fn endpoint(&self, resource: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        params: &[(&str, String)],
        video_id: &str,
    ) -> Result<T, CommentsError> {
        let url = self.endpoint(resource);
        debug!("GET {url} for video {video_id}");

        // never let the key leak into error messages via the request url
        let transport = |e: reqwest::Error| CommentsError::upstream(None, e.without_url().to_string());

        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(upstream_error(status, &body, video_id));
        }

        response.json::<T>().await.map_err(transport)
    }
}

#[async_trait]
impl CommentSource for YouTubeClient {
    async fn fetch_video_info(&self, video_id: &str) -> Result<VideoInfo, CommentsError> {
        let params = [
            ("id", video_id.to_string()),
            ("part", "snippet,statistics,contentDetails".to_string()),
        ];
        let response: VideoListResponse = self.get_json("videos", &params, video_id).await?;

        response
            .items
            .into_iter()
            .next()
            .map(VideoItem::into_video_info)
            .ok_or_else(|| CommentsError::NotFound(video_id.to_string()))
    }

    async fn fetch_comments(
        &self,
        video_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<CommentPage, CommentsError> {
        let mut params = vec![
            ("videoId", video_id.to_string()),
            ("part", "snippet,replies".to_string()),
            ("maxResults", max_results.min(MAX_PAGE_SIZE).to_string()),
            ("order", "relevance".to_string()),
            ("textFormat", "plainText".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response: CommentThreadListResponse =
            self.get_json("commentThreads", &params, video_id).await?;
        Ok(response.into_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers every request with the same status and JSON body and records each request line.
    async fn canned_provider(
        status: &'static str,
        body: &'static str,
    ) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0;
                while read < buf.len() {
                    let n = stream.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let head = String::from_utf8_lossy(&buf[..read]).to_string();
                if let Some(line) = head.lines().next() {
                    seen.lock().unwrap().push(line.to_string());
                }

                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}/v3"), requests)
    }

    fn last_request(requests: &Arc<Mutex<Vec<String>>>) -> String {
        requests.lock().unwrap().last().cloned().unwrap_or_default()
    }

    fn thread_fixture() -> serde_json::Value {
        json!({
            "kind": "youtube#commentThreadListResponse",
            "nextPageToken": "QURTSl9p",
            "pageInfo": { "totalResults": 2, "resultsPerPage": 20 },
            "items": [
                {
                    "id": "UgzThread1",
                    "snippet": {
                        "videoId": "dQw4w9WgXcQ",
                        "topLevelComment": {
                            "id": "UgzThread1",
                            "snippet": {
                                "textDisplay": "This song is amazing",
                                "authorDisplayName": "@alice",
                                "authorChannelId": { "value": "UCalice" },
                                "authorProfileImageUrl": "https://yt3.ggpht.com/alice",
                                "likeCount": 120,
                                "publishedAt": "2024-01-01T10:00:00Z",
                                "updatedAt": "2024-01-01T10:05:00Z"
                            }
                        },
                        "totalReplyCount": 7
                    },
                    "replies": {
                        "comments": [
                            {
                                "id": "UgzThread1.reply1",
                                "snippet": {
                                    "textDisplay": "worst take ever",
                                    "authorDisplayName": "@bob",
                                    "authorChannelId": { "value": "UCbob" },
                                    "authorProfileImageUrl": "https://yt3.ggpht.com/bob",
                                    "likeCount": 3,
                                    "publishedAt": "2024-01-02T10:00:00Z",
                                    "updatedAt": "2024-01-02T10:00:00Z",
                                    "parentId": "UgzThread1"
                                }
                            }
                        ]
                    }
                },
                {
                    "id": "UgzThread2",
                    "snippet": {
                        "topLevelComment": {
                            "snippet": {
                                "textDisplay": "first",
                                "authorDisplayName": "@carol",
                                "likeCount": 0,
                                "publishedAt": "2024-01-03T10:00:00Z",
                                "updatedAt": "2024-01-03T10:00:00Z"
                            }
                        },
                        "totalReplyCount": 0
                    }
                }
            ]
        })
    }

    #[test]
    fn normalizes_threads_and_replies() {
        let response: CommentThreadListResponse = serde_json::from_value(thread_fixture()).unwrap();
        let page = response.into_page();

        assert_eq!(page.next_page_token.as_deref(), Some("QURTSl9p"));
        assert_eq!(page.total_results, 2);
        assert_eq!(page.comments.len(), 2);

        let top = &page.comments[0];
        assert_eq!(top.id, "UgzThread1");
        assert!(!top.is_reply);
        assert_eq!(top.parent_id, None);
        assert_eq!(top.author_channel_id, "UCalice");
        assert_eq!(top.like_count, 120);
        assert_eq!(top.sentiment, Some(Sentiment::Positive));
        // provider total, not the number of inlined replies
        assert_eq!(top.reply_count, 7);

        let replies = top.materialized_replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].id, "UgzThread1_UgzThread1");
        assert_eq!(replies[0].parent_id.as_deref(), Some("UgzThread1"));
        assert!(replies[0].is_reply);
        assert_eq!(replies[0].reply_count, 0);
        assert!(replies[0].replies.is_none());
        assert_eq!(replies[0].sentiment, Some(Sentiment::Negative));

        let second = &page.comments[1];
        assert_eq!(second.author_channel_id, "");
        assert_eq!(second.author_profile_image_url, "");
        assert_eq!(second.materialized_replies().len(), 0);
        assert_eq!(second.sentiment, Some(Sentiment::Neutral));
    }

    #[test]
    fn maps_video_metadata_keeping_counters_as_strings() {
        let response: VideoListResponse = serde_json::from_value(json!({
            "items": [{
                "id": "dQw4w9WgXcQ",
                "snippet": {
                    "title": "Never Gonna Give You Up",
                    "description": "The official video",
                    "channelTitle": "Rick Astley",
                    "channelId": "UCuAXFkgsw1L7xaCfnd5JJOw",
                    "publishedAt": "2009-10-25T06:57:33Z",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/default.jpg", "width": 120, "height": 90 },
                        "high": { "url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg", "width": 480, "height": 360 }
                    }
                },
                "statistics": {
                    "viewCount": "9007199254740993",
                    "likeCount": "18000000",
                    "commentCount": "2300000"
                },
                "contentDetails": { "duration": "PT3M33S" }
            }]
        }))
        .unwrap();

        let info = response.items.into_iter().next().unwrap().into_video_info();
        assert_eq!(info.view_count, "9007199254740993");
        assert_eq!(info.like_count, "18000000");
        assert_eq!(info.duration, "PT3M33S");
        assert_eq!(info.channel_title, "Rick Astley");
        assert_eq!(info.thumbnails.default.width, 120);
        assert_eq!(info.thumbnails.high.height, 360);
        assert_eq!(info.thumbnails.medium, Thumbnail::default());
    }

    #[test]
    fn hidden_counters_default_to_zero() {
        let response: VideoListResponse = serde_json::from_value(json!({
            "items": [{ "id": "abc", "snippet": { "title": "t" }, "statistics": { "viewCount": "5" } }]
        }))
        .unwrap();
        let info = response.items.into_iter().next().unwrap().into_video_info();
        assert_eq!(info.view_count, "5");
        assert_eq!(info.like_count, "0");
        assert_eq!(info.comment_count, "0");
    }

    #[test]
    fn provider_errors_keep_their_message() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded"}]}}"#;
        let err = upstream_error(StatusCode::FORBIDDEN, body, "abc");
        assert!(err.is_auth_or_quota());
        assert!(err.to_string().contains("exceeded your quota"));

        let err = upstream_error(StatusCode::BAD_GATEWAY, "<html>", "abc");
        assert_eq!(
            err,
            CommentsError::upstream(Some(502), StatusCode::BAD_GATEWAY.to_string())
        );

        let err = upstream_error(StatusCode::NOT_FOUND, "{}", "abc");
        assert_eq!(err, CommentsError::NotFound("abc".into()));
    }

    #[test]
    fn builds_endpoints_under_base_path() {
        let client = YouTubeClient::new("key", DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            client.endpoint("commentThreads").as_str(),
            "https://www.googleapis.com/youtube/v3/commentThreads"
        );

        let client = YouTubeClient::new("key", "http://localhost:9000/v3/").unwrap();
        assert_eq!(client.endpoint("videos").as_str(), "http://localhost:9000/v3/videos");

        assert!(YouTubeClient::new("key", "not a url").is_err());
    }

    #[tokio::test]
    async fn video_lookup_without_items_is_not_found() {
        let (base_url, requests) = canned_provider("200 OK", r#"{"items":[]}"#).await;
        let client = YouTubeClient::new("test-key", &base_url).unwrap();

        let err = client.fetch_video_info("abcdefghijk").await.unwrap_err();
        assert_eq!(err, CommentsError::NotFound("abcdefghijk".into()));

        let line = last_request(&requests);
        assert!(line.starts_with("GET /v3/videos?"), "{line}");
        assert!(line.contains("key=test-key"), "{line}");
        assert!(line.contains("id=abcdefghijk"), "{line}");
    }

    #[tokio::test]
    async fn comment_request_caps_page_size_and_forwards_token() {
        let (base_url, requests) =
            canned_provider("200 OK", r#"{"items":[],"pageInfo":{"totalResults":0}}"#).await;
        let client = YouTubeClient::new("test-key", &base_url).unwrap();

        let page = client
            .fetch_comments("abcdefghijk", 150, Some("tok"))
            .await
            .unwrap();
        assert!(page.comments.is_empty());
        assert_eq!(page.total_results, 0);
        assert_eq!(page.next_page_token, None);

        let line = last_request(&requests);
        assert!(line.starts_with("GET /v3/commentThreads?"), "{line}");
        for param in [
            "key=test-key",
            "videoId=abcdefghijk",
            "maxResults=100",
            "order=relevance",
            "textFormat=plainText",
            "pageToken=tok",
        ] {
            assert!(line.contains(param), "missing {param} in {line}");
        }
    }

    #[tokio::test]
    async fn provider_rejection_carries_status_and_message() {
        let (base_url, _) = canned_provider(
            "403 Forbidden",
            r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota."}}"#,
        )
        .await;
        let client = YouTubeClient::new("test-key", &base_url).unwrap();

        let err = client
            .fetch_comments("abcdefghijk", 20, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CommentsError::upstream(
                Some(403),
                "The request cannot be completed because you have exceeded your quota."
            )
        );
        assert!(err.is_auth_or_quota());
    }
}
