use crate::models::{Comment, FilteredComments, Sentiment};
use crate::utils::{
    compare_with_order_int, parse_date_bound, parse_iso8601_to_timestamp, parse_timestamp_millis,
};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Likes,
    Replies,
    /// Any other key; sorts as a constant.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    #[serde(other)]
    Desc,
}

/// Every set field must hold for a comment to be kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    pub sentiment: Option<Sentiment>,
    pub min_likes: Option<u64>,
    pub max_likes: Option<u64>,
    #[serde(deserialize_with = "deserialize_date_bound")]
    pub date_from: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_date_bound")]
    pub date_to: Option<DateTime<Utc>>,
    pub search_text: Option<String>,
    pub author: Option<String>,
    pub sort_by: Option<SortKey>,
    pub sort_order: SortOrder,
}

fn deserialize_date_bound<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date_bound(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date: {value}"))),
    }
}

fn non_empty_lowercase(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn published_millis(comment: &Comment) -> Option<i64> {
    parse_timestamp_millis(&comment.published_at)
}

// wide enough for every u64 counter and every i64 timestamp
fn sort_value(comment: &Comment, key: SortKey) -> i128 {
    match key {
        SortKey::Date => parse_iso8601_to_timestamp(&comment.published_at).into(),
        SortKey::Likes => comment.like_count.into(),
        SortKey::Replies => comment.reply_count.into(),
        SortKey::Unrecognized => 0,
    }
}

/// Returns the comments matching `spec`, optionally sorted. The input is left untouched.
pub fn filter_and_sort(comments: &[Comment], spec: &FilterSpec) -> FilteredComments {
    let search_text = non_empty_lowercase(&spec.search_text);
    let author = non_empty_lowercase(&spec.author);
    let date_from = spec.date_from.map(|d| d.timestamp_millis());
    let date_to = spec.date_to.map(|d| d.timestamp_millis());

    let mut filtered: Vec<Comment> = comments
        .iter()
        .filter(|c| spec.sentiment.is_none_or(|s| c.sentiment == Some(s)))
        .filter(|c| spec.min_likes.is_none_or(|min| c.like_count >= min))
        .filter(|c| spec.max_likes.is_none_or(|max| c.like_count <= max))
        .filter(|c| {
            search_text.as_deref().is_none_or(|needle| {
                c.text.to_lowercase().contains(needle) || c.author.to_lowercase().contains(needle)
            })
        })
        .filter(|c| {
            author
                .as_deref()
                .is_none_or(|needle| c.author.to_lowercase().contains(needle))
        })
        .filter(|c| {
            date_from.is_none_or(|from| published_millis(c).is_some_and(|ts| ts >= from))
        })
        .filter(|c| date_to.is_none_or(|to| published_millis(c).is_some_and(|ts| ts <= to)))
        .cloned()
        .collect();

    if let Some(key) = spec.sort_by {
        filtered.sort_by(|a, b| {
            compare_with_order_int(sort_value(a, key), sort_value(b, key), &spec.sort_order)
        });
    }

    FilteredComments {
        total_filtered: filtered.len(),
        total_original: comments.len(),
        comments: filtered,
    }
}
