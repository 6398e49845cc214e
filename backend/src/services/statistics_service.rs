use crate::models::{Comment, Sentiment, SentimentDistribution, Statistics, TopAuthor};
use std::collections::HashMap;

const TOP_AUTHORS_LIMIT: usize = 10;

/// Aggregates an already flattened set of comments and replies.
pub fn calculate_statistics<'a, I>(comments: I) -> Statistics
where
    I: IntoIterator<Item = &'a Comment>,
{
    let mut total_comments = 0usize;
    let mut total_likes = 0u64;
    let mut distribution = SentimentDistribution::default();

    // first-seen order is kept so the stable sort breaks ties by encounter
    let mut authors: Vec<TopAuthor> = Vec::new();
    let mut author_index: HashMap<&'a str, usize> = HashMap::new();

    for comment in comments {
        total_comments += 1;
        total_likes += comment.like_count;

        match comment.sentiment {
            Some(Sentiment::Positive) => distribution.positive += 1,
            Some(Sentiment::Negative) => distribution.negative += 1,
            Some(Sentiment::Neutral) => distribution.neutral += 1,
            None => {}
        }

        let slot = *author_index.entry(comment.author.as_str()).or_insert_with(|| {
            authors.push(TopAuthor {
                author: comment.author.clone(),
                comment_count: 0,
                total_likes: 0,
            });
            authors.len() - 1
        });
        authors[slot].comment_count += 1;
        authors[slot].total_likes += comment.like_count;
    }

    let average_likes = if total_comments > 0 {
        total_likes as f64 / total_comments as f64
    } else {
        0.0
    };

    authors.sort_by(|a, b| b.total_likes.cmp(&a.total_likes));
    authors.truncate(TOP_AUTHORS_LIMIT);

    Statistics {
        total_comments,
        average_likes,
        sentiment_distribution: distribution,
        top_authors: authors,
    }
}
