pub mod comments_service;
pub mod demo_service;
pub mod filter_service;
pub mod sentiment_service;
pub mod statistics_service;
pub mod youtube_service;
