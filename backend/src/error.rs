use crate::models::ErrorResponse;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::Response;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommentsError {
    #[error("invalid YouTube URL or video id: {0}")]
    InvalidIdentifier(String),
    #[error("video not found: {0}")]
    NotFound(String),
    #[error("YouTube API error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error("{message}")]
    Validation { code: &'static str, message: String },
}

impl CommentsError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        CommentsError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        CommentsError::Validation {
            code,
            message: message.into(),
        }
    }

    /// True when the provider rejected the credential or the quota is exhausted.
    pub fn is_auth_or_quota(&self) -> bool {
        matches!(
            self,
            CommentsError::Upstream {
                status: Some(401 | 403),
                ..
            }
        )
    }

    pub fn status(&self) -> Status {
        match self {
            CommentsError::InvalidIdentifier(_) | CommentsError::Validation { .. } => {
                Status::BadRequest
            }
            CommentsError::NotFound(_) => Status::NotFound,
            CommentsError::Upstream { .. } => Status::ServiceUnavailable,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CommentsError::InvalidIdentifier(_) => "INVALID_URL",
            CommentsError::NotFound(_) => "VIDEO_NOT_FOUND",
            CommentsError::Upstream { .. } => "YOUTUBE_API_ERROR",
            CommentsError::Validation { code, .. } => *code,
        }
    }
}

impl<'r> Responder<'r, 'static> for CommentsError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorResponse::new(self.to_string(), self.code());
        let json = serde_json::to_string(&body).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(self.status())
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
