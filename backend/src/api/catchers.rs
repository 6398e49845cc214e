use crate::models::ErrorResponse;
use crate::rate_limit::{RateLimiter, RetryAfter};
use log::error;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, Request};

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let mut body = ErrorResponse::new("Route not found", "NOT_FOUND");
    body.path = Some(req.uri().path().to_string());
    (Status::NotFound, Json(body))
}

#[catch(429)]
pub fn too_many_requests(req: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let retry_after = req.local_cache(RetryAfter::default).0.or_else(|| {
        req.rocket()
            .state::<RateLimiter>()
            .map(|limiter| limiter.window().as_secs())
    });

    let mut body = ErrorResponse::new(
        "Too many requests. Please try again in a few minutes.",
        "RATE_LIMIT_EXCEEDED",
    );
    body.retry_after = retry_after;
    (Status::TooManyRequests, Json(body))
}

#[catch(500)]
pub fn internal_error(req: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    error!("Unhandled error for {} {}", req.method(), req.uri());
    (
        Status::InternalServerError,
        Json(ErrorResponse::new("Internal server error", "INTERNAL_ERROR")),
    )
}

#[catch(default)]
pub fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<ErrorResponse>) {
    let (message, code) = match status.code {
        400 | 422 => ("Invalid request", "INVALID_REQUEST"),
        _ => ("Internal server error", "INTERNAL_ERROR"),
    };
    error!("{} {} failed with {status}", req.method(), req.uri());
    (status, Json(ErrorResponse::new(message, code)))
}
