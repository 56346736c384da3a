//! Error types for the StatsGateway

use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::Reply;

/// The only two error kinds callers ever see
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A required query parameter is missing or empty
    #[error("{0}")]
    Validation(String),

    /// Fetch, parse or storage failure; details stay in the logs
    #[error("Internal Server Error")]
    Internal,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_reply(status: StatusCode, message: impl Into<String>) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&ErrorResponse { error: message.into() }), status)
        .into_response()
}

/// Turn rejections into JSON error bodies
pub async fn handle_rejection(err: warp::Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(api_error) = err.find::<ApiError>() {
        return Ok(error_reply(api_error.status(), api_error.to_string()));
    }

    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "Not Found"));
    }

    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
    }

    if err.find::<warp::reject::InvalidQuery>().is_some() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, "Invalid query string"));
    }

    tracing::error!("Unhandled rejection: {:?}", err);
    Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"))
}
