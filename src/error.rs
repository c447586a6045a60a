use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request body: {0}")]
    BadRequestBody(String),

    #[error("invalid URL: {0}")]
    MalformedUrl(String),

    #[error("URL must use HTTPS")]
    SchemeRejected,

    #[error("content too large: {actual} bytes (max {max} bytes)")]
    ContentTooLarge { actual: u64, max: u64 },

    #[error("failed to fetch URL: {0}")]
    FetchFailed(String),

    #[error("failed to extract article content: {0}")]
    ExtractionFailed(String),

    #[error("no summary generated")]
    EmptyCompletion,

    #[error("invalid summary format: {0}")]
    MalformedCompletion(String),

    #[error("summarization failed: {0}")]
    SummarizationFailed(String),

    #[error("request processing timed out")]
    Timeout,

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequestBody(_) | AppError::MalformedUrl(_) | AppError::SchemeRejected => {
                StatusCode::BAD_REQUEST
            }
            AppError::ContentTooLarge { .. }
            | AppError::FetchFailed(_)
            | AppError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptyCompletion
            | AppError::MalformedCompletion(_)
            | AppError::SummarizationFailed(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status(), self.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchFailed(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
