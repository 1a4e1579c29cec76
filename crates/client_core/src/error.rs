//! Client-side error taxonomy and the pluggable error reporter used by list loads.

use shared::{
    domain::Master,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {error}")]
    Status { status: u16, error: ApiError },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid service url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("{list} cannot be related to {via}")]
    UnsupportedRelation { list: &'static str, via: Master },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    Transport,
    NotFound,
    Validation,
    Unknown,
}

impl ClientError {
    pub fn status(status: u16, error: ApiError) -> Self {
        Self::Status { status, error }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Transport(_) => ErrorCategory::Transport,
            ClientError::Status { error, .. } => match error.code {
                ErrorCode::Unauthorized | ErrorCode::Forbidden => ErrorCategory::Auth,
                ErrorCode::NotFound => ErrorCategory::NotFound,
                ErrorCode::Validation => ErrorCategory::Validation,
                ErrorCode::RateLimited | ErrorCode::Internal => ErrorCategory::Unknown,
            },
            ClientError::Decode(_) => ErrorCategory::Unknown,
            ClientError::Token(_) => ErrorCategory::Auth,
            ClientError::Url(_) | ClientError::UnsupportedRelation { .. } => {
                ErrorCategory::Validation
            }
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category() == ErrorCategory::Auth
    }
}

/// Receives load and mutation failures so that they never escape a load cycle.
pub trait ErrorHandler: Send + Sync {
    fn on_error(&self, list: &'static str, err: &ClientError);
}

/// Reports failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn on_error(&self, list: &'static str, err: &ClientError) {
        error!(
            list,
            category = ?err.category(),
            reauth = err.requires_reauth(),
            "request failed: {err}"
        );
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
