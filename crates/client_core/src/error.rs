use form_core::StateError;
use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded {status}: {}", .error.message)]
    Api { status: u16, error: ApiError },
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("server returned an unusable form: {0}")]
    InvalidDocument(#[from] StateError),
}

impl TransportError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { error, .. } => Some(error.code),
            _ => None,
        }
    }

    /// Server-provided message when there is one, otherwise the error text.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { error, .. } => error.message.clone(),
            other => other.to_string(),
        }
    }
}
