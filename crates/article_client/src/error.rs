use reqwest::StatusCode;
use shared::error::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("article api transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("article api rejected request ({status}): {error}")]
    Api { status: StatusCode, error: ApiError },
    #[error("article api returned unexpected status {status}")]
    Status { status: StatusCode },
    #[error("invalid article api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid authorization header value for origin {origin}")]
    InvalidHeader { origin: String },
}
