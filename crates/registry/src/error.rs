//! Registry client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("service token error: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
}
