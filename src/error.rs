//! Crate-wide error type: every fatal condition is one of Configuration,
//! I/O, or Transport. There is no recovery path for any of them, so
//! callers propagate with `?` up to `main`, which prints and exits.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
