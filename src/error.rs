use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("code host error: {0}")]
    CodeHost(String),
    #[error("generation service transport error: {0}")]
    Transport(String),
    #[error("generation service responded with {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("malformed stream chunk: {0}")]
    StreamDecode(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
