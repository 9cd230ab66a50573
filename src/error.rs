use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyvolveError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Invalid State: {0}")]
    InvalidState(String),

    #[error("Argument Error: {0}")]
    Argument(String),
}

pub type KvResult<T> = Result<T, KeyvolveError>;
