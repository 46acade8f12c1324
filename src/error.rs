use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompatError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CompatError {
    /// Errors the widget may show to a shopper. Everything else is
    /// swallowed by the fallback path.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, CompatError::EmptyInput(_) | CompatError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;
