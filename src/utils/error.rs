use thiserror::Error;
use wrike::{FetchError, WrikeError};

/// Erros do exportador
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Wrike error: {0}")]
    Wrike(#[from] WrikeError),

    #[error("Audit log incomplete: {0}")]
    AuditIncomplete(FetchError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
