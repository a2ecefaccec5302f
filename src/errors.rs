use costbook_config::ConfigError;
use costbook_core::CoreError;
use thiserror::Error;

/// Application-level error wrapping the service and configuration layers.
#[derive(Debug, Error)]
pub enum CostbookError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to render output: {0}")]
    Render(#[from] std::fmt::Error),
}

impl CostbookError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CostbookError::Core(err) if err.is_not_found())
    }
}

impl From<std::io::Error> for CostbookError {
    fn from(err: std::io::Error) -> Self {
        CostbookError::Core(CoreError::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, CostbookError>;
