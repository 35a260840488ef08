use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadFinderError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery provider error: {0}")]
    Provider(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
