use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlacesError>;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Places request failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<PlacesError>,
    },
}

impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        PlacesError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for PlacesError {
    fn from(err: serde_json::Error) -> Self {
        PlacesError::Parse(err.to_string())
    }
}
