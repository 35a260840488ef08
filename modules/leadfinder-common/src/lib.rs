pub mod config;
pub mod error;
pub mod request;
pub mod status;
pub mod types;

pub use config::AppConfig;
pub use error::LeadFinderError;
pub use request::*;
pub use status::*;
pub use types::*;
