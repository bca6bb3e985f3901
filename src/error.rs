//! PinDrop Error Types

use thiserror::Error;

/// Result type alias for PinDrop operations
pub type Result<T> = std::result::Result<T, Error>;

/// PinDrop error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Request errors
    #[error("invalid PIN: {0}")]
    InvalidPin(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("missing form field: file")]
    MissingFile,

    #[error("{0}")]
    Multipart(String),

    #[error("File not found")]
    NotFound,

    // I/O errors are surfaced to clients verbatim
    #[error("{0}")]
    Io(#[from] std::io::Error),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),
}

impl Error {
    /// HTTP status code reported for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidPin(_)
            | Error::InvalidFileName(_)
            | Error::MissingFile
            | Error::Multipart(_) => 400,
            Error::NotFound => 404,
            _ => 500,
        }
    }

    /// Check if this error was caused by the client request
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}
