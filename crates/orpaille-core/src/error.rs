//! Error types for orpaille.

use thiserror::Error;

/// Result type alias using orpaille's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for orpaille operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Location query could not be resolved to a city
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Named river absent from the map-data response
    #[error("River not found: {0}")]
    RiverNotFound(String),

    /// No coordinate could be resolved for a river
    #[error("No coordinates found for river: {0}")]
    RiverCoordinatesNotFound(String),

    /// Geocoding service failure
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// Map-data service failure
    #[error("Map data error: {0}")]
    MapData(String),

    /// Remote model call failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Remote model reply did not match the expected JSON contract
    #[error("Invalid model reply: {0}")]
    InvalidModelReply(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
