/// Error types for the Sappy engine
use thiserror::Error;

/// Main error type for Sappy engine operations
#[derive(Error, Debug)]
pub enum SappyError {
    /// Daily limit must be a finite number above zero
    #[error("Invalid daily limit: {0} (must be greater than 0)")]
    InvalidLimit(f64),

    /// Water usage must be a finite, non-negative number
    #[error("Invalid water usage: {0} (must be 0 or more)")]
    InvalidUsage(f64),

    /// Failed to parse the embedded or supplied catalog CSV
    #[error("Failed to parse catalog CSV: {0}")]
    CatalogParse(#[from] csv::Error),

    /// A catalog row was malformed
    #[error("Invalid catalog entry: {0}")]
    InvalidCatalogEntry(String),

    /// HTTP request to the inference service failed
    #[error("HTTP request failed: {0}")]
    HttpRequest(String),

    /// The inference service answered with a non-success status
    #[error("Inference service returned status {0}")]
    BadStatus(u16),

    /// Failed to parse the inference response body
    #[error("Failed to parse inference response: {0}")]
    ResponseParse(String),
}

/// Type alias for Results using SappyError
pub type Result<T> = std::result::Result<T, SappyError>;
