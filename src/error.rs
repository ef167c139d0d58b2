//! # Error Types
//!
//! Custom error types for Sweep Dash using `thiserror`.

use thiserror::Error;

/// Main error type for Sweep Dash
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Inbound frame did not match the telemetry wire shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON encoding/decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel could not be constructed
    #[error("Transport error: {0}")]
    Transport(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Sweep log text record could not be parsed
    #[error("Invalid sweep record: {0}")]
    Record(String),

    /// File export sink rejected the payload
    #[error("Export error: {0}")]
    Export(String),

    /// Operator input could not be parsed
    #[error("Control input error: {0}")]
    Control(String),
}

/// Result type alias for Sweep Dash
pub type Result<T> = std::result::Result<T, DashboardError>;
