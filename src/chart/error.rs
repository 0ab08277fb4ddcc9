use thiserror::Error;

/// Errors raised while deriving chart options or renderer configuration
#[derive(Debug, Error)]
pub enum ChartError {
    /// Chart type missing or not part of the supported set
    #[error(
        "config.type must be defined and match one of supported chart types: {supported}, got: {chart_type}"
    )]
    UnsupportedChartType {
        chart_type: String,
        supported: String,
    },

    /// Result view does not have the shape the requested layout needs
    #[error("Invalid result view: {0}")]
    InvalidResult(String),

    /// Configuration error (unusable chart config, bad fixture)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Results using ChartError
pub type Result<T> = std::result::Result<T, ChartError>;
