use thiserror::Error;

/// Every failure aborts the whole run; there is no partial result.
#[derive(Debug, Error)]
pub enum ShadowError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ShadowError>;
