use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON in configuration file: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    #[error("Configuration validation failed: {message}")]
    SchemaValidationError { message: String },

    #[error("Invalid milestone URL format: {url}")]
    InvalidReferenceUrl { url: String },

    #[error("Reference milestone lookup failed for {url}: {message}")]
    ReferenceLookupFailed { url: String, message: String },

    #[error("Either name or referenceMilestoneUrl must be provided")]
    UnresolvableName,

    #[error("Invalid date format: {value}. Expected YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    #[error("Remote call failed ({status}): {message}")]
    RemoteError { status: u16, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl SyncError {
    /// Fatal errors abort the run before any remote mutation; everything else
    /// is recorded on the offending (repo, milestone) pair and the batch
    /// continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::ConfigParseError(_)
                | SyncError::SchemaValidationError { .. }
                | SyncError::ConfigError { .. }
                | SyncError::InvalidConfigValueError { .. }
                | SyncError::MissingConfigError { .. }
                | SyncError::IoError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
