use thiserror::Error;

/// Errors raised by the sandbox client core
#[derive(Error, Debug)]
pub enum SbxError {
    /// A required setting (client id, client secret...) was not provided
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// A setting was provided but cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The token endpoint rejected the credentials or returned no token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote API answered with a non-success status or body code
    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP error from reqwest
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The durable cache store could not be written
    #[error("Cache store error: {0}")]
    Store(String),

    #[error(
        "Invalid time range '{0}': expected last-month, YYYY-MM or YYYY-MM-DD:YYYY-MM-DD"
    )]
    InvalidTimeRange(String),

    #[error("Invalid realm '{0}': expected a 4 character realm code")]
    InvalidRealm(String),

    #[error("No code version matching '{find}' on {host}")]
    CodeVersionNotFound { host: String, find: String },
}

impl SbxError {
    pub(crate) fn api(status: u16, message: impl Into<String>) -> Self {
        SbxError::Api {
            status,
            message: message.into(),
        }
    }
}

/// Result type alias for sandbox client operations
pub type Result<T> = std::result::Result<T, SbxError>;
