//! Error types for drift-middleware

/// Result type for drift-middleware operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or running the chain
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An embedded document could not be interpreted
    #[error("Failed to parse {format} document in {resource_type}.{id}: {message}")]
    MalformedDocument {
        format: String,
        resource_type: String,
        id: String,
        message: String,
    },

    /// Configuration names a stage that does not exist
    #[error("Unknown middleware: {0}")]
    UnknownMiddleware(String),

    /// Configuration is invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Resource model error
    #[error(transparent)]
    Resource(#[from] drift_resource::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn malformed(
        format: impl Into<String>,
        resource_type: impl Into<String>,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedDocument {
            format: format.into(),
            resource_type: resource_type.into(),
            id: id.into(),
            message: message.into(),
        }
    }
}
