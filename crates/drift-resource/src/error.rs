//! Error types for drift-resource

/// Result type for drift-resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding resource inventories
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An inventory could not be decoded
    #[error("Failed to decode resource inventory: {0}")]
    Json(#[from] serde_json::Error),

    /// A decoded entry is missing its type discriminant
    #[error("Resource {id} has an empty type")]
    MissingType { id: String },
}
