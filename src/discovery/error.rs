//! Error types for model discovery

use thiserror::Error;

/// Errors that can occur during model discovery
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// A caller broke an argument contract (empty name, empty document set,
    /// duplicate or missing field)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Maximum depth exceeded (only when a depth limit is configured)
    #[error("Maximum nesting depth exceeded: {depth} > {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl DiscoveryError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        DiscoveryError::InvalidArgument(message.into())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(e: serde_json::Error) -> Self {
        DiscoveryError::JsonParse(e.to_string())
    }
}

impl From<serde_yaml::Error> for DiscoveryError {
    fn from(e: serde_yaml::Error) -> Self {
        DiscoveryError::YamlParse(e.to_string())
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(e: std::io::Error) -> Self {
        DiscoveryError::Io(e.to_string())
    }
}

/// Result alias used throughout discovery
pub type Result<T> = std::result::Result<T, DiscoveryError>;
