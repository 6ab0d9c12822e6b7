use thiserror::Error;

/// Top-level error type for the huddle system.
///
/// Subsystem crates define their own error enums and convert into this one
/// so the binary can use `?` across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HuddleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Model service error: {0}")]
    Llm(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("Chat error: {0}")]
    Chat(String),
}

impl From<toml::de::Error> for HuddleError {
    fn from(err: toml::de::Error) -> Self {
        HuddleError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for HuddleError {
    fn from(err: toml::ser::Error) -> Self {
        HuddleError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for HuddleError {
    fn from(err: serde_json::Error) -> Self {
        HuddleError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for huddle operations.
pub type Result<T> = std::result::Result<T, HuddleError>;
