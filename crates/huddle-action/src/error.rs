//! Error types for the action engine.

use huddle_core::error::HuddleError;

/// Errors from capability lookup and execution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("Capability not registered: {0}")]
    UnknownCapability(String),
    #[error("Downstream unavailable: {0}")]
    DownstreamUnavailable(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("Capability misconfigured: {0}")]
    Config(String),
    #[error("Dispatch cancelled after {completed} execution(s)")]
    Cancelled { completed: usize },
}

impl From<ActionError> for HuddleError {
    fn from(err: ActionError) -> Self {
        HuddleError::Action(err.to_string())
    }
}

/// Reasons a model reply could not be turned into parameter sets.
///
/// Never surfaced to callers of the extractor; it is logged and replaced by
/// the fallback set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("no array or object found in model output")]
    NoStructure,
    #[error("malformed JSON: {0}")]
    Json(String),
    #[error("expected an array of records or a single record, got {0}")]
    UnexpectedShape(String),
    #[error("item {0} is not a record")]
    NotARecord(usize),
    #[error("item {index} is missing required field '{field}'")]
    MissingField { index: usize, field: String },
    #[error("model returned no records")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::UnknownCapability("Teleport".to_string());
        assert_eq!(err.to_string(), "Capability not registered: Teleport");

        let err = ActionError::DownstreamUnavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Downstream unavailable: connection refused");

        let err = ActionError::InvalidParameters("title too long".to_string());
        assert_eq!(err.to_string(), "Invalid parameters: title too long");

        let err = ActionError::Config("bad TLS backend".to_string());
        assert_eq!(err.to_string(), "Capability misconfigured: bad TLS backend");

        let err = ActionError::Cancelled { completed: 2 };
        assert_eq!(err.to_string(), "Dispatch cancelled after 2 execution(s)");
    }

    #[test]
    fn test_extract_error_display() {
        assert_eq!(
            ExtractError::MissingField {
                index: 1,
                field: "description".to_string()
            }
            .to_string(),
            "item 1 is missing required field 'description'"
        );
        assert_eq!(ExtractError::NotARecord(0).to_string(), "item 0 is not a record");
        assert_eq!(ExtractError::Empty.to_string(), "model returned no records");
    }

    #[test]
    fn test_action_error_into_huddle_error() {
        let err: HuddleError = ActionError::UnknownCapability("X".to_string()).into();
        assert!(matches!(err, HuddleError::Action(_)));
        assert!(err.to_string().contains("X"));
    }
}
