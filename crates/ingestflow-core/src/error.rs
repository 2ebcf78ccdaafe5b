//! Error taxonomy for component declaration.
//!
//! Every variant is raised eagerly while a pipeline is being defined; none of
//! them is recoverable by retrying, since construction is pure.

/// Errors produced while assembling component definitions.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("invalid executor specification: {0}")]
    InvalidSpecification(String),

    #[error("{component} is missing required field: {field}")]
    MissingRequiredField { component: String, field: String },

    #[error("ambiguous split configuration: {0}")]
    AmbiguousSplitConfiguration(String),

    #[error("invalid split configuration: {0}")]
    InvalidSplitConfiguration(String),

    #[error("{component} does not declare field: {field}")]
    UnknownField { component: String, field: String },

    #[error("field {field} expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("fields {first} and {second} are mutually exclusive; supply exactly one")]
    ConflictingFields { first: String, second: String },

    #[error("invalid instance name: {0:?}")]
    InvalidInstanceName(String),

    #[error("duplicate node id in pipeline: {0}")]
    DuplicateNodeId(String),

    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ComponentError {
    pub fn missing(component: impl Into<String>, field: impl Into<String>) -> Self {
        ComponentError::MissingRequiredField {
            component: component.into(),
            field: field.into(),
        }
    }
}

/// Result type for component declaration.
pub type Result<T> = std::result::Result<T, ComponentError>;
