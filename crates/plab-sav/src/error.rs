use thiserror::Error;

use crate::ExperimentType;

#[derive(Debug, Error)]
pub enum SavError {
    #[error("Not a Physics-Lab save document: {0}")]
    InvalidFormat(String),

    #[error("Operation requires a {expected} experiment, found {found}")]
    TypeMismatch {
        expected: ExperimentType,
        found: ExperimentType,
    },

    #[error("Invalid argument: {0}")]
    ArgumentType(String),

    #[error("Wire references unknown element identifier '{0}'")]
    UnresolvedReference(String),

    #[error("Unknown {experiment_type} element model '{name}'")]
    UnknownModel {
        experiment_type: ExperimentType,
        name: String,
    },

    #[error("Unknown experiment type code {0}")]
    UnknownExperimentType(i64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SavError>;
