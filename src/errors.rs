use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Node does not expose children (operation: {operation})")]
    MissingCapability { operation: String },

    #[error("Failed to create node with name {name} after {attempts} suffix tries")]
    ConstructionExhausted { name: String, attempts: usize },

    #[error("Duplicate child name '{name}' under parent '{parent}'")]
    DuplicateName { parent: String, name: String },

    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    #[error("Node belongs to a different forest: {0}")]
    ForeignNode(String),

    #[error("config error: {message}")]
    Config { message: String },
}

impl TreeError {
    pub(crate) fn missing_capability(operation: &str) -> Self {
        Self::MissingCapability {
            operation: operation.to_string(),
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
