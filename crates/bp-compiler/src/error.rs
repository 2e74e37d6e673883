use bp_types::{StackId, StructuralError};
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to parse blueprint document: {0}")]
    Parse(String),
    #[error("host group '{host_group}' has unsupported kind '{kind}'")]
    Schema { host_group: String, kind: String },
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error("{0}")]
    Validation(String),
    #[error("blueprint {blueprint}: stack {stack} not found")]
    StackNotFound { blueprint: String, stack: StackId },
    #[error("blueprint {blueprint}: unable to resolve stack {stack}: {source}")]
    StackResolution {
        blueprint: String,
        stack: StackId,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to serialize blueprint {blueprint}: {source}")]
    Serialization {
        blueprint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("blueprint '{0}' does not exist")]
    NoSuchBlueprint(String),
    #[error("compiler configuration: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] bp_store::StoreError),
}

impl CompileError {
    pub(crate) fn parse(err: impl std::fmt::Display) -> Self {
        CompileError::Parse(err.to_string())
    }
}
