//! Blueprint entity storage abstractions plus filesystem and in-memory backends.

mod fs_store;
mod mem_store;

pub use fs_store::FsStore;
pub use mem_store::MemStore;

use bp_types::SecurityType;
use serde::{Deserialize, Serialize};
use std::{io, path::PathBuf};

pub type StoreResult<T> = Result<T, StoreError>;

/// Stored form of a blueprint.
///
/// `content` is the serialized blueprint document. The remaining fields are
/// denormalized copies of document fields kept for query convenience; keeping
/// them in sync with `content` is the writer's job, not the store's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintEntity {
    pub blueprint_name: String,
    pub security_type: SecurityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_descriptor_reference: Option<String>,
    pub content: String,
}

/// Trait implemented by all blueprint entity stores.
pub trait BlueprintStore: Send + Sync {
    fn find_by_name(&self, name: &str) -> StoreResult<Option<BlueprintEntity>>;
    /// Inserts the entity, replacing any entity with the same name.
    fn put(&self, entity: BlueprintEntity) -> StoreResult<()>;
    /// Removes the named entity; returns whether it existed.
    fn remove(&self, name: &str) -> StoreResult<bool>;
    /// Stored blueprint names in ascending order.
    fn names(&self) -> StoreResult<Vec<String>>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("entity JSON error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("blueprint name '{name}' cannot be used as a storage key")]
    InvalidName { name: String },
    #[error("store lock poisoned")]
    Poisoned,
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source: err,
    }
}

pub(crate) fn ensure_storable_name(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_entity(name: &str) -> BlueprintEntity {
    BlueprintEntity {
        blueprint_name: name.to_string(),
        security_type: SecurityType::Kerberos,
        security_descriptor_reference: Some("ref".into()),
        content: format!(r#"{{"blueprint_name":"{name}","stack_ids":["HDP-3.0"]}}"#),
    }
}
