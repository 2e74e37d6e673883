//! Stack metadata and the stack registry lookup contract.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use anyhow::{Context, anyhow};
use bp_types::StackId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STACK_DEFINITION_FILE: &str = "stack.json";

/// Resolved description of one stack version.
///
/// The compiler only cares that it exists; component and configuration
/// catalogs are exposed for callers that validate blueprints against them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackMetadata {
    pub name: String,
    pub version: String,
    /// service -> components it provides
    #[serde(default)]
    pub services: BTreeMap<String, BTreeSet<String>>,
    /// config type -> valid property keys
    #[serde(default)]
    pub config_types: BTreeMap<String, BTreeSet<String>>,
}

impl StackMetadata {
    pub fn new(id: &StackId) -> Self {
        Self {
            name: id.name().to_string(),
            version: id.version().to_string(),
            services: BTreeMap::new(),
            config_types: BTreeMap::new(),
        }
    }

    pub fn with_service<I, S>(mut self, service: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services
            .entry(service.into())
            .or_default()
            .extend(components.into_iter().map(Into::into));
        self
    }

    pub fn with_config_type<I, S>(mut self, config_type: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config_types
            .entry(config_type.into())
            .or_default()
            .extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> Result<StackId, bp_types::RefError> {
        StackId::new(self.name.clone(), self.version.clone())
    }

    pub fn has_component(&self, component: &str) -> bool {
        self.services.values().any(|c| c.contains(component))
    }

    pub fn service_of(&self, component: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|(_, components)| components.contains(component))
            .map(|(service, _)| service.as_str())
    }

    pub fn config_keys(&self, config_type: &str) -> Option<&BTreeSet<String>> {
        self.config_types.get(config_type)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("stack {0} not found")]
    NotFound(StackId),
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

/// Lookup contract of the external stack registry.
///
/// Implementations must tolerate concurrent read-only lookups.
pub trait StackRegistry: Send + Sync {
    fn lookup(&self, id: &StackId) -> Result<StackMetadata, RegistryError>;
}

/// Registry backed by an in-process map.
#[derive(Debug, Default)]
pub struct InMemoryStackRegistry {
    stacks: RwLock<HashMap<StackId, StackMetadata>>,
}

impl InMemoryStackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(self, metadata: StackMetadata) -> anyhow::Result<Self> {
        self.insert(metadata)?;
        Ok(self)
    }

    pub fn insert(&self, metadata: StackMetadata) -> anyhow::Result<()> {
        let id = metadata.id()?;
        let mut guard = self
            .stacks
            .write()
            .map_err(|_| anyhow!("stack registry lock poisoned"))?;
        guard.insert(id, metadata);
        Ok(())
    }
}

impl StackRegistry for InMemoryStackRegistry {
    fn lookup(&self, id: &StackId) -> Result<StackMetadata, RegistryError> {
        let guard = self
            .stacks
            .read()
            .map_err(|_| anyhow!("stack registry lock poisoned"))?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }
}

/// Registry reading stack definitions from `<root>/<name>/<version>/stack.json`.
#[derive(Debug, Clone)]
pub struct FsStackRegistry {
    root: PathBuf,
}

impl FsStackRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn definition_path(&self, id: &StackId) -> PathBuf {
        self.root
            .join(id.name())
            .join(id.version())
            .join(STACK_DEFINITION_FILE)
    }
}

impl StackRegistry for FsStackRegistry {
    fn lookup(&self, id: &StackId) -> Result<StackMetadata, RegistryError> {
        let path = self.definition_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(id.clone()));
            }
            Err(err) => {
                return Err(anyhow::Error::new(err)
                    .context(format!("read stack definition {}", path.display()))
                    .into());
            }
        };
        let metadata: StackMetadata = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse stack definition {}", path.display()))?;
        if metadata.name != id.name() || metadata.version != id.version() {
            return Err(anyhow!(
                "stack definition {} declares {}-{}",
                path.display(),
                metadata.name,
                metadata.version
            )
            .into());
        }
        Ok(metadata)
    }
}
