//! Host-group shape resolution.
//!
//! The document schema leaves host groups open for stack-specific extension,
//! so the codec never hard-codes a single shape. Each host group object is
//! routed by its `kind` discriminator (absent means `standard`) to a decoder
//! registered here. Unknown kinds are a schema error rather than a silent
//! fallback.

use std::collections::BTreeMap;

use bp_types::{HostGroup, STANDARD_HOST_GROUP_KIND};
use serde_json::Value;

use crate::error::{CompileError, CompileResult};

pub type HostGroupDecoder = fn(Value) -> Result<HostGroup, serde_json::Error>;

#[derive(Clone)]
pub struct HostGroupRegistry {
    decoders: BTreeMap<String, HostGroupDecoder>,
}

impl std::fmt::Debug for HostGroupRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostGroupRegistry")
            .field("kinds", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for HostGroupRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(STANDARD_HOST_GROUP_KIND, decode_standard);
        registry
    }
}

impl HostGroupRegistry {
    /// Registry with no shapes at all; every host group fails to resolve.
    pub fn empty() -> Self {
        Self {
            decoders: BTreeMap::new(),
        }
    }

    /// Registers (or replaces) the decoder for `kind`. Returns the replaced decoder.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        decoder: HostGroupDecoder,
    ) -> Option<HostGroupDecoder> {
        self.decoders.insert(kind.into(), decoder)
    }

    pub fn supports(&self, kind: &str) -> bool {
        self.decoders.contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.decoders.keys().map(String::as_str).collect()
    }

    /// Materializes the concrete host group for one wire object.
    pub fn resolve(&self, value: Value) -> CompileResult<HostGroup> {
        let Some(object) = value.as_object() else {
            return Err(CompileError::Parse(format!(
                "host group must be a JSON object, got {value}"
            )));
        };
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let kind = match object.get("kind") {
            None | Some(Value::Null) => STANDARD_HOST_GROUP_KIND.to_string(),
            Some(Value::String(kind)) => kind.clone(),
            Some(other) => {
                return Err(CompileError::Parse(format!(
                    "host group '{name}': kind must be a string, got {other}"
                )));
            }
        };
        let decoder = self
            .decoders
            .get(&kind)
            .ok_or_else(|| CompileError::Schema {
                host_group: name.clone(),
                kind: kind.clone(),
            })?;
        decoder(value).map_err(|e| CompileError::Parse(format!("host group '{name}': {e}")))
    }
}

fn decode_standard(value: Value) -> Result<HostGroup, serde_json::Error> {
    serde_json::from_value(value)
}
