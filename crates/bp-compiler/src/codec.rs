//! Wire JSON <-> [`Blueprint`] conversion.
//!
//! Decoding is two-phase: the document is parsed into a generic JSON value,
//! host groups are split off and materialized through the
//! [`HostGroupRegistry`], and the remaining fields are decoded directly.
//! [`Codec::decode`] then runs the normalization pass. Encoding never re-runs
//! validation and always omits unset optional fields.

use bp_types::{Blueprint, normalize};
use serde_json::{Map, Value};

use crate::{
    config::CodecOptions,
    error::{CompileError, CompileResult},
    host_group::HostGroupRegistry,
};

const HOST_GROUPS_FIELD: &str = "host_groups";

#[derive(Debug, Clone, Default)]
pub struct Codec {
    options: CodecOptions,
    host_groups: HostGroupRegistry,
}

impl Codec {
    pub fn new(options: CodecOptions, host_groups: HostGroupRegistry) -> Self {
        Self {
            options,
            host_groups,
        }
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self::new(options, HostGroupRegistry::default())
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    pub fn host_groups(&self) -> &HostGroupRegistry {
        &self.host_groups
    }

    /// Decode and normalize.
    pub fn decode(&self, bytes: &[u8]) -> CompileResult<Blueprint> {
        let blueprint = self.decode_raw(bytes)?;
        Ok(normalize(blueprint)?)
    }

    /// Decode without the normalization pass.
    pub fn decode_raw(&self, bytes: &[u8]) -> CompileResult<Blueprint> {
        let value: Value = serde_json::from_slice(bytes).map_err(CompileError::parse)?;
        self.decode_value(value)
    }

    pub(crate) fn decode_value(&self, value: Value) -> CompileResult<Blueprint> {
        let Value::Object(mut object) = value else {
            return Err(CompileError::Parse(
                "blueprint document must be a JSON object".into(),
            ));
        };
        let raw_groups = take_host_groups(&mut object)?;

        let mut blueprint: Blueprint =
            serde_json::from_value(Value::Object(object)).map_err(CompileError::parse)?;
        blueprint.host_groups = raw_groups
            .into_iter()
            .map(|group| self.host_groups.resolve(group))
            .collect::<CompileResult<_>>()?;

        tracing::debug!(
            blueprint = %blueprint.name,
            host_groups = blueprint.host_groups.len(),
            "decoded blueprint document"
        );
        Ok(blueprint)
    }

    pub fn encode(&self, blueprint: &Blueprint) -> CompileResult<Vec<u8>> {
        let encoded = if self.options.pretty {
            serde_json::to_vec_pretty(blueprint)
        } else {
            serde_json::to_vec(blueprint)
        };
        encoded.map_err(|source| CompileError::Serialization {
            blueprint: blueprint.name.clone(),
            source,
        })
    }

    pub fn encode_to_string(&self, blueprint: &Blueprint) -> CompileResult<String> {
        let encoded = if self.options.pretty {
            serde_json::to_string_pretty(blueprint)
        } else {
            serde_json::to_string(blueprint)
        };
        encoded.map_err(|source| CompileError::Serialization {
            blueprint: blueprint.name.clone(),
            source,
        })
    }
}

fn take_host_groups(object: &mut Map<String, Value>) -> CompileResult<Vec<Value>> {
    match object.remove(HOST_GROUPS_FIELD) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(groups)) => Ok(groups),
        Some(other) => Err(CompileError::Parse(format!(
            "{HOST_GROUPS_FIELD} must be an array, got {other}"
        ))),
    }
}
