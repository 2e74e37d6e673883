use std::sync::Arc;

use bp_store::{BlueprintEntity, BlueprintStore};
use bp_types::{Blueprint, SecurityConfiguration, StructuralError, normalize};
use serde_json::{Map, Value};

use crate::{
    codec::Codec,
    config::{CompilerConfig, STACK_ROOT_ENV},
    error::{CompileError, CompileResult},
    host_group::HostGroupRegistry,
    properties::{PropertyBag, properties_to_document},
    resolver::{ResolvedBlueprint, StackResolver},
    stack::{FsStackRegistry, StackRegistry},
};

/// Entry point tying the codec, the stack resolver and the entity store together.
///
/// Every producing operation either yields a fully resolved blueprint or
/// fails; intermediate decode and normalize states never escape.
pub struct BlueprintCompiler {
    codec: Codec,
    resolver: StackResolver,
    store: Arc<dyn BlueprintStore>,
    config: CompilerConfig,
}

impl std::fmt::Debug for BlueprintCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintCompiler")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BlueprintCompiler {
    pub fn new(
        registry: Arc<dyn StackRegistry>,
        store: Arc<dyn BlueprintStore>,
        config: CompilerConfig,
    ) -> Self {
        Self::with_host_groups(registry, store, config, HostGroupRegistry::default())
    }

    /// Compiler whose stacks are read from `config.stack_root`.
    pub fn from_config(
        store: Arc<dyn BlueprintStore>,
        config: CompilerConfig,
    ) -> CompileResult<Self> {
        let root = config.stack_root.clone().ok_or_else(|| {
            CompileError::Config(format!("no stack root configured (set {STACK_ROOT_ENV})"))
        })?;
        tracing::debug!(stack_root = %root.display(), "using filesystem stack registry");
        Ok(Self::new(Arc::new(FsStackRegistry::new(root)), store, config))
    }

    /// Like [`BlueprintCompiler::new`] with extra host-group kinds registered.
    pub fn with_host_groups(
        registry: Arc<dyn StackRegistry>,
        store: Arc<dyn BlueprintStore>,
        config: CompilerConfig,
        host_groups: HostGroupRegistry,
    ) -> Self {
        Self {
            codec: Codec::new(config.codec, host_groups),
            resolver: StackResolver::new(registry),
            store,
            config,
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn resolver(&self) -> &StackResolver {
        &self.resolver
    }

    pub fn from_document(&self, bytes: &[u8]) -> CompileResult<ResolvedBlueprint> {
        let blueprint = self.codec.decode(bytes)?;
        self.finish(blueprint)
    }

    pub fn from_properties(
        &self,
        props: &PropertyBag,
        security: Option<SecurityConfiguration>,
    ) -> CompileResult<ResolvedBlueprint> {
        let document = properties_to_document(props)?;
        let mut blueprint = normalize(self.codec.decode_value(document)?)?;
        if let Some(security) = security {
            blueprint.set_security(security);
        }
        self.finish(blueprint)
    }

    pub fn to_document(&self, resolved: &ResolvedBlueprint) -> CompileResult<Vec<u8>> {
        self.codec.encode(resolved.blueprint())
    }

    pub fn to_entity(&self, blueprint: &Blueprint) -> CompileResult<BlueprintEntity> {
        let content = self.codec.encode_to_string(blueprint)?;
        Ok(BlueprintEntity {
            blueprint_name: blueprint.name.clone(),
            security_type: blueprint.security.security_type,
            security_descriptor_reference: blueprint.security.descriptor_reference.clone(),
            content,
        })
    }

    pub fn from_entity(&self, entity: &BlueprintEntity) -> CompileResult<ResolvedBlueprint> {
        let blueprint = self.codec.decode(entity.content.as_bytes())?;
        check_mirrored_fields(entity, &blueprint)?;
        self.finish(blueprint)
    }

    pub fn get_blueprint(&self, name: &str) -> CompileResult<ResolvedBlueprint> {
        let entity = self
            .store
            .find_by_name(name)?
            .ok_or_else(|| CompileError::NoSuchBlueprint(name.to_string()))?;
        self.from_entity(&entity)
    }

    pub fn save(&self, resolved: &ResolvedBlueprint) -> CompileResult<()> {
        let entity = self.to_entity(resolved.blueprint())?;
        self.store.put(entity)?;
        tracing::info!(blueprint = %resolved.name(), "stored blueprint");
        Ok(())
    }

    /// The entity's embedded document as a generic JSON object.
    pub fn entity_to_map(&self, entity: &BlueprintEntity) -> CompileResult<Map<String, Value>> {
        match serde_json::from_str::<Value>(&entity.content).map_err(CompileError::parse)? {
            Value::Object(map) => Ok(map),
            other => Err(CompileError::Parse(format!(
                "stored blueprint '{}' is not a JSON object: {other}",
                entity.blueprint_name
            ))),
        }
    }

    fn finish(&self, blueprint: Blueprint) -> CompileResult<ResolvedBlueprint> {
        let resolved = self.resolver.resolve_all(blueprint)?;
        tracing::info!(
            blueprint = %resolved.name(),
            stacks = resolved.blueprint().stack_ids.len(),
            host_groups = resolved.blueprint().host_groups.len(),
            "compiled blueprint"
        );
        Ok(resolved)
    }
}

fn check_mirrored_fields(entity: &BlueprintEntity, blueprint: &Blueprint) -> CompileResult<()> {
    let mismatch = |field: &'static str, stored: &str, document: &str| -> CompileResult<()> {
        Err(CompileError::Structural(StructuralError::EntityMismatch {
            field,
            stored: stored.to_string(),
            document: document.to_string(),
        }))
    };
    if entity.blueprint_name != blueprint.name {
        return mismatch("blueprint_name", &entity.blueprint_name, &blueprint.name);
    }
    if entity.security_type != blueprint.security.security_type {
        return mismatch(
            "security_type",
            entity.security_type.as_str(),
            blueprint.security.security_type.as_str(),
        );
    }
    if entity.security_descriptor_reference != blueprint.security.descriptor_reference {
        return mismatch(
            "security_descriptor_reference",
            entity.security_descriptor_reference.as_deref().unwrap_or(""),
            blueprint.security.descriptor_reference.as_deref().unwrap_or(""),
        );
    }
    Ok(())
}
