use std::{collections::HashMap, sync::Arc};

use bp_types::{Blueprint, Component, HostGroup, StackId};

use crate::{
    error::{CompileError, CompileResult},
    stack::{RegistryError, StackMetadata, StackRegistry},
};

/// A blueprint bound to metadata for every stack it declares.
///
/// Only produced by a fully successful [`StackResolver::resolve_all`].
#[derive(Debug, Clone)]
pub struct ResolvedBlueprint {
    blueprint: Blueprint,
    stacks: HashMap<StackId, Arc<StackMetadata>>,
}

/// One host-group component together with the resolved stacks that could provide it.
#[derive(Debug)]
pub struct ComponentStacks<'a> {
    pub host_group: &'a HostGroup,
    pub component: &'a Component,
    pub stacks: Vec<&'a StackMetadata>,
}

impl ResolvedBlueprint {
    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    pub fn into_blueprint(self) -> Blueprint {
        self.blueprint
    }

    pub fn name(&self) -> &str {
        &self.blueprint.name
    }

    pub fn stack(&self, id: &StackId) -> Option<&StackMetadata> {
        self.stacks.get(id).map(Arc::as_ref)
    }

    /// Resolved stacks in declaration order.
    pub fn stacks(&self) -> impl Iterator<Item = (&StackId, &StackMetadata)> {
        self.blueprint
            .stack_ids()
            .filter_map(|id| self.stacks.get(id).map(|meta| (id, meta.as_ref())))
    }

    /// Stages every (host group, component) pair against every resolved stack.
    ///
    /// `stacks` holds the stacks whose catalog lists the component; deciding
    /// what an empty list means is left to the caller.
    pub fn component_stacks(&self) -> Vec<ComponentStacks<'_>> {
        let mut staged = Vec::new();
        for group in &self.blueprint.host_groups {
            for component in &group.components {
                let stacks = self
                    .stacks()
                    .map(|(_, meta)| meta)
                    .filter(|meta| meta.has_component(&component.name))
                    .collect();
                staged.push(ComponentStacks {
                    host_group: group,
                    component,
                    stacks,
                });
            }
        }
        staged
    }

    /// `(host group, component)` names that no resolved stack catalogs.
    pub fn unknown_components(&self) -> Vec<(&str, &str)> {
        self.component_stacks()
            .into_iter()
            .filter(|staged| staged.stacks.is_empty())
            .map(|staged| (staged.host_group.name.as_str(), staged.component.name.as_str()))
            .collect()
    }
}

#[derive(Clone)]
pub struct StackResolver {
    registry: Arc<dyn StackRegistry>,
}

impl std::fmt::Debug for StackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackResolver").finish_non_exhaustive()
    }
}

impl StackResolver {
    pub fn new(registry: Arc<dyn StackRegistry>) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, id: &StackId) -> CompileResult<StackMetadata> {
        self.resolve_for("", id)
    }

    /// Resolves every declared stack, aborting on the first failure.
    pub fn resolve_all(&self, blueprint: Blueprint) -> CompileResult<ResolvedBlueprint> {
        let mut stacks = HashMap::with_capacity(blueprint.stack_ids.len());
        for id in blueprint.stack_ids() {
            if stacks.contains_key(id) {
                continue;
            }
            match self.resolve_for(&blueprint.name, id) {
                Ok(meta) => {
                    stacks.insert(id.clone(), Arc::new(meta));
                }
                Err(err) => {
                    tracing::warn!(
                        blueprint = %blueprint.name,
                        stack = %id,
                        error = %err,
                        "stack resolution failed; discarding blueprint"
                    );
                    return Err(err);
                }
            }
        }
        Ok(ResolvedBlueprint { blueprint, stacks })
    }

    fn resolve_for(&self, blueprint: &str, id: &StackId) -> CompileResult<StackMetadata> {
        tracing::debug!(blueprint, stack = %id, "resolving stack");
        self.registry.lookup(id).map_err(|err| match err {
            RegistryError::NotFound(_) => CompileError::StackNotFound {
                blueprint: blueprint.to_string(),
                stack: id.clone(),
            },
            RegistryError::Failure(source) => CompileError::StackResolution {
                blueprint: blueprint.to_string(),
                stack: id.clone(),
                source,
            },
        })
    }
}
