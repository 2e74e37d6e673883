//! Post-decode normalization pass.
//!
//! Runs once after a blueprint document has been decoded (or built from a
//! property map) and before any stack is resolved. It canonicalizes the stack
//! id set, fills optional defaults, and rejects structurally invalid
//! documents. The pass is idempotent.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{Blueprint, DEFAULT_CARDINALITY, Name, ProvisionAction};

static BLUEPRINT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("blueprint name pattern"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    #[error("blueprint name must be provided")]
    MissingName,
    #[error("blueprint name '{name}' contains special characters")]
    InvalidName { name: Name },
    #[error("blueprint {blueprint} does not declare any stack ids")]
    MissingStackIds { blueprint: Name },
    #[error("blueprint {blueprint} has a host group without a name")]
    EmptyHostGroupName { blueprint: Name },
    #[error("blueprint {blueprint} has duplicate host group {host_group}")]
    DuplicateHostGroup { blueprint: Name, host_group: Name },
    #[error("blueprint {blueprint} host group {host_group} has a component without a name")]
    EmptyComponentName { blueprint: Name, host_group: Name },
    #[error("blueprint {blueprint} host group {host_group} has duplicate component {component}")]
    DuplicateComponent {
        blueprint: Name,
        host_group: Name,
        component: Name,
    },
    #[error("stored entity field {field} ({stored}) disagrees with its document ({document})")]
    EntityMismatch {
        field: &'static str,
        stored: String,
        document: String,
    },
}

pub fn is_valid_blueprint_name(name: &str) -> bool {
    BLUEPRINT_NAME.is_match(name)
}

/// Checks structural invariants without modifying the blueprint.
pub fn validate_structure(blueprint: &Blueprint) -> Result<(), StructuralError> {
    if blueprint.name.trim().is_empty() {
        return Err(StructuralError::MissingName);
    }
    if !is_valid_blueprint_name(&blueprint.name) {
        return Err(StructuralError::InvalidName {
            name: blueprint.name.clone(),
        });
    }
    if blueprint.stack_ids.is_empty() {
        return Err(StructuralError::MissingStackIds {
            blueprint: blueprint.name.clone(),
        });
    }

    let mut group_names = HashSet::new();
    for group in &blueprint.host_groups {
        if group.name.trim().is_empty() {
            return Err(StructuralError::EmptyHostGroupName {
                blueprint: blueprint.name.clone(),
            });
        }
        if !group_names.insert(group.name.as_str()) {
            return Err(StructuralError::DuplicateHostGroup {
                blueprint: blueprint.name.clone(),
                host_group: group.name.clone(),
            });
        }

        let mut component_names = HashSet::new();
        for component in &group.components {
            if component.name.trim().is_empty() {
                return Err(StructuralError::EmptyComponentName {
                    blueprint: blueprint.name.clone(),
                    host_group: group.name.clone(),
                });
            }
            if !component_names.insert(component.name.as_str()) {
                return Err(StructuralError::DuplicateComponent {
                    blueprint: blueprint.name.clone(),
                    host_group: group.name.clone(),
                    component: component.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validates the blueprint and fills defaults.
///
/// - stack ids are re-keyed by their canonical `<name>-<version>` form,
///   keeping first-seen order and dropping duplicates
/// - components without a provision action get `INSTALL_AND_START`
/// - host groups without a cardinality get [`DEFAULT_CARDINALITY`]
///
/// The security type needs no filling here: an absent `security` block
/// already decodes to `NONE`.
pub fn normalize(mut blueprint: Blueprint) -> Result<Blueprint, StructuralError> {
    validate_structure(&blueprint)?;

    let canonical: IndexMap<_, _> = blueprint
        .stack_ids
        .values()
        .map(|id| (id.to_string(), id.clone()))
        .collect();
    blueprint.stack_ids = canonical;

    for group in &mut blueprint.host_groups {
        if group.cardinality.as_deref().is_none_or(|c| c.trim().is_empty()) {
            group.cardinality = Some(DEFAULT_CARDINALITY.to_string());
        }
        for component in &mut group.components {
            component
                .provision_action
                .get_or_insert(ProvisionAction::default());
        }
    }

    tracing::debug!(
        blueprint = %blueprint.name,
        host_groups = blueprint.host_groups.len(),
        stacks = blueprint.stack_ids.len(),
        "normalized blueprint"
    );
    Ok(blueprint)
}
