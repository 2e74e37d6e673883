//! Flat property-bag input, as produced by a resource creation API.
//!
//! Property ids are either plain document fields (`blueprint_name`,
//! `host_groups`) or category-qualified (`Blueprints/blueprint_name`). The
//! bag is folded into a wire document and then decoded like any other.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{CompileError, CompileResult};

pub type PropertyBag = IndexMap<String, Value>;

pub const BLUEPRINT_CATEGORY: &str = "Blueprints";
pub const BLUEPRINT_NAME_PROPERTY: &str = "blueprint_name";
pub const STACK_IDS_PROPERTY: &str = "stack_ids";
pub const STACK_NAME_PROPERTY: &str = "stack_name";
pub const STACK_VERSION_PROPERTY: &str = "stack_version";

pub const MISSING_NAME_MESSAGE: &str = "Blueprint name must be provided";

/// `category/name`, the id format used for qualified properties.
pub fn property_id(category: &str, name: &str) -> String {
    format!("{category}/{name}")
}

/// Folds a property bag into a wire document.
///
/// The blueprint name must be present as a non-empty string. A string that
/// happens to read `"null"` is a real name, only an absent or JSON `null`
/// value counts as missing.
pub fn properties_to_document(props: &PropertyBag) -> CompileResult<Value> {
    let mut document = Map::new();
    let qualified_prefix = property_id(BLUEPRINT_CATEGORY, "");

    for (id, value) in props {
        match id.strip_prefix(&qualified_prefix) {
            Some(field) => {
                // plain ids win over their qualified spelling
                if !props.contains_key(field) {
                    document.insert(field.to_string(), value.clone());
                }
            }
            None => {
                document.insert(id.clone(), value.clone());
            }
        }
    }

    match document.get(BLUEPRINT_NAME_PROPERTY) {
        Some(Value::String(name)) if !name.is_empty() => {}
        _ => return Err(CompileError::Validation(MISSING_NAME_MESSAGE.into())),
    }

    fold_legacy_stack(&mut document)?;
    Ok(Value::Object(document))
}

fn fold_legacy_stack(document: &mut Map<String, Value>) -> CompileResult<()> {
    let name = document.remove(STACK_NAME_PROPERTY);
    let version = document.remove(STACK_VERSION_PROPERTY);
    if document.contains_key(STACK_IDS_PROPERTY) {
        return Ok(());
    }
    match (name, version) {
        (None, None) => Ok(()),
        (Some(Value::String(name)), Some(Value::String(version))) => {
            document.insert(
                STACK_IDS_PROPERTY.to_string(),
                Value::Array(vec![Value::String(format!("{name}-{version}"))]),
            );
            Ok(())
        }
        _ => Err(CompileError::Validation(format!(
            "{STACK_NAME_PROPERTY} and {STACK_VERSION_PROPERTY} must both be provided as strings"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> PropertyBag {
        serde_json::from_value(value).unwrap()
    }

    fn assert_missing_name(props: Value) {
        match properties_to_document(&bag(props)) {
            Err(CompileError::Validation(msg)) => assert_eq!(msg, MISSING_NAME_MESSAGE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn name_is_required() {
        assert_missing_name(json!({}));
        assert_missing_name(json!({"blueprint_name": ""}));
        assert_missing_name(json!({"blueprint_name": null}));
        assert_missing_name(json!({"blueprint_name": 42}));
        assert_missing_name(json!({"Blueprints/blueprint_name": ""}));
    }

    #[test]
    fn literal_null_string_is_a_name() {
        let doc = properties_to_document(&bag(json!({"blueprint_name": "null"}))).unwrap();
        assert_eq!(doc["blueprint_name"], "null");
    }

    #[test]
    fn qualified_ids_fold_into_top_level() {
        let doc = properties_to_document(&bag(json!({
            "Blueprints/blueprint_name": "qualified",
            "Blueprints/stack_ids": ["HDP-3.0"],
            "host_groups": [{"name": "g"}]
        })))
        .unwrap();
        assert_eq!(
            doc,
            json!({
                "blueprint_name": "qualified",
                "stack_ids": ["HDP-3.0"],
                "host_groups": [{"name": "g"}]
            })
        );
    }

    #[test]
    fn plain_id_wins_over_qualified() {
        let doc = properties_to_document(&bag(json!({
            "blueprint_name": "plain",
            "Blueprints/blueprint_name": "qualified"
        })))
        .unwrap();
        assert_eq!(doc["blueprint_name"], "plain");
    }

    #[test]
    fn legacy_stack_properties_become_stack_ids() {
        let doc = properties_to_document(&bag(json!({
            "Blueprints/blueprint_name": "legacy",
            "Blueprints/stack_name": "HDP",
            "Blueprints/stack_version": "2.6"
        })))
        .unwrap();
        assert_eq!(doc["stack_ids"], json!(["HDP-2.6"]));
        assert!(doc.get("stack_name").is_none());
        assert!(doc.get("stack_version").is_none());
    }

    #[test]
    fn explicit_stack_ids_take_precedence() {
        let doc = properties_to_document(&bag(json!({
            "blueprint_name": "both",
            "stack_ids": ["HDP-3.0"],
            "stack_name": "HDP",
            "stack_version": "2.6"
        })))
        .unwrap();
        assert_eq!(doc["stack_ids"], json!(["HDP-3.0"]));
    }

    #[test]
    fn half_a_legacy_stack_is_rejected() {
        let err = properties_to_document(&bag(json!({
            "blueprint_name": "half",
            "stack_name": "HDP"
        })))
        .unwrap_err();
        assert!(matches!(err, CompileError::Validation(_)));
    }

    #[test]
    fn property_ids_are_slash_qualified() {
        assert_eq!(
            property_id(BLUEPRINT_CATEGORY, BLUEPRINT_NAME_PROPERTY),
            "Blueprints/blueprint_name"
        );
    }
}
