#[path = "helpers.rs"]
mod helpers;

use bp_compiler::{CodecOptions, CompileError, CompilerConfig, PropertyBag, StackMetadata};
use bp_types::{ProvisionAction, SecurityConfiguration, SecurityType, StackId, StructuralError};
use helpers::{assert_matches_schema, compiler, compiler_with, fixture, fixture_json};
use serde_json::{Value, json};
use std::sync::Arc;

fn stack(id: &str) -> StackId {
    StackId::parse(id).unwrap()
}

#[test]
fn fixtures_match_the_wire_schema() {
    for name in [
        "example.json",
        "multi_stack.json",
        "missing_stack.json",
        "duplicate_host_groups.json",
        "duplicate_components.json",
    ] {
        assert_matches_schema(&fixture_json(name));
    }
}

#[test]
fn example_document_compiles() {
    let resolved = compiler().from_document(&fixture("example.json")).unwrap();
    let bp = resolved.blueprint();

    assert_eq!(bp.name, "my-cluster");
    assert_eq!(bp.host_groups.len(), 1);
    let group = bp.host_group("group1").unwrap();
    assert_eq!(group.components.len(), 1);
    assert_eq!(
        group.component("NAMENODE").unwrap().provision_action,
        Some(ProvisionAction::InstallAndStart)
    );
    assert_eq!(bp.security.security_type, SecurityType::Kerberos);
    assert_eq!(bp.security.descriptor_reference.as_deref(), Some("ref"));

    let hdp = resolved.stack(&stack("HDP-3.0")).unwrap();
    assert_eq!(hdp.service_of("NAMENODE"), Some("HDFS"));
    assert!(resolved.unknown_components().is_empty());
}

#[test]
fn host_group_configuration_overrides_blueprint_level() {
    let resolved = compiler().from_document(&fixture("example.json")).unwrap();
    let effective = resolved
        .blueprint()
        .effective_configuration("group1")
        .unwrap();
    assert_eq!(effective.property("core-site", "a"), Some("2"));
    assert_eq!(effective.property("core-site", "b"), Some("3"));
    assert_eq!(effective.groups().collect::<Vec<_>>(), vec!["core-site"]);
}

#[test]
fn multiple_stacks_resolve_in_declaration_order() {
    let resolved = compiler()
        .from_document(&fixture("multi_stack.json"))
        .unwrap();
    let ids: Vec<String> = resolved.stacks().map(|(id, _)| id.to_string()).collect();
    assert_eq!(ids, vec!["HDP-3.0", "HDF-3.1"]);

    let flow = resolved.blueprint().host_group("flow").unwrap();
    assert_eq!(flow.cardinality.as_deref(), Some("2+"));
    assert_eq!(
        flow.configuration
            .property("nifi-properties", "nifi.web.http.port"),
        Some("9090")
    );
    assert_eq!(
        flow.configuration
            .attribute("nifi-properties", "nifi.web.http.port", "final"),
        Some("true")
    );

    let master = resolved.blueprint().host_group("master").unwrap();
    assert_eq!(master.cardinality.as_deref(), Some(bp_types::DEFAULT_CARDINALITY));
    assert_eq!(
        master.component("ZOOKEEPER_SERVER").unwrap().provision_action(),
        ProvisionAction::InstallOnly
    );

    let staged = resolved.component_stacks();
    let nifi = staged
        .iter()
        .find(|s| s.component.name == "NIFI_MASTER")
        .unwrap();
    assert_eq!(nifi.stacks.len(), 1);
    assert_eq!(nifi.stacks[0].name, "HDF");
}

#[test]
fn one_missing_stack_fails_the_whole_blueprint() {
    let err = compiler()
        .from_document(&fixture("missing_stack.json"))
        .unwrap_err();
    match err {
        CompileError::StackNotFound { blueprint, stack: missing } => {
            assert_eq!(blueprint, "half-resolvable");
            assert_eq!(missing, stack("BOGUS-1.0"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn duplicate_names_are_structural_errors() {
    let err = compiler()
        .from_document(&fixture("duplicate_host_groups.json"))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Structural(StructuralError::DuplicateHostGroup { ref host_group, .. })
            if host_group == "group1"
    ));

    let err = compiler()
        .from_document(&fixture("duplicate_components.json"))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Structural(StructuralError::DuplicateComponent { ref component, .. })
            if component == "NAMENODE"
    ));
}

#[test]
fn encoded_document_round_trips_and_matches_schema() {
    let compiler = compiler();
    let resolved = compiler
        .from_document(&fixture("multi_stack.json"))
        .unwrap();
    let bytes = compiler.to_document(&resolved).unwrap();

    let encoded: Value = serde_json::from_slice(&bytes).unwrap();
    assert_matches_schema(&encoded);
    assert_eq!(encoded["stack_ids"], json!(["HDP-3.0", "HDF-3.1"]));

    let again = compiler.from_document(&bytes).unwrap();
    assert_eq!(again.blueprint(), resolved.blueprint());
}

#[test]
fn resolved_metadata_is_not_embedded_in_documents() {
    let compiler = compiler();
    let resolved = compiler.from_document(&fixture("example.json")).unwrap();
    let encoded: Value = serde_json::from_slice(&compiler.to_document(&resolved).unwrap()).unwrap();
    let mut keys: Vec<&str> = encoded
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "blueprint_name",
            "configurations",
            "host_groups",
            "security",
            "settings",
            "stack_ids"
        ]
    );
}

#[test]
fn pretty_output_is_configurable() {
    let config = CompilerConfig {
        codec: CodecOptions { pretty: true },
        ..CompilerConfig::default()
    };
    let compiler = compiler_with(Arc::new(bp_store::MemStore::new()), config);
    let resolved = compiler.from_document(&fixture("example.json")).unwrap();
    let text = String::from_utf8(compiler.to_document(&resolved).unwrap()).unwrap();
    assert!(text.contains("\n  \"blueprint_name\": \"my-cluster\""));
}

fn props(value: Value) -> PropertyBag {
    serde_json::from_value(value).unwrap()
}

#[test]
fn properties_without_a_name_are_rejected() {
    let compiler = compiler();
    for bag in [json!({}), json!({"blueprint_name": ""}), json!({"blueprint_name": null})] {
        match compiler.from_properties(&props(bag), None) {
            Err(CompileError::Validation(msg)) => {
                assert_eq!(msg, "Blueprint name must be provided")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}

#[test]
fn properties_named_null_are_a_legitimate_blueprint() {
    let resolved = compiler()
        .from_properties(
            &props(json!({"blueprint_name": "null", "stack_ids": ["HDP-3.0"]})),
            None,
        )
        .unwrap();
    assert_eq!(resolved.name(), "null");
}

#[test]
fn properties_with_qualified_ids_and_security() {
    let bag = props(json!({
        "Blueprints/blueprint_name": "from-bag",
        "Blueprints/stack_name": "HDP",
        "Blueprints/stack_version": "3.0",
        "host_groups": [
            {"name": "group1", "components": [{"name": "NAMENODE"}, {"name": "DATANODE"}]}
        ],
        "configurations": [{"hdfs-site": {"properties": {"dfs.replication": "2"}}}]
    }));
    let resolved = compiler()
        .from_properties(&bag, Some(SecurityConfiguration::kerberos("kdc-ref")))
        .unwrap();
    let bp = resolved.blueprint();
    assert_eq!(bp.name, "from-bag");
    assert_eq!(bp.stack_ids().collect::<Vec<_>>(), vec![&stack("HDP-3.0")]);
    assert_eq!(bp.configuration.property("hdfs-site", "dfs.replication"), Some("2"));
    assert_eq!(bp.security.security_type, SecurityType::Kerberos);
    assert_eq!(bp.security.descriptor_reference.as_deref(), Some("kdc-ref"));
}

#[test]
fn properties_referencing_unknown_stacks_fail() {
    let err = compiler()
        .from_properties(
            &props(json!({"blueprint_name": "nope", "stack_ids": ["BOGUS-1.0"]})),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, CompileError::StackNotFound { .. }));
}

#[test]
fn in_memory_registry_is_interchangeable() {
    let registry = bp_compiler::InMemoryStackRegistry::new()
        .with_stack(StackMetadata::new(&stack("HDP-3.0")).with_service("HDFS", ["NAMENODE"]))
        .unwrap();
    let compiler = bp_compiler::BlueprintCompiler::new(
        Arc::new(registry),
        Arc::new(bp_store::MemStore::new()),
        CompilerConfig::default(),
    );
    let resolved = compiler.from_document(&fixture("example.json")).unwrap();
    assert_eq!(resolved.stacks().count(), 1);
}
