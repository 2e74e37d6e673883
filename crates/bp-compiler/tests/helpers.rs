//! Shared helpers for the compiler integration tests.
//!
//! Each integration test compiles this module separately, so some helpers
//! look unused from any single test file.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use bp_compiler::{BlueprintCompiler, CompilerConfig, FsStackRegistry};
use bp_store::BlueprintStore;
use jsonschema::JSONSchema;
use serde_json::Value;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
}

pub fn fixture_json(name: &str) -> Value {
    serde_json::from_slice(&fixture(name)).expect("fixture is valid JSON")
}

/// Registry over the checked-in `fixtures/stacks` tree (HDP-3.0 and HDF-3.1).
pub fn stack_registry() -> Arc<FsStackRegistry> {
    Arc::new(FsStackRegistry::new(fixtures_dir().join("stacks")))
}

pub fn compiler_with(store: Arc<dyn BlueprintStore>, config: CompilerConfig) -> BlueprintCompiler {
    init_tracing();
    BlueprintCompiler::new(stack_registry(), store, config)
}

pub fn compiler() -> BlueprintCompiler {
    compiler_with(Arc::new(bp_store::MemStore::new()), CompilerConfig::default())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn assert_matches_schema(instance: &Value) {
    let schema: Value =
        serde_json::from_str(bp_types::schemas::BLUEPRINT).expect("embedded schema is JSON");
    let compiled = JSONSchema::compile(&schema).expect("embedded schema compiles");
    if let Err(errors) = compiled.validate(instance) {
        let messages: Vec<String> = errors
            .map(|err| format!("{}: {}", err.instance_path, err))
            .collect();
        panic!("schema validation failed: {}", messages.join("; "));
    }
}
