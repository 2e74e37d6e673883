use jsonschema::{JSONSchema, paths::JSONPointer};
use serde_json::Value;


pub(crate) fn assert_json_schema(schema_json: &str, instance: &Value) {
    let schema_value: Value =
        serde_json::from_str(schema_json).expect("embedded schema must be valid JSON");
    let compiled = JSONSchema::options()
        .compile(&schema_value)
        .expect("embedded schema must compile successfully");
    if let Err(errors) = compiled.validate(instance) {
        let mut messages = Vec::new();
        for err in errors {
            messages.push(format!("{}: {}", format_pointer(&err.instance_path), err));
        }
        panic!(
            "schema validation failed: {}\ninstance: {}",
            messages.join("; "),
            instance
        );
    }
}

pub(crate) fn schema_rejects(schema_json: &str, instance: &Value) -> bool {
    let schema_value: Value =
        serde_json::from_str(schema_json).expect("embedded schema must be valid JSON");
    let compiled = JSONSchema::compile(&schema_value).expect("embedded schema must compile");
    !compiled.is_valid(instance)
}

fn format_pointer(pointer: &JSONPointer) -> String {
    let text = pointer.to_string();
    if text.is_empty() { "/".into() } else { text }
}
