//! Wire JSON Schema for blueprint documents; the file lives under `spec/schemas/`.

pub const BLUEPRINT: &str = include_str!("../../../spec/schemas/blueprint.schema.json");
