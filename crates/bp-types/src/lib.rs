//! Blueprint document model: stack references, layered configuration,
//! host groups and components, plus the post-decode normalization pass.

mod configuration;
mod model;
pub mod normalize;
mod refs;
pub mod schemas;

pub use configuration::{AttributeMap, Configuration, PropertyMap};
pub use model::*;
pub use normalize::{StructuralError, normalize, validate_structure};
pub use refs::{RefError, StackId};

#[cfg(test)]
mod tests;
