//! Blueprint topology compiler.
//!
//! Turns wire documents, property bags and stored entities into
//! [`ResolvedBlueprint`]s whose every stack reference has been looked up in a
//! [`StackRegistry`], and turns them back into documents and entities.

mod codec;
mod compiler;
pub mod config;
mod error;
pub mod host_group;
pub mod properties;
mod resolver;
pub mod stack;

pub use codec::Codec;
pub use compiler::BlueprintCompiler;
pub use config::{CodecOptions, CompilerConfig};
pub use error::{CompileError, CompileResult};
pub use host_group::{HostGroupDecoder, HostGroupRegistry};
pub use properties::PropertyBag;
pub use resolver::{ComponentStacks, ResolvedBlueprint, StackResolver};
pub use stack::{
    FsStackRegistry, InMemoryStackRegistry, RegistryError, StackMetadata, StackRegistry,
};
