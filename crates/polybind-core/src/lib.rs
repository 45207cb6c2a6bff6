//! polybind-core - Interface model, type system, resolution and naming
//!
//! This crate provides the target-independent half of polybind:
//! - [`ServiceDefinition`] and friends, the canonical interface model
//! - [`resolve`] for validation and declaration ordering
//! - [`TypeTable`] for injected per-target type mapping
//! - [`NamingStrategy`] and [`NameMap`] for per-target identifiers
//! - [`GenerationError`] for error handling
//! - [`GeneratorConfig`] for run configuration

mod config;
mod error;
pub mod model;
pub mod naming;
pub mod resolver;
mod target;
pub mod types;

pub use config::GeneratorConfig;
pub use error::{ConsistencyViolation, GenerationError, GenerationResult, TargetFailure};
pub use model::{
    AbstractType, Attribute, EnumDef, EnumMember, Event, EventPayload, Field, InterfaceVersion,
    Operation, Parameter, PrimitiveKind, ServiceDefinition, StructDef,
};
pub use naming::{Casing, MemberExpansion, NameMap, NamingStrategy, Role, Scope, ServiceMember};
pub use resolver::{Declaration, ValidatedService, resolve};
pub use target::TargetId;
pub use types::{AsyncConvention, NativeType, Passing, TypeTable};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AbstractType, GenerationError, GenerationResult, GeneratorConfig, NameMap, NamingStrategy,
        PrimitiveKind, ServiceDefinition, TargetId, TypeTable, ValidatedService, resolve,
    };
}
