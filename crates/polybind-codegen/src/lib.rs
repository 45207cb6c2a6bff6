//! polybind-codegen - Emitters and the generation pipeline
//!
//! This crate turns a validated interface into per-target source files:
//! - [`TargetProfile`] bundles a target's type table, naming and scanner
//! - [`targets`] holds the Java, JavaScript and C++ emitters
//! - [`consistency`] re-reads emitted text and compares it to the model
//! - [`Generator`] runs resolve, naming, emission and checking end to end
//!
//! # Example
//!
//! ```
//! use polybind_codegen::Generator;
//! use polybind_core::prelude::*;
//! use polybind_core::Operation;
//!
//! let service = ServiceDefinition::new("Echo").with_operation(
//!     Operation::new("echo", AbstractType::primitive(PrimitiveKind::String))
//!         .with_param("text", AbstractType::primitive(PrimitiveKind::String)),
//! );
//!
//! let generation = Generator::new(GeneratorConfig::default())?.generate(service)?;
//! assert!(generation.report().is_clean());
//! # Ok::<(), polybind_core::GenerationError>(())
//! ```

pub mod consistency;
mod emitter;
mod output;
mod pipeline;
pub mod targets;
mod writer;

pub use consistency::{ConsistencyReport, Surface, TargetCheck, verify};
pub use emitter::TargetProfile;
pub use output::{GeneratedFile, OutputSet, compute_sha256};
pub use pipeline::{Generation, Generator};
pub use writer::{CodeWriter, banner_line};

#[cfg(test)]
pub(crate) mod test_fixtures;
