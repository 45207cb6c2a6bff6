//! Error types for binding generation

use crate::TargetId;
use std::fmt;
use thiserror::Error;

/// Result type alias for generation operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Error type for generation operations
///
/// Every variant is a structural problem found at generation time, never
/// at the generated code's own runtime.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Struct references form a cycle
    #[error("cyclic reference: {}", .cycle.join(" -> "))]
    CyclicReference { cycle: Vec<String> },

    /// A StructRef/EnumRef names nothing declared
    #[error("undefined {kind} reference '{name}' in {referenced_from}")]
    UndefinedReference {
        kind: &'static str,
        name: String,
        referenced_from: String,
    },

    /// The same name is declared twice in one scope
    #[error("name collision in {scope}: '{name}' is declared more than once")]
    NameCollision { scope: String, name: String },

    /// Two members of one enum share an ordinal
    #[error("duplicate ordinal {ordinal} in enum {enum_name}: '{member}' repeats '{previous}'")]
    DuplicateOrdinal {
        enum_name: String,
        ordinal: i64,
        member: String,
        previous: String,
    },

    /// Identifier is not a valid canonical identifier
    #[error("invalid identifier '{identifier}' in {context}")]
    InvalidIdentifier { identifier: String, context: String },

    /// A type appears in a position where it has no meaning
    #[error("invalid type usage in {context}: {reason}")]
    InvalidTypeUsage { context: String, reason: String },

    /// Escaping a target identifier did not resolve the collision
    #[error("[{target}] naming collision in {scope}: '{identifier}' {reason}")]
    NamingCollision {
        target: TargetId,
        scope: String,
        identifier: String,
        reason: String,
    },

    /// The target's type table has no entry for a type
    #[error("[{target}] no mapping for type {ty}")]
    UnmappedType { target: TargetId, ty: String },

    /// One or more targets failed to emit
    #[error("generation failed for {}", join_failures(.0))]
    TargetsFailed(Vec<TargetFailure>),

    /// Emitted output disagrees with the interface model
    #[error("{} consistency violation(s): {}", .0.len(), join_violations(.0))]
    Inconsistent(Vec<ConsistencyViolation>),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl GenerationError {
    /// Returns a stable error code, used as the CLI exit status
    pub fn error_code(&self) -> u8 {
        match self {
            GenerationError::CyclicReference { .. } => 2,
            GenerationError::UndefinedReference { .. } => 3,
            GenerationError::NameCollision { .. } => 4,
            GenerationError::DuplicateOrdinal { .. } => 5,
            GenerationError::InvalidIdentifier { .. } => 6,
            GenerationError::InvalidTypeUsage { .. } => 7,
            GenerationError::NamingCollision { .. } => 8,
            GenerationError::UnmappedType { .. } => 9,
            GenerationError::TargetsFailed(_) => 10,
            GenerationError::Inconsistent(_) => 11,
            GenerationError::Config(_) => 12,
            GenerationError::Internal(_) => 13,
        }
    }

    /// Whether the error was raised before any emitter ran
    pub fn is_model_error(&self) -> bool {
        matches!(
            self,
            GenerationError::CyclicReference { .. }
                | GenerationError::UndefinedReference { .. }
                | GenerationError::NameCollision { .. }
                | GenerationError::DuplicateOrdinal { .. }
                | GenerationError::InvalidIdentifier { .. }
                | GenerationError::InvalidTypeUsage { .. }
                | GenerationError::NamingCollision { .. }
        )
    }
}

/// A single target's emission failure
#[derive(Debug)]
pub struct TargetFailure {
    pub target: TargetId,
    pub error: Box<GenerationError>,
}

impl TargetFailure {
    pub fn new(target: TargetId, error: GenerationError) -> Self {
        Self {
            target,
            error: Box::new(error),
        }
    }
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.error)
    }
}

/// A mismatch between the interface model and one target's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyViolation {
    /// Target whose output disagrees
    pub target: TargetId,
    /// Entity path, e.g. `operation calculate` or `enum Operation.ADD`
    pub entity: String,
    /// Value derived from the interface model
    pub expected: String,
    /// Value found in the emitted output
    pub observed: String,
}

impl fmt::Display for ConsistencyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: expected {}, observed {}",
            self.target, self.entity, self.expected, self.observed
        )
    }
}

fn join_failures(failures: &[TargetFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_violations(violations: &[ConsistencyViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<toml::de::Error> for GenerationError {
    fn from(err: toml::de::Error) -> Self {
        GenerationError::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
