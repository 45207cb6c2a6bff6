//! Interface model: the single source of truth for a service contract.
//!
//! The model is a closed, non-recursive object graph. A loader builds a
//! [`ServiceDefinition`] once per run, the [`resolver`](crate::resolver)
//! validates it into a [`ValidatedService`](crate::ValidatedService), and
//! nothing mutates it afterwards.
//!
//! # Serialized form
//!
//! The model derives serde traits so loaders can read it from JSON or TOML:
//!
//! ```json
//! {
//!   "name": "Calculator",
//!   "package": "org.example.calculator",
//!   "operations": [{
//!     "name": "calculate",
//!     "parameters": [
//!       { "name": "left", "type": { "primitive": "float64" } },
//!       { "name": "op", "type": { "enum": "Operation" } }
//!     ],
//!     "returns": { "deferred": { "struct": "CalculationResult" } }
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete service contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service name.
    pub name: String,

    /// Dotted package, e.g. `org.example.calculator`. May be empty.
    #[serde(default)]
    pub package: String,

    /// Interface version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<InterfaceVersion>,

    /// Documentation lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,

    /// Operations in declaration order.
    #[serde(default)]
    pub operations: Vec<Operation>,

    /// Events in declaration order.
    #[serde(default)]
    pub events: Vec<Event>,

    /// Attributes in declaration order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Enumerations.
    #[serde(default)]
    pub enums: Vec<EnumDef>,

    /// Structures.
    #[serde(default)]
    pub structs: Vec<StructDef>,
}

/// Major/minor interface version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceVersion {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for InterfaceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A service operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Return payload. `DeferredResult` marks asynchronous completion.
    pub returns: AbstractType,

    /// Whether the operation can fail.
    #[serde(default)]
    pub fallible: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// An operation parameter. Defaults are not supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: AbstractType,
}

/// A structure declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDef {
    pub name: String,

    #[serde(default)]
    pub fields: Vec<Field>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// A structure field or event tuple element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: AbstractType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// An enumeration declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,

    #[serde(default)]
    pub members: Vec<EnumMember>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// An enumeration member with its wire ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,

    /// Explicit ordinal, emitted verbatim by every target.
    pub ordinal: i64,
}

/// A service event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,

    pub payload: EventPayload,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// What an event delivers to its handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    /// A single value.
    Value(AbstractType),
    /// A tuple-like anonymous structure.
    Tuple(Vec<Field>),
}

impl EventPayload {
    /// Number of arguments a handler receives.
    pub fn arity(&self) -> usize {
        match self {
            EventPayload::Value(_) => 1,
            EventPayload::Tuple(fields) => fields.len(),
        }
    }
}

/// Service state exposed as a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: AbstractType,

    /// Read-write when true, read-only otherwise.
    #[serde(default)]
    pub mutable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
}

/// Primitive kinds shared by every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
    ByteBuffer,
    /// No value. Only valid as an operation's return payload.
    Void,
}

impl PrimitiveKind {
    /// Every primitive kind.
    pub const ALL: [PrimitiveKind; 14] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt8,
        PrimitiveKind::UInt16,
        PrimitiveKind::UInt32,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
        PrimitiveKind::String,
        PrimitiveKind::ByteBuffer,
        PrimitiveKind::Void,
    ];

    /// Canonical lowercase name, as used in serialized models.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float32 => "float32",
            PrimitiveKind::Float64 => "float64",
            PrimitiveKind::String => "string",
            PrimitiveKind::ByteBuffer => "bytebuffer",
            PrimitiveKind::Void => "void",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical abstract type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractType {
    Primitive(PrimitiveKind),
    #[serde(rename = "enum")]
    EnumRef(String),
    #[serde(rename = "struct")]
    StructRef(String),
    Sequence(Box<AbstractType>),
    Mapping {
        key: PrimitiveKind,
        value: Box<AbstractType>,
    },
    /// A value produced asynchronously.
    #[serde(rename = "deferred")]
    DeferredResult(Box<AbstractType>),
}

/// A named reference found inside an [`AbstractType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeReference<'a> {
    Enum(&'a str),
    Struct(&'a str),
}

impl AbstractType {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        AbstractType::Primitive(kind)
    }

    pub fn enum_ref(name: impl Into<String>) -> Self {
        AbstractType::EnumRef(name.into())
    }

    pub fn struct_ref(name: impl Into<String>) -> Self {
        AbstractType::StructRef(name.into())
    }

    pub fn sequence(inner: AbstractType) -> Self {
        AbstractType::Sequence(Box::new(inner))
    }

    pub fn mapping(key: PrimitiveKind, value: AbstractType) -> Self {
        AbstractType::Mapping {
            key,
            value: Box::new(value),
        }
    }

    pub fn deferred(inner: AbstractType) -> Self {
        AbstractType::DeferredResult(Box::new(inner))
    }

    /// Whether this is a `DeferredResult` at the outermost level.
    pub fn is_deferred(&self) -> bool {
        matches!(self, AbstractType::DeferredResult(_))
    }

    /// Whether this is the `void` primitive.
    pub fn is_void(&self) -> bool {
        matches!(self, AbstractType::Primitive(PrimitiveKind::Void))
    }

    /// The payload a caller eventually receives: the inner type of a
    /// `DeferredResult`, or the type itself.
    pub fn payload(&self) -> &AbstractType {
        match self {
            AbstractType::DeferredResult(inner) => inner,
            other => other,
        }
    }

    /// Collect every named reference, depth-first, in source order.
    pub fn references(&self) -> Vec<TypeReference<'_>> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<TypeReference<'a>>) {
        match self {
            AbstractType::Primitive(_) => {}
            AbstractType::EnumRef(name) => refs.push(TypeReference::Enum(name)),
            AbstractType::StructRef(name) => refs.push(TypeReference::Struct(name)),
            AbstractType::Sequence(inner) | AbstractType::DeferredResult(inner) => {
                inner.collect_references(refs)
            }
            AbstractType::Mapping { value, .. } => value.collect_references(refs),
        }
    }

    /// Whether `void` or `DeferredResult` appears strictly inside this type.
    pub(crate) fn nested_kinds(&self) -> (bool, bool) {
        fn walk(ty: &AbstractType, top: bool, void: &mut bool, deferred: &mut bool) {
            match ty {
                AbstractType::Primitive(PrimitiveKind::Void) if !top => *void = true,
                AbstractType::Primitive(_)
                | AbstractType::EnumRef(_)
                | AbstractType::StructRef(_) => {}
                AbstractType::Sequence(inner) => walk(inner, false, void, deferred),
                AbstractType::Mapping { key, value } => {
                    if *key == PrimitiveKind::Void {
                        *void = true;
                    }
                    walk(value, false, void, deferred)
                }
                AbstractType::DeferredResult(inner) => {
                    if !top {
                        *deferred = true;
                    }
                    walk(inner, false, void, deferred)
                }
            }
        }

        let (mut void, mut deferred) = (false, false);
        walk(self, true, &mut void, &mut deferred);
        (void, deferred)
    }
}

impl fmt::Display for AbstractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractType::Primitive(kind) => write!(f, "{kind}"),
            AbstractType::EnumRef(name) => write!(f, "enum {name}"),
            AbstractType::StructRef(name) => write!(f, "struct {name}"),
            AbstractType::Sequence(inner) => write!(f, "sequence<{inner}>"),
            AbstractType::Mapping { key, value } => write!(f, "mapping<{key}, {value}>"),
            AbstractType::DeferredResult(inner) => write!(f, "deferred<{inner}>"),
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

impl ServiceDefinition {
    /// Create an empty service with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: String::new(),
            version: None,
            docs: Vec::new(),
            operations: Vec::new(),
            events: Vec::new(),
            attributes: Vec::new(),
            enums: Vec::new(),
            structs: Vec::new(),
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_version(mut self, major: u32, minor: u32) -> Self {
        self.version = Some(InterfaceVersion { major, minor });
        self
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    pub fn with_struct(mut self, def: StructDef) -> Self {
        self.structs.push(def);
        self
    }

    /// Package split into its dotted segments.
    pub fn package_segments(&self) -> Vec<&str> {
        self.package.split('.').filter(|s| !s.is_empty()).collect()
    }
}

impl Operation {
    pub fn new(name: impl Into<String>, returns: AbstractType) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            returns,
            fallible: false,
            docs: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, ty: AbstractType) -> Self {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn fallible(mut self) -> Self {
        self.fallible = true;
        self
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            docs: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: AbstractType) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: AbstractType) -> Self {
        Self {
            name: name.into(),
            ty,
            docs: Vec::new(),
        }
    }
}

impl EnumDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            docs: Vec::new(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, ordinal: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            ordinal,
        });
        self
    }

    pub fn with_doc(mut self, line: impl Into<String>) -> Self {
        self.docs.push(line.into());
        self
    }

    /// Whether every ordinal fits a signed 32-bit integer.
    pub fn fits_i32(&self) -> bool {
        self.members
            .iter()
            .all(|m| i32::try_from(m.ordinal).is_ok())
    }
}

impl Event {
    /// An event delivering a single value.
    pub fn value(name: impl Into<String>, ty: AbstractType) -> Self {
        Self {
            name: name.into(),
            payload: EventPayload::Value(ty),
            docs: Vec::new(),
        }
    }

    /// An event delivering a tuple of named values.
    pub fn tuple(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            payload: EventPayload::Tuple(fields),
            docs: Vec::new(),
        }
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AbstractType, mutable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            mutable,
            docs: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "model/model_tests.rs"]
mod model_tests;
