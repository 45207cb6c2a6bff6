//! Per-target type tables.
//!
//! A [`TypeTable`] maps canonical [`AbstractType`]s to native declaration
//! text. Tables are plain data injected into each target's emitter; there is
//! no global registry. Resolution is a pure function of the table, the type
//! and the target's [`NameMap`].
//!
//! Templates use `{T}` for the element type and `{K}`/`{V}` for mapping keys
//! and values. Generic positions always receive the *boxed* text of the inner
//! type (`List<Integer>`, never `List<int>`).

use crate::model::{AbstractType, PrimitiveKind};
use crate::naming::NameMap;
use crate::{GenerationError, GenerationResult, TargetId};
use std::collections::{BTreeMap, BTreeSet};

/// How a value is passed as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Passing {
    #[default]
    Value,
    ConstRef,
}

/// How a target surfaces asynchronous completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncConvention {
    /// The operation returns a handle (future/promise) to the result.
    ReturnHandle,
    /// The operation takes a trailing continuation parameter.
    CallbackParameter,
}

/// A resolved native type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Declaration text, e.g. `int` or `std::vector<Reading>`.
    pub text: String,
    /// Text for generic positions, e.g. `Integer`.
    pub boxed: String,
    /// Imports or includes the text requires.
    pub imports: BTreeSet<String>,
    pub passing: Passing,
    /// Set only for deferred results.
    pub convention: Option<AsyncConvention>,
}

impl NativeType {
    fn named(text: &str, passing: Passing) -> Self {
        Self {
            text: text.to_string(),
            boxed: text.to_string(),
            imports: BTreeSet::new(),
            passing,
            convention: None,
        }
    }

    pub fn is_const_ref(&self) -> bool {
        self.passing == Passing::ConstRef
    }
}

/// Table entry for one primitive kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveEntry {
    text: String,
    boxed: String,
    imports: Vec<String>,
    passing: Passing,
}

impl PrimitiveEntry {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            boxed: text.clone(),
            text,
            imports: Vec::new(),
            passing: Passing::Value,
        }
    }

    pub fn with_boxed(mut self, boxed: impl Into<String>) -> Self {
        self.boxed = boxed.into();
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.passing = Passing::ConstRef;
        self
    }
}

/// A generic container template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
    imports: Vec<String>,
    passing: Passing,
}

impl Template {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            imports: Vec::new(),
            passing: Passing::Value,
        }
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.passing = Passing::ConstRef;
        self
    }
}

/// Template for `DeferredResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredTemplate {
    pattern: String,
    void_pattern: Option<String>,
    imports: Vec<String>,
    convention: AsyncConvention,
}

impl DeferredTemplate {
    pub fn new(pattern: impl Into<String>, convention: AsyncConvention) -> Self {
        Self {
            pattern: pattern.into(),
            void_pattern: None,
            imports: Vec::new(),
            convention,
        }
    }

    /// Text used when the deferred payload is `void`.
    pub fn with_void_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.void_pattern = Some(pattern.into());
        self
    }

    pub fn with_import(mut self, import: impl Into<String>) -> Self {
        self.imports.push(import.into());
        self
    }
}

/// A target's closed type table.
#[derive(Debug, Clone)]
pub struct TypeTable {
    target: TargetId,
    primitives: BTreeMap<PrimitiveKind, PrimitiveEntry>,
    sequence: Template,
    mapping: Template,
    deferred: DeferredTemplate,
    struct_passing: Passing,
    enum_passing: Passing,
}

impl TypeTable {
    /// Create a table with no primitive entries.
    pub fn new(
        target: TargetId,
        sequence: Template,
        mapping: Template,
        deferred: DeferredTemplate,
    ) -> Self {
        Self {
            target,
            primitives: BTreeMap::new(),
            sequence,
            mapping,
            deferred,
            struct_passing: Passing::Value,
            enum_passing: Passing::Value,
        }
    }

    pub fn with_primitive(mut self, kind: PrimitiveKind, entry: PrimitiveEntry) -> Self {
        self.primitives.insert(kind, entry);
        self
    }

    /// Remove a primitive entry. Resolving that kind afterwards fails with
    /// `UnmappedType`.
    pub fn without_primitive(mut self, kind: PrimitiveKind) -> Self {
        self.primitives.remove(&kind);
        self
    }

    pub fn with_struct_passing(mut self, passing: Passing) -> Self {
        self.struct_passing = passing;
        self
    }

    pub fn with_enum_passing(mut self, passing: Passing) -> Self {
        self.enum_passing = passing;
        self
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn async_convention(&self) -> AsyncConvention {
        self.deferred.convention
    }

    pub fn has_primitive(&self, kind: PrimitiveKind) -> bool {
        self.primitives.contains_key(&kind)
    }

    /// Resolve an abstract type to native text.
    pub fn resolve(&self, ty: &AbstractType, names: &NameMap) -> GenerationResult<NativeType> {
        match ty {
            AbstractType::Primitive(kind) => self.primitive(*kind),
            AbstractType::EnumRef(name) => {
                Ok(NativeType::named(names.type_name(name)?, self.enum_passing))
            }
            AbstractType::StructRef(name) => {
                Ok(NativeType::named(names.type_name(name)?, self.struct_passing))
            }
            AbstractType::Sequence(inner) => {
                let inner = self.resolve(inner, names)?;
                let text = self.sequence.pattern.replace("{T}", &inner.boxed);
                Ok(compose(text, &self.sequence, [inner]))
            }
            AbstractType::Mapping { key, value } => {
                let key = self.primitive(*key)?;
                let value = self.resolve(value, names)?;
                let text = self
                    .mapping
                    .pattern
                    .replace("{K}", &key.boxed)
                    .replace("{V}", &value.boxed);
                Ok(compose(text, &self.mapping, [key, value]))
            }
            AbstractType::DeferredResult(inner) => {
                let inner = self.resolve(inner, names)?;
                let is_void = ty.payload().is_void();
                let text = match (&self.deferred.void_pattern, is_void) {
                    (Some(void_pattern), true) => void_pattern.clone(),
                    _ => self.deferred.pattern.replace("{T}", &inner.boxed),
                };

                let mut imports = inner.imports;
                imports.extend(self.deferred.imports.iter().cloned());
                Ok(NativeType {
                    boxed: text.clone(),
                    text,
                    imports,
                    passing: Passing::Value,
                    convention: Some(self.deferred.convention),
                })
            }
        }
    }

    fn primitive(&self, kind: PrimitiveKind) -> GenerationResult<NativeType> {
        let entry = self
            .primitives
            .get(&kind)
            .ok_or_else(|| GenerationError::UnmappedType {
                target: self.target,
                ty: kind.as_str().to_string(),
            })?;

        Ok(NativeType {
            text: entry.text.clone(),
            boxed: entry.boxed.clone(),
            imports: entry.imports.iter().cloned().collect(),
            passing: entry.passing,
            convention: None,
        })
    }
}

fn compose<const N: usize>(
    text: String,
    template: &Template,
    parts: [NativeType; N],
) -> NativeType {
    let mut imports: BTreeSet<String> = template.imports.iter().cloned().collect();
    for part in parts {
        imports.extend(part.imports);
    }

    NativeType {
        boxed: text.clone(),
        text,
        imports,
        passing: template.passing,
        convention: None,
    }
}

#[cfg(test)]
#[path = "types/types_tests.rs"]
mod types_tests;
