//! Dependency resolution and model validation.
//!
//! [`resolve`] is the only way to obtain a [`ValidatedService`]. It checks
//! identifiers, scope-level uniqueness, enum ordinals, type positions and
//! references, then orders enums and structs so that every referenced type
//! precedes its referrer.
//!
//! Ordering is a depth-first traversal with three-colour marking. Roots are
//! visited in declaration order (enums, then structs), so the result is a
//! pure function of the input.

use crate::model::{AbstractType, EnumDef, ServiceDefinition, StructDef, TypeReference};
use crate::{GenerationError, GenerationResult};
use std::collections::{HashMap, HashSet};

/// A service definition that passed validation. Immutable.
#[derive(Debug, Clone)]
pub struct ValidatedService {
    definition: ServiceDefinition,
    order: Vec<DeclarationIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationIndex {
    Enum(usize),
    Struct(usize),
}

/// A top-level type declaration.
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    Enum(&'a EnumDef),
    Struct(&'a StructDef),
}

impl<'a> Declaration<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Declaration::Enum(def) => &def.name,
            Declaration::Struct(def) => &def.name,
        }
    }
}

impl ValidatedService {
    /// The underlying definition.
    pub fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Enums and structs in dependency order.
    pub fn declarations(&self) -> impl Iterator<Item = Declaration<'_>> + '_ {
        self.order.iter().map(|index| match *index {
            DeclarationIndex::Enum(i) => Declaration::Enum(&self.definition.enums[i]),
            DeclarationIndex::Struct(i) => Declaration::Struct(&self.definition.structs[i]),
        })
    }

    /// Names of enums and structs in dependency order.
    pub fn declaration_order(&self) -> Vec<&str> {
        self.declarations().map(|d| d.name()).collect()
    }

    pub fn find_struct(&self, name: &str) -> Option<&StructDef> {
        self.definition.structs.iter().find(|s| s.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&EnumDef> {
        self.definition.enums.iter().find(|e| e.name == name)
    }
}

/// Validate a service definition and compute its declaration order.
pub fn resolve(definition: ServiceDefinition) -> GenerationResult<ValidatedService> {
    validate_identifiers(&definition)?;
    validate_members(&definition)?;

    let order = {
        let index = build_type_index(&definition)?;
        validate_types(&definition, &index)?;

        let mut orderer = Orderer::new(&definition, &index);
        for def in &definition.enums {
            orderer.visit(&def.name)?;
        }
        for def in &definition.structs {
            orderer.visit(&def.name)?;
        }
        orderer.order
    };

    tracing::debug!(
        service = %definition.name,
        declarations = order.len(),
        operations = definition.operations.len(),
        "Resolved service definition"
    );

    Ok(ValidatedService { definition, order })
}

/// Check that `s` is a canonical identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_identifier(name: &str, context: impl FnOnce() -> String) -> GenerationResult<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(GenerationError::InvalidIdentifier {
            identifier: name.to_string(),
            context: context(),
        })
    }
}

fn validate_identifiers(def: &ServiceDefinition) -> GenerationResult<()> {
    check_identifier(&def.name, || "service name".to_string())?;
    if !def.package.is_empty() {
        for segment in def.package.split('.') {
            check_identifier(segment, || format!("package {}", def.package))?;
        }
    }

    for op in &def.operations {
        check_identifier(&op.name, || "operation".to_string())?;
        for param in &op.parameters {
            check_identifier(&param.name, || format!("parameter of {}", op.name))?;
        }
    }
    for event in &def.events {
        check_identifier(&event.name, || "event".to_string())?;
        if let crate::model::EventPayload::Tuple(fields) = &event.payload {
            for field in fields {
                check_identifier(&field.name, || format!("payload of event {}", event.name))?;
            }
        }
    }
    for attr in &def.attributes {
        check_identifier(&attr.name, || "attribute".to_string())?;
    }
    for e in &def.enums {
        check_identifier(&e.name, || "enum".to_string())?;
        for member in &e.members {
            check_identifier(&member.name, || format!("member of enum {}", e.name))?;
        }
    }
    for s in &def.structs {
        check_identifier(&s.name, || "struct".to_string())?;
        for field in &s.fields {
            check_identifier(&field.name, || format!("field of struct {}", s.name))?;
        }
    }

    Ok(())
}

fn ensure_unique<'a>(
    scope: impl FnOnce() -> String,
    names: impl IntoIterator<Item = &'a str>,
) -> GenerationResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(GenerationError::NameCollision {
                scope: scope(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_members(def: &ServiceDefinition) -> GenerationResult<()> {
    // Operations, events and attributes all surface as members of one
    // service type on every target.
    let service_members = def
        .operations
        .iter()
        .map(|o| o.name.as_str())
        .chain(def.events.iter().map(|e| e.name.as_str()))
        .chain(def.attributes.iter().map(|a| a.name.as_str()));
    ensure_unique(|| format!("service {}", def.name), service_members)?;

    for op in &def.operations {
        ensure_unique(
            || format!("operation {}", op.name),
            op.parameters.iter().map(|p| p.name.as_str()),
        )?;
    }
    for event in &def.events {
        if let crate::model::EventPayload::Tuple(fields) = &event.payload {
            ensure_unique(
                || format!("event {}", event.name),
                fields.iter().map(|f| f.name.as_str()),
            )?;
        }
    }
    for s in &def.structs {
        ensure_unique(
            || format!("struct {}", s.name),
            s.fields.iter().map(|f| f.name.as_str()),
        )?;
    }
    for e in &def.enums {
        ensure_unique(
            || format!("enum {}", e.name),
            e.members.iter().map(|m| m.name.as_str()),
        )?;

        let mut ordinals: HashMap<i64, &str> = HashMap::new();
        for member in &e.members {
            if let Some(previous) = ordinals.insert(member.ordinal, &member.name) {
                return Err(GenerationError::DuplicateOrdinal {
                    enum_name: e.name.clone(),
                    ordinal: member.ordinal,
                    member: member.name.clone(),
                    previous: previous.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn build_type_index(def: &ServiceDefinition) -> GenerationResult<HashMap<&str, DeclarationIndex>> {
    let mut index = HashMap::new();
    let declared = def
        .enums
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.as_str(), DeclarationIndex::Enum(i)))
        .chain(
            def.structs
                .iter()
                .enumerate()
                .map(|(i, s)| (s.name.as_str(), DeclarationIndex::Struct(i))),
        );

    for (name, idx) in declared {
        if index.insert(name, idx).is_some() {
            return Err(GenerationError::NameCollision {
                scope: "top-level types".to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(index)
}

fn validate_types(
    def: &ServiceDefinition,
    index: &HashMap<&str, DeclarationIndex>,
) -> GenerationResult<()> {
    for s in &def.structs {
        for field in &s.fields {
            let context = || format!("field {}.{}", s.name, field.name);
            check_value_type(&field.ty, context)?;
            check_references(&field.ty, index, context)?;
        }
    }
    for op in &def.operations {
        for param in &op.parameters {
            let context = || format!("parameter {}.{}", op.name, param.name);
            check_value_type(&param.ty, context)?;
            check_references(&param.ty, index, context)?;
        }
        let context = || format!("return type of {}", op.name);
        check_return_type(&op.returns, context)?;
        check_references(&op.returns, index, context)?;
    }
    for event in &def.events {
        match &event.payload {
            crate::model::EventPayload::Value(ty) => {
                let context = || format!("payload of event {}", event.name);
                check_value_type(ty, context)?;
                check_references(ty, index, context)?;
            }
            crate::model::EventPayload::Tuple(fields) => {
                for field in fields {
                    let context = || format!("payload {}.{}", event.name, field.name);
                    check_value_type(&field.ty, context)?;
                    check_references(&field.ty, index, context)?;
                }
            }
        }
    }
    for attr in &def.attributes {
        let context = || format!("attribute {}", attr.name);
        check_value_type(&attr.ty, context)?;
        check_references(&attr.ty, index, context)?;
    }

    Ok(())
}

fn check_value_type(ty: &AbstractType, context: impl Fn() -> String) -> GenerationResult<()> {
    let (nested_void, nested_deferred) = ty.nested_kinds();
    let reason = if ty.is_void() || nested_void {
        Some("void is only valid as an operation result")
    } else if ty.is_deferred() || nested_deferred {
        Some("deferred results are only valid as an operation result")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GenerationError::InvalidTypeUsage {
            context: context(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_return_type(ty: &AbstractType, context: impl Fn() -> String) -> GenerationResult<()> {
    let payload = ty.payload();
    let (nested_void, nested_deferred) = payload.nested_kinds();
    let reason = if nested_void {
        Some("void cannot be nested inside another type")
    } else if payload.is_deferred() || nested_deferred {
        Some("deferred results cannot be nested")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GenerationError::InvalidTypeUsage {
            context: context(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

fn check_references(
    ty: &AbstractType,
    index: &HashMap<&str, DeclarationIndex>,
    context: impl Fn() -> String,
) -> GenerationResult<()> {
    for reference in ty.references() {
        let (kind, name, found) = match reference {
            TypeReference::Enum(name) => (
                "enum",
                name,
                matches!(index.get(name), Some(DeclarationIndex::Enum(_))),
            ),
            TypeReference::Struct(name) => (
                "struct",
                name,
                matches!(index.get(name), Some(DeclarationIndex::Struct(_))),
            ),
        };
        if !found {
            return Err(GenerationError::UndefinedReference {
                kind,
                name: name.to_string(),
                referenced_from: context(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Orderer<'a> {
    def: &'a ServiceDefinition,
    index: &'a HashMap<&'a str, DeclarationIndex>,
    marks: HashMap<&'a str, Mark>,
    stack: Vec<&'a str>,
    order: Vec<DeclarationIndex>,
}

impl<'a> Orderer<'a> {
    fn new(def: &'a ServiceDefinition, index: &'a HashMap<&'a str, DeclarationIndex>) -> Self {
        Self {
            def,
            index,
            marks: HashMap::new(),
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, name: &'a str) -> GenerationResult<()> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.stack.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> =
                    self.stack[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(name.to_string());
                return Err(GenerationError::CyclicReference { cycle });
            }
            None => {}
        }

        let idx = *self.index.get(name).ok_or_else(|| {
            GenerationError::Internal(format!("declaration '{name}' missing from type index"))
        })?;

        self.marks.insert(name, Mark::InProgress);
        self.stack.push(name);

        if let DeclarationIndex::Struct(i) = idx {
            let def: &'a StructDef = &self.def.structs[i];
            for field in &def.fields {
                for reference in field.ty.references() {
                    let dep = match reference {
                        TypeReference::Enum(n) | TypeReference::Struct(n) => n,
                    };
                    self.visit(dep)?;
                }
            }
        }

        self.stack.pop();
        self.marks.insert(name, Mark::Done);
        self.order.push(idx);
        Ok(())
    }
}

#[cfg(test)]
#[path = "resolver/resolver_tests.rs"]
mod resolver_tests;
