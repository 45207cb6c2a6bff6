//! JavaScript (CommonJS) module generation.
//!
//! The whole service lands in one `<kebab-name>.js` module: frozen enum
//! objects, struct classes, a frozen event-name table and a service class
//! extending `EventEmitter`. Types only appear in JSDoc. Deferred results
//! thread a trailing node-style `callback(err, result)`.

use super::{payload_args, resolve_into};
use crate::consistency::ScanPatterns;
use crate::output::OutputSet;
use crate::writer::CodeWriter;
use polybind_core::model::{EnumDef, ServiceDefinition, StructDef};
use polybind_core::naming::{ServiceMember, capitalize, to_kebab_case};
use polybind_core::types::{DeferredTemplate, PrimitiveEntry, Template};
use polybind_core::{
    AsyncConvention, Casing, Declaration, GenerationResult, NameMap, NamingStrategy, PrimitiveKind,
    Role, TargetId, TypeTable, ValidatedService,
};
use std::collections::BTreeSet;

/// Name of the continuation parameter appended to deferred operations.
pub const CALLBACK: &str = "callback";

/// Largest integer a JavaScript number holds exactly.
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

const KEYWORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
    "null", "package", "private", "protected", "public", "return", "static", "super", "switch",
    "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Members of `EventEmitter` the service class must not shadow.
const EMITTER_MEMBERS: &[&str] = &[
    "constructor", "on", "once", "off", "emit", "addListener", "removeListener",
    "removeAllListeners", "listeners", "rawListeners", "listenerCount", "eventNames",
    "prependListener", "prependOnceListener", "setMaxListeners", "getMaxListeners",
];

pub(crate) const SCAN_PATTERNS: ScanPatterns = ScanPatterns {
    enum_open: r"^const (\w+) = Object\.freeze\(\{$",
    enum_member: r"^    (\w+): (-?\d+)n?,$",
    struct_open: r"^class (\w+) \{$",
    struct_field: r"^        this\.(\w+) = \w+;$",
    operation: r"^    (\w+)\(([\w, ]*)\) \{$",
    getter: r"^    get (\w+)\(\) \{$",
    setter: r"^    set (\w+)\(value\) \{$",
    subscription: r"^    (on\w+)\(handler\) \{$",
    member: r"^    (?:get )?(\w+)\(.*\) \{$",
    callback_param: Some(CALLBACK),
};

/// JavaScript (JSDoc) type table.
pub fn type_table() -> TypeTable {
    TypeTable::new(
        TargetId::JavaScript,
        Template::new("Array<{T}>"),
        Template::new("Object<{K}, {V}>"),
        DeferredTemplate::new("function(?Error, {T}=): void", AsyncConvention::CallbackParameter)
            .with_void_pattern("function(?Error): void"),
    )
    .with_primitive(PrimitiveKind::Bool, PrimitiveEntry::new("boolean"))
    .with_primitive(PrimitiveKind::Int8, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::Int16, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::Int32, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::Int64, PrimitiveEntry::new("bigint"))
    .with_primitive(PrimitiveKind::UInt8, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::UInt16, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::UInt32, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::UInt64, PrimitiveEntry::new("bigint"))
    .with_primitive(PrimitiveKind::Float32, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::Float64, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::String, PrimitiveEntry::new("string"))
    .with_primitive(PrimitiveKind::ByteBuffer, PrimitiveEntry::new("Uint8Array"))
    .with_primitive(PrimitiveKind::Void, PrimitiveEntry::new("void"))
}

/// JavaScript naming rules.
pub fn naming() -> NamingStrategy {
    NamingStrategy::new(TargetId::JavaScript)
        .with_casing(Role::Type, Casing::Pascal)
        .with_casing(Role::Field, Casing::Camel)
        .with_casing(Role::Method, Casing::Camel)
        .with_casing(Role::EnumMember, Casing::Preserve)
        .with_casing(Role::Constant, Casing::ScreamingSnake)
        .with_keywords(KEYWORDS.iter().chain(EMITTER_MEMBERS).copied())
        .with_reserved_parameters([CALLBACK])
        .with_member_expansion(class_members)
}

/// Accessors share the attribute's name; events add an `on` method.
fn class_members(member: ServiceMember<'_>) -> Vec<String> {
    match member {
        ServiceMember::Operation(name) | ServiceMember::Attribute { name, .. } => {
            vec![name.to_string()]
        }
        ServiceMember::Event(name) => vec![subscription_name(name)],
    }
}

pub(crate) fn subscription_name(event: &str) -> String {
    format!("on{}", capitalize(event))
}

/// Frozen table of event names exported next to the service class.
pub(crate) fn events_table(service_name: &str) -> String {
    format!("{service_name}Events")
}

/// Module file name for a service, e.g. `vehicle-dashboard.js`.
pub fn module_file_name(service_name: &str) -> String {
    format!("{}.js", to_kebab_case(service_name))
}

/// Generate the module for a service.
pub(crate) fn emit(
    service: &ValidatedService,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<OutputSet> {
    let def = service.definition();
    let mut exports = Vec::new();

    let mut w = CodeWriter::new();
    w.banner(def);
    w.line("'use strict';");
    w.blank();
    w.line("const EventEmitter = require('events');");

    for declaration in service.declarations() {
        w.blank();
        match declaration {
            Declaration::Enum(e) => write_enum(&mut w, e, names)?,
            Declaration::Struct(s) => write_struct(&mut w, s, table, names)?,
        }
        exports.push(names.type_name(declaration.name())?);
    }

    let service_name = names.type_name(&def.name)?;
    let events_table = events_table(service_name);
    if !def.events.is_empty() {
        w.blank();
        write_events_table(&mut w, def, &events_table, names)?;
        exports.push(&events_table);
    }

    w.blank();
    write_service(&mut w, def, &events_table, table, names)?;
    exports.push(service_name);

    w.blank();
    w.open("module.exports = {");
    for export in &exports {
        w.line(format!("{export},"));
    }
    w.close("};");

    let mut out = OutputSet::new(TargetId::JavaScript);
    out.add(module_file_name(&def.name), w.finish())?;
    Ok(out)
}

fn ordinal_literal(ordinal: i64) -> String {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&ordinal) {
        ordinal.to_string()
    } else {
        format!("{ordinal}n")
    }
}

fn write_enum(w: &mut CodeWriter, e: &EnumDef, names: &NameMap) -> GenerationResult<()> {
    let mut docs = e.docs.clone();
    docs.push("@enum {number}".to_string());
    w.doc_block(&docs);
    w.open(format!("const {} = Object.freeze({{", names.type_name(&e.name)?));
    for member in &e.members {
        w.line(format!(
            "{}: {},",
            names.enum_member(&e.name, &member.name)?,
            ordinal_literal(member.ordinal)
        ));
    }
    w.close("});");
    Ok(())
}

fn write_struct(
    w: &mut CodeWriter,
    s: &StructDef,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<()> {
    let mut ignored = BTreeSet::new();
    let mut fields = Vec::with_capacity(s.fields.len());
    for field in &s.fields {
        let native = resolve_into(table, names, &field.ty, &mut ignored)?;
        fields.push((names.field(&s.name, &field.name)?, native.text));
    }

    w.doc_block(&s.docs);
    w.open(format!("class {} {{", names.type_name(&s.name)?));

    let params_doc: Vec<String> = fields
        .iter()
        .map(|(name, ty)| format!("@param {{{ty}}} {name}"))
        .collect();
    w.doc_block(&params_doc);
    let params = fields
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    w.open(format!("constructor({params}) {{"));
    for (name, ty) in &fields {
        w.line(format!("/** @type {{{ty}}} */"));
        w.line(format!("this.{name} = {name};"));
    }
    w.close("}");
    w.close("}");
    Ok(())
}

fn write_events_table(
    w: &mut CodeWriter,
    def: &ServiceDefinition,
    events_table: &str,
    names: &NameMap,
) -> GenerationResult<()> {
    w.doc_block(&[
        format!("Event names emitted by {}.", names.type_name(&def.name)?),
        "@enum {string}".to_string(),
    ]);
    w.open(format!("const {events_table} = Object.freeze({{"));
    for event in &def.events {
        w.line(format!(
            "{}: '{}',",
            names.constant(&event.name)?,
            names.member(&event.name)?
        ));
    }
    w.close("});");
    Ok(())
}

fn write_service(
    w: &mut CodeWriter,
    def: &ServiceDefinition,
    events_table: &str,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<()> {
    let service_name = names.type_name(&def.name)?;
    let mut ignored = BTreeSet::new();

    let mut docs = def.docs.clone();
    if let Some(version) = def.version {
        docs.push(format!("Interface version {version}."));
    }
    w.doc_block(&docs);
    w.open(format!("class {service_name} extends EventEmitter {{"));

    if !def.operations.is_empty() {
        w.blank();
        w.line("// Operations");
    }
    for op in &def.operations {
        let mut docs = op.docs.clone();
        let mut params = Vec::new();
        for p in &op.parameters {
            let native = resolve_into(table, names, &p.ty, &mut ignored)?;
            let name = names.param(&op.name, &p.name)?;
            docs.push(format!("@param {{{}}} {name}", native.text));
            params.push(name);
        }

        let returns = resolve_into(table, names, &op.returns, &mut ignored)?;
        let failure = format!("new Error('{} is not implemented')", op.name);
        let body = if op.returns.is_deferred() {
            docs.push(format!("@param {{{}}} {CALLBACK}", returns.text));
            if op.fallible {
                docs.push(format!("Passes an Error to {CALLBACK} when the operation fails."));
            }
            params.push(CALLBACK);
            format!("process.nextTick({CALLBACK}, {failure});")
        } else {
            if !op.returns.is_void() {
                docs.push(format!("@returns {{{}}}", returns.text));
            }
            if op.fallible {
                docs.push("@throws {Error} when the operation fails".to_string());
            }
            format!("throw {failure};")
        };

        w.blank();
        w.doc_block(&docs);
        w.open(format!("{}({}) {{", names.member(&op.name)?, params.join(", ")))
            .line(body)
            .close("}");
    }

    if !def.attributes.is_empty() {
        w.blank();
        w.line("// Attributes");
    }
    for attr in &def.attributes {
        let native = resolve_into(table, names, &attr.ty, &mut ignored)?;
        let member = names.member(&attr.name)?;
        let failure = format!("throw new Error('{} is not implemented');", attr.name);
        let mut docs = attr.docs.clone();
        docs.push(format!("@type {{{}}}", native.text));

        w.blank();
        w.doc_block(&docs);
        w.open(format!("get {member}() {{")).line(&failure).close("}");
        if attr.mutable {
            w.blank();
            w.open(format!("set {member}(value) {{")).line(&failure).close("}");
        }
    }

    if !def.events.is_empty() {
        w.blank();
        w.line("// Events");
    }
    for event in &def.events {
        let args = payload_args(table, names, &event.name, &event.payload, &mut ignored)?;
        let handler = args
            .iter()
            .map(|(_, native)| native.text.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let member = names.member(&event.name)?;
        let mut docs = event.docs.clone();
        docs.push(format!("@param {{function({handler}): void}} handler"));
        docs.push(format!("@returns {{{service_name}}}"));

        w.blank();
        w.doc_block(&docs);
        w.open(format!("{}(handler) {{", subscription_name(member)))
            .line(format!(
                "return this.on({events_table}.{}, handler);",
                names.constant(&event.name)?
            ))
            .close("}");
    }

    w.close("}");
    Ok(())
}
