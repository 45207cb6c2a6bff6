//! Java class generation.
//!
//! Produces one file per enum and struct, the service interface, an optional
//! checked exception and a stub implementation, all under the package
//! directory. Deferred results become `CompletableFuture<T>`.

use super::{payload_args, resolve_into};
use crate::consistency::ScanPatterns;
use crate::output::OutputSet;
use crate::writer::CodeWriter;
use polybind_core::model::{EnumDef, Event, EventPayload, Operation, ServiceDefinition, StructDef};
use polybind_core::naming::{ServiceMember, capitalize};
use polybind_core::types::{DeferredTemplate, PrimitiveEntry, Template};
use polybind_core::{
    AsyncConvention, Casing, Declaration, GenerationResult, NameMap, NamingStrategy, PrimitiveKind,
    Role, TargetId, TypeTable, ValidatedService,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

const KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long", "native",
    "new", "package", "private", "protected", "public", "return", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try", "void",
    "volatile", "while", "true", "false", "null", "_",
];

pub(crate) const SCAN_PATTERNS: ScanPatterns = ScanPatterns {
    enum_open: r"^public enum (\w+) \{$",
    enum_member: r"^    (\w+)\((-?\d+)L?\)[,;]$",
    struct_open: r"^public class (\w+) \{$",
    struct_field: r"^    public [\w<>\[\], .?]+ (\w+);$",
    operation: r"^    [\w<>\[\], .?]+ (\w+)\((.*)\)(?: throws [\w.]+)?;$",
    getter: r"^    [\w<>\[\], .?]+ get(\w+)\(\);$",
    setter: r"^    void set(\w+)\(.*\);$",
    subscription: r"^    void (add\w+Listener)\(.*\);$",
    member: r"^    [\w<>\[\], .?]+ (\w+)\(.*\)(?: throws [\w.]+)?;$",
    callback_param: None,
};

/// Java type table.
pub fn type_table() -> TypeTable {
    TypeTable::new(
        TargetId::Java,
        Template::new("List<{T}>").with_import("java.util.List"),
        Template::new("Map<{K}, {V}>").with_import("java.util.Map"),
        DeferredTemplate::new("CompletableFuture<{T}>", AsyncConvention::ReturnHandle)
            .with_import("java.util.concurrent.CompletableFuture"),
    )
    .with_primitive(PrimitiveKind::Bool, PrimitiveEntry::new("boolean").with_boxed("Boolean"))
    .with_primitive(PrimitiveKind::Int8, PrimitiveEntry::new("byte").with_boxed("Byte"))
    .with_primitive(PrimitiveKind::Int16, PrimitiveEntry::new("short").with_boxed("Short"))
    .with_primitive(PrimitiveKind::Int32, PrimitiveEntry::new("int").with_boxed("Integer"))
    .with_primitive(PrimitiveKind::Int64, PrimitiveEntry::new("long").with_boxed("Long"))
    .with_primitive(PrimitiveKind::UInt8, PrimitiveEntry::new("short").with_boxed("Short"))
    .with_primitive(PrimitiveKind::UInt16, PrimitiveEntry::new("int").with_boxed("Integer"))
    .with_primitive(PrimitiveKind::UInt32, PrimitiveEntry::new("long").with_boxed("Long"))
    .with_primitive(
        PrimitiveKind::UInt64,
        PrimitiveEntry::new("BigInteger").with_import("java.math.BigInteger"),
    )
    .with_primitive(PrimitiveKind::Float32, PrimitiveEntry::new("float").with_boxed("Float"))
    .with_primitive(PrimitiveKind::Float64, PrimitiveEntry::new("double").with_boxed("Double"))
    .with_primitive(PrimitiveKind::String, PrimitiveEntry::new("String"))
    .with_primitive(PrimitiveKind::ByteBuffer, PrimitiveEntry::new("byte[]"))
    .with_primitive(PrimitiveKind::Void, PrimitiveEntry::new("void").with_boxed("Void"))
}

/// Java naming rules.
pub fn naming() -> NamingStrategy {
    NamingStrategy::new(TargetId::Java)
        .with_casing(Role::Type, Casing::Pascal)
        .with_casing(Role::Field, Casing::Camel)
        .with_casing(Role::Method, Casing::Camel)
        .with_casing(Role::EnumMember, Casing::ScreamingSnake)
        .with_casing(Role::Constant, Casing::ScreamingSnake)
        .with_keywords(KEYWORDS.iter().copied())
        .with_member_expansion(interface_members)
}

/// Methods each service member declares on the interface.
fn interface_members(member: ServiceMember<'_>) -> Vec<String> {
    match member {
        ServiceMember::Operation(name) => vec![name.to_string()],
        ServiceMember::Attribute { name, mutable } => {
            let mut methods = vec![format!("get{}", accessor_key(name))];
            if mutable {
                methods.push(format!("set{}", accessor_key(name)));
            }
            methods
        }
        ServiceMember::Event(name) => vec![
            subscription_name(name),
            format!("remove{}Listener", capitalize(name)),
        ],
    }
}

pub(crate) fn subscription_name(event: &str) -> String {
    format!("add{}Listener", capitalize(event))
}

pub(crate) fn accessor_key(attribute: &str) -> String {
    capitalize(attribute)
}

/// Generate all Java files for a service.
pub(crate) fn emit(
    service: &ValidatedService,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<OutputSet> {
    let def = service.definition();
    let dir: PathBuf = names.package_segments().iter().collect();
    let mut out = OutputSet::new(TargetId::Java);

    for declaration in service.declarations() {
        let (name, code) = match declaration {
            Declaration::Enum(e) => (names.type_name(&e.name)?, generate_enum(def, e, names)?),
            Declaration::Struct(s) => (
                names.type_name(&s.name)?,
                generate_struct(def, s, table, names)?,
            ),
        };
        out.add(dir.join(format!("{name}.java")), code)?;
    }

    let service_name = names.type_name(&def.name)?;
    if def.operations.iter().any(|op| op.fallible) {
        out.add(
            dir.join(format!("{service_name}Exception.java")),
            generate_exception(def, names, service_name),
        )?;
    }
    out.add(
        dir.join(format!("{service_name}.java")),
        generate_interface(def, table, names)?,
    )?;
    out.add(
        dir.join(format!("{service_name}Stub.java")),
        generate_stub(def, table, names)?,
    )?;

    Ok(out)
}

/// Banner, package declaration and imports ahead of a class body.
fn assemble(
    def: &ServiceDefinition,
    names: &NameMap,
    imports: &BTreeSet<String>,
    body: String,
) -> String {
    let mut w = CodeWriter::new();
    w.banner(def);
    if !names.package_segments().is_empty() {
        w.line(format!("package {};", names.package_segments().join(".")));
        w.blank();
    }
    if !imports.is_empty() {
        for import in imports {
            w.line(format!("import {import};"));
        }
        w.blank();
    }

    let mut code = w.finish();
    code.push_str(&body);
    code
}

fn generate_enum(
    def: &ServiceDefinition,
    e: &EnumDef,
    names: &NameMap,
) -> GenerationResult<String> {
    let name = names.type_name(&e.name)?;
    let (value_type, suffix) = if e.fits_i32() { ("int", "") } else { ("long", "L") };

    let mut w = CodeWriter::new();
    w.doc_block(&e.docs);
    w.open(format!("public enum {name} {{"));
    if e.members.is_empty() {
        w.line(";");
    }
    for (i, member) in e.members.iter().enumerate() {
        let separator = if i + 1 == e.members.len() { ";" } else { "," };
        w.line(format!(
            "{}({}{suffix}){separator}",
            names.enum_member(&e.name, &member.name)?,
            member.ordinal
        ));
    }
    w.blank();
    w.line(format!("private final {value_type} value;"));
    w.blank();
    w.open(format!("{name}({value_type} value) {{"))
        .line("this.value = value;")
        .close("}");
    w.blank();
    w.open(format!("public {value_type} getValue() {{"))
        .line("return value;")
        .close("}");
    w.blank();
    w.open(format!("public static {name} fromValue({value_type} value) {{"));
    w.open(format!("for ({name} member : values()) {{"));
    w.open("if (member.value == value) {")
        .line("return member;")
        .close("}");
    w.close("}");
    w.line(format!(
        "throw new IllegalArgumentException(\"Unknown {name} value: \" + value);"
    ));
    w.close("}");
    w.close("}");

    Ok(assemble(def, names, &BTreeSet::new(), w.finish()))
}

fn generate_struct(
    def: &ServiceDefinition,
    s: &StructDef,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<String> {
    let name = names.type_name(&s.name)?;
    let mut imports = BTreeSet::new();
    let mut fields = Vec::with_capacity(s.fields.len());
    for field in &s.fields {
        let native = resolve_into(table, names, &field.ty, &mut imports)?;
        fields.push((names.field(&s.name, &field.name)?, native.text, &field.docs));
    }

    let mut w = CodeWriter::new();
    w.doc_block(&s.docs);
    w.open(format!("public class {name} {{"));

    for (field_name, java_type, docs) in &fields {
        w.blank();
        w.doc_block(docs);
        w.line(format!("public {java_type} {field_name};"));
    }

    // Default constructor
    w.blank();
    w.line(format!("public {name}() {{}}"));

    // Full constructor
    if !fields.is_empty() {
        let params = fields
            .iter()
            .map(|(field_name, java_type, _)| format!("{java_type} {field_name}"))
            .collect::<Vec<_>>()
            .join(", ");
        w.blank();
        w.open(format!("public {name}({params}) {{"));
        for (field_name, _, _) in &fields {
            w.line(format!("this.{field_name} = {field_name};"));
        }
        w.close("}");
    }

    // Getters and setters
    for (field_name, java_type, _) in &fields {
        let method_name_part = capitalize(field_name);
        w.blank();
        w.open(format!("public {java_type} get{method_name_part}() {{"))
            .line(format!("return {field_name};"))
            .close("}");
        w.blank();
        w.open(format!(
            "public void set{method_name_part}({java_type} {field_name}) {{"
        ))
        .line(format!("this.{field_name} = {field_name};"))
        .close("}");
    }

    w.close("}");

    Ok(assemble(def, names, &imports, w.finish()))
}

fn generate_exception(def: &ServiceDefinition, names: &NameMap, service_name: &str) -> String {
    let name = format!("{service_name}Exception");
    let mut w = CodeWriter::new();
    w.doc_block(&[format!("Raised by failing {service_name} operations.")]);
    w.open(format!("public class {name} extends Exception {{"));
    w.blank();
    w.open(format!("public {name}(String message) {{"))
        .line("super(message);")
        .close("}");
    w.blank();
    w.open(format!("public {name}(String message, Throwable cause) {{"))
        .line("super(message, cause);")
        .close("}");
    w.close("}");

    assemble(def, names, &BTreeSet::new(), w.finish())
}

/// A rendered operation signature, shared by interface and stub.
struct MethodSig {
    canonical: String,
    returns: String,
    deferred: bool,
    name: String,
    params: String,
    throws: Option<String>,
    docs: Vec<String>,
}

fn operation_sig(
    op: &Operation,
    service_name: &str,
    table: &TypeTable,
    names: &NameMap,
    imports: &mut BTreeSet<String>,
) -> GenerationResult<MethodSig> {
    let returns = resolve_into(table, names, &op.returns, imports)?;
    let params = op
        .parameters
        .iter()
        .map(|p| {
            let native = resolve_into(table, names, &p.ty, imports)?;
            Ok(format!("{} {}", native.text, names.param(&op.name, &p.name)?))
        })
        .collect::<GenerationResult<Vec<_>>>()?
        .join(", ");

    let deferred = op.returns.is_deferred();
    let mut docs = op.docs.clone();
    let throws = match (op.fallible, deferred) {
        (true, false) => {
            docs.push(format!("@throws {service_name}Exception if the operation fails"));
            Some(format!("{service_name}Exception"))
        }
        (true, true) => {
            docs.push(format!(
                "Completes exceptionally with {{@link {service_name}Exception}} on failure."
            ));
            None
        }
        _ => None,
    };

    Ok(MethodSig {
        canonical: op.name.clone(),
        returns: returns.text,
        deferred,
        name: names.member(&op.name)?.to_string(),
        params,
        throws,
        docs,
    })
}

/// Listener element type for an event, plus its nested class if tuple-shaped.
fn listener_type(
    event: &Event,
    table: &TypeTable,
    names: &NameMap,
    imports: &mut BTreeSet<String>,
) -> GenerationResult<(String, Option<CodeWriter>)> {
    let args = payload_args(table, names, &event.name, &event.payload, imports)?;
    match &event.payload {
        EventPayload::Value(_) => {
            let boxed = args
                .into_iter()
                .next()
                .map(|(_, native)| native.boxed)
                .unwrap_or_else(|| "Void".to_string());
            Ok((boxed, None))
        }
        EventPayload::Tuple(_) => {
            let class = format!("{}Event", capitalize(names.member(&event.name)?));
            let mut w = CodeWriter::new();
            w.indent();
            w.open(format!("final class {class} {{"));
            for (name, native) in &args {
                let name = name.as_deref().unwrap_or("value");
                w.line(format!("public final {} {name};", native.text));
            }
            let params = args
                .iter()
                .map(|(name, native)| {
                    format!("{} {}", native.text, name.as_deref().unwrap_or("value"))
                })
                .collect::<Vec<_>>()
                .join(", ");
            w.blank();
            w.open(format!("public {class}({params}) {{"));
            for (name, _) in &args {
                let name = name.as_deref().unwrap_or("value");
                w.line(format!("this.{name} = {name};"));
            }
            w.close("}");
            w.close("}");
            Ok((class, Some(w)))
        }
    }
}

fn generate_interface(
    def: &ServiceDefinition,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<String> {
    let service_name = names.type_name(&def.name)?;
    let mut imports = BTreeSet::new();

    let mut docs = def.docs.clone();
    if let Some(version) = def.version {
        docs.push(format!("Interface version {version}."));
    }

    let mut w = CodeWriter::new();
    w.doc_block(&docs);
    w.open(format!("public interface {service_name} {{"));

    if !def.operations.is_empty() {
        w.blank();
        w.line("// Operations");
        for op in &def.operations {
            let sig = operation_sig(op, service_name, table, names, &mut imports)?;
            let throws = sig.throws.map(|t| format!(" throws {t}")).unwrap_or_default();
            w.blank();
            w.doc_block(&sig.docs);
            w.line(format!("{} {}({}){throws};", sig.returns, sig.name, sig.params));
        }
    }

    if !def.attributes.is_empty() {
        w.blank();
        w.line("// Attributes");
        for attr in &def.attributes {
            let native = resolve_into(table, names, &attr.ty, &mut imports)?;
            let member = names.member(&attr.name)?;
            let accessor = capitalize(member);
            w.blank();
            w.doc_block(&attr.docs);
            w.line(format!("{} get{accessor}();", native.text));
            if attr.mutable {
                w.blank();
                w.line(format!("void set{accessor}({} {member});", native.text));
            }
        }
    }

    let mut nested = Vec::new();
    if !def.events.is_empty() {
        imports.insert("java.util.function.Consumer".to_string());
        w.blank();
        w.line("// Events");
        for event in &def.events {
            let (element, class) = listener_type(event, table, names, &mut imports)?;
            let accessor = capitalize(names.member(&event.name)?);
            w.blank();
            w.doc_block(&event.docs);
            w.line(format!("void add{accessor}Listener(Consumer<{element}> listener);"));
            w.blank();
            w.line(format!("void remove{accessor}Listener(Consumer<{element}> listener);"));
            nested.extend(class);
        }
    }

    let mut code = w.finish();
    for class in nested {
        code.push('\n');
        code.push_str(&class.finish());
    }
    code.push_str("}\n");

    Ok(assemble(def, names, &imports, code))
}

fn generate_stub(
    def: &ServiceDefinition,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<String> {
    let service_name = names.type_name(&def.name)?;
    let mut imports = BTreeSet::new();

    let mut w = CodeWriter::new();
    w.doc_block(&[format!(
        "Placeholder implementation of {{@link {service_name}}}. Every operation fails."
    )]);
    w.open(format!("public class {service_name}Stub implements {service_name} {{"));

    let mut listeners = Vec::new();
    for event in &def.events {
        let (element, _) = listener_type(event, table, names, &mut imports)?;
        listeners.push((names.member(&event.name)?, element));
    }
    if !listeners.is_empty() {
        imports.insert("java.util.List".to_string());
        imports.insert("java.util.concurrent.CopyOnWriteArrayList".to_string());
        imports.insert("java.util.function.Consumer".to_string());
        w.blank();
        for (member, element) in &listeners {
            w.line(format!(
                "private final List<Consumer<{element}>> {member}Listeners = \
                 new CopyOnWriteArrayList<>();"
            ));
        }
    }

    for op in &def.operations {
        let sig = operation_sig(op, service_name, table, names, &mut imports)?;
        let throws = sig.throws.map(|t| format!(" throws {t}")).unwrap_or_default();
        let failure = format!(
            "new UnsupportedOperationException(\"{} is not implemented\")",
            sig.canonical
        );
        w.blank();
        w.line("@Override");
        w.open(format!("public {} {}({}){throws} {{", sig.returns, sig.name, sig.params));
        if sig.deferred {
            w.line(format!("return CompletableFuture.failedFuture({failure});"));
        } else {
            w.line(format!("throw {failure};"));
        }
        w.close("}");
    }

    for attr in &def.attributes {
        let native = resolve_into(table, names, &attr.ty, &mut imports)?;
        let member = names.member(&attr.name)?;
        let accessor = capitalize(member);
        let failure = format!(
            "throw new UnsupportedOperationException(\"{} is not implemented\");",
            attr.name
        );
        w.blank();
        w.line("@Override");
        w.open(format!("public {} get{accessor}() {{", native.text))
            .line(&failure)
            .close("}");
        if attr.mutable {
            w.blank();
            w.line("@Override");
            w.open(format!("public void set{accessor}({} {member}) {{", native.text))
                .line(&failure)
                .close("}");
        }
    }

    for (member, element) in &listeners {
        let accessor = capitalize(member);
        w.blank();
        w.line("@Override");
        w.open(format!("public void add{accessor}Listener(Consumer<{element}> listener) {{"))
            .line(format!("{member}Listeners.add(listener);"))
            .close("}");
        w.blank();
        w.line("@Override");
        w.open(format!(
            "public void remove{accessor}Listener(Consumer<{element}> listener) {{"
        ))
        .line(format!("{member}Listeners.remove(listener);"))
        .close("}");
    }

    w.close("}");

    Ok(assemble(def, names, &imports, w.finish()))
}
