//! C++ header and source generation.
//!
//! `<Service>.h` holds every declaration inside the package namespaces: enums
//! as `enum class`, structs in dependency order, the abstract service class
//! and a stub class. `<Service>.cpp` defines the stub. Deferred results
//! become `std::future<T>`; large values are passed by const reference.

use super::{payload_args, resolve_into};
use crate::consistency::ScanPatterns;
use crate::output::OutputSet;
use crate::writer::CodeWriter;
use polybind_core::model::{EnumDef, Event, Operation, ServiceDefinition, StructDef};
use polybind_core::naming::{ServiceMember, to_pascal_case, to_screaming_snake_case};
use polybind_core::types::{DeferredTemplate, PrimitiveEntry, Template};
use polybind_core::{
    AsyncConvention, Casing, Declaration, GenerationResult, NameMap, NamingStrategy, NativeType,
    Passing, PrimitiveKind, Role, TargetId, TypeTable, ValidatedService,
};
use std::collections::BTreeSet;

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

pub(crate) const SCAN_PATTERNS: ScanPatterns = ScanPatterns {
    enum_open: r"^enum class (\w+) : \w+ \{$",
    enum_member: r"^    (\w+) = (-?\d+|INT64_MIN),$",
    struct_open: r"^struct (\w+) \{$",
    struct_field: r"^    [A-Za-z_][\w:<>, ]*[\w>] (\w+);$",
    operation: r"^    virtual .+ (\w+)\((.*)\) = 0;$",
    getter: r"^    virtual .+ (\w+)\(\) const = 0;$",
    setter: r"^    virtual void set_(\w+)\(.*\) = 0;$",
    subscription: r"^    virtual void (on_\w+)\(.*\) = 0;$",
    member: r"^    virtual .+ (\w+)\(.*\)(?: const)? = 0;$",
    callback_param: None,
};

/// C++ type table.
pub fn type_table() -> TypeTable {
    let fixed = |text: &str| PrimitiveEntry::new(text).with_import("<cstdint>");
    TypeTable::new(
        TargetId::Cpp,
        Template::new("std::vector<{T}>").with_import("<vector>").by_ref(),
        Template::new("std::map<{K}, {V}>").with_import("<map>").by_ref(),
        DeferredTemplate::new("std::future<{T}>", AsyncConvention::ReturnHandle)
            .with_import("<future>"),
    )
    .with_primitive(PrimitiveKind::Bool, PrimitiveEntry::new("bool"))
    .with_primitive(PrimitiveKind::Int8, fixed("int8_t"))
    .with_primitive(PrimitiveKind::Int16, fixed("int16_t"))
    .with_primitive(PrimitiveKind::Int32, fixed("int32_t"))
    .with_primitive(PrimitiveKind::Int64, fixed("int64_t"))
    .with_primitive(PrimitiveKind::UInt8, fixed("uint8_t"))
    .with_primitive(PrimitiveKind::UInt16, fixed("uint16_t"))
    .with_primitive(PrimitiveKind::UInt32, fixed("uint32_t"))
    .with_primitive(PrimitiveKind::UInt64, fixed("uint64_t"))
    .with_primitive(PrimitiveKind::Float32, PrimitiveEntry::new("float"))
    .with_primitive(PrimitiveKind::Float64, PrimitiveEntry::new("double"))
    .with_primitive(
        PrimitiveKind::String,
        PrimitiveEntry::new("std::string").with_import("<string>").by_ref(),
    )
    .with_primitive(
        PrimitiveKind::ByteBuffer,
        PrimitiveEntry::new("std::vector<uint8_t>")
            .with_import("<cstdint>")
            .with_import("<vector>")
            .by_ref(),
    )
    .with_primitive(PrimitiveKind::Void, PrimitiveEntry::new("void"))
    .with_struct_passing(Passing::ConstRef)
    .with_enum_passing(Passing::Value)
}

/// C++ naming rules.
pub fn naming() -> NamingStrategy {
    NamingStrategy::new(TargetId::Cpp)
        .with_casing(Role::Type, Casing::Pascal)
        .with_casing(Role::Field, Casing::Snake)
        .with_casing(Role::Method, Casing::Snake)
        .with_casing(Role::EnumMember, Casing::Preserve)
        .with_casing(Role::Constant, Casing::ScreamingSnake)
        .with_keywords(KEYWORDS.iter().copied())
        .with_member_expansion(class_members)
}

/// Names each service member declares in the service and stub classes.
fn class_members(member: ServiceMember<'_>) -> Vec<String> {
    match member {
        ServiceMember::Operation(name) => vec![name.to_string()],
        ServiceMember::Attribute { name, mutable } => {
            let mut names = vec![name.to_string()];
            if mutable {
                names.push(format!("set_{name}"));
            }
            names
        }
        ServiceMember::Event(name) => vec![
            subscription_name(name),
            handler_list(name),
            format!("{}Handler", to_pascal_case(name)),
        ],
    }
}

pub(crate) fn subscription_name(event: &str) -> String {
    format!("on_{event}")
}

/// Parameter declaration honouring the type's passing convention.
fn param_decl(native: &NativeType, name: &str) -> String {
    if native.is_const_ref() {
        format!("const {}& {name}", native.text)
    } else {
        format!("{} {name}", native.text)
    }
}

fn handler_alias(event: &Event) -> String {
    format!("{}Handler", to_pascal_case(&event.name))
}

fn handler_list(member: &str) -> String {
    format!("{member}_handlers_")
}

fn include_guard(def: &ServiceDefinition, names: &NameMap) -> GenerationResult<String> {
    let mut parts: Vec<String> = names
        .package_segments()
        .iter()
        .map(|segment| to_screaming_snake_case(segment))
        .collect();
    parts.push(names.constant(&def.name)?.to_string());
    parts.push("H".to_string());
    Ok(parts.join("_"))
}

/// A member declaration shared by the abstract class, the stub and its
/// definitions.
struct Member {
    canonical: String,
    returns: String,
    name: String,
    params: Vec<(String, String)>,
    suffix: &'static str,
    body: Body,
    docs: Vec<String>,
}

enum Body {
    Fail,
    /// A deferred operation with its payload type.
    FailedFuture(String),
    Subscribe(String),
}

impl Member {
    fn declaration(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|(decl, _)| decl.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {}({params}){}", self.returns, self.name, self.suffix)
    }

    /// Out-of-class definition header. Unused parameter names are
    /// commented out.
    fn definition(&self, class: &str) -> String {
        let params = self
            .params
            .iter()
            .map(|(decl, name)| match (&self.body, decl.rsplit_once(' ')) {
                (Body::Subscribe(_), _) | (_, None) => decl.clone(),
                (_, Some((ty, _))) => format!("{ty} /*{name}*/"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {class}::{}({params}){}", self.returns, self.name, self.suffix)
    }
}

struct ServiceMembers {
    operations: Vec<Member>,
    getters_and_setters: Vec<Member>,
    subscriptions: Vec<Member>,
    handlers: Vec<(String, String, Vec<String>)>,
}

fn collect_members(
    def: &ServiceDefinition,
    table: &TypeTable,
    names: &NameMap,
    includes: &mut BTreeSet<String>,
) -> GenerationResult<ServiceMembers> {
    let mut operations = Vec::with_capacity(def.operations.len());
    for op in &def.operations {
        operations.push(operation_member(op, table, names, includes)?);
    }

    let mut getters_and_setters = Vec::new();
    for attr in &def.attributes {
        let native = resolve_into(table, names, &attr.ty, includes)?;
        let member = names.member(&attr.name)?;
        getters_and_setters.push(Member {
            canonical: attr.name.clone(),
            returns: native.text.clone(),
            name: member.to_string(),
            params: Vec::new(),
            suffix: " const",
            body: Body::Fail,
            docs: attr.docs.clone(),
        });
        if attr.mutable {
            getters_and_setters.push(Member {
                canonical: attr.name.clone(),
                returns: "void".to_string(),
                name: format!("set_{member}"),
                params: vec![(param_decl(&native, "value"), "value".to_string())],
                suffix: "",
                body: Body::Fail,
                docs: Vec::new(),
            });
        }
    }

    let mut subscriptions = Vec::with_capacity(def.events.len());
    let mut handlers = Vec::with_capacity(def.events.len());
    for event in &def.events {
        let args = payload_args(table, names, &event.name, &event.payload, includes)?
            .into_iter()
            .map(|(name, native)| match name {
                Some(name) => param_decl(&native, &name),
                None if native.is_const_ref() => format!("const {}&", native.text),
                None => native.text,
            })
            .collect::<Vec<_>>();
        let alias = handler_alias(event);
        let member = names.member(&event.name)?;
        subscriptions.push(Member {
            canonical: event.name.clone(),
            returns: "void".to_string(),
            name: subscription_name(member),
            params: vec![(format!("{alias} handler"), "handler".to_string())],
            suffix: "",
            body: Body::Subscribe(handler_list(member)),
            docs: event.docs.clone(),
        });
        handlers.push((alias, handler_list(member), args));
    }

    Ok(ServiceMembers {
        operations,
        getters_and_setters,
        subscriptions,
        handlers,
    })
}

fn operation_member(
    op: &Operation,
    table: &TypeTable,
    names: &NameMap,
    includes: &mut BTreeSet<String>,
) -> GenerationResult<Member> {
    let returns = resolve_into(table, names, &op.returns, includes)?;
    let mut params = Vec::with_capacity(op.parameters.len());
    for p in &op.parameters {
        let native = resolve_into(table, names, &p.ty, includes)?;
        let name = names.param(&op.name, &p.name)?;
        params.push((param_decl(&native, name), name.to_string()));
    }

    let mut docs = op.docs.clone();
    let body = if op.returns.is_deferred() {
        if op.fallible {
            docs.push("The future holds an exception when the operation fails.".to_string());
        }
        let payload = table.resolve(op.returns.payload(), names)?;
        Body::FailedFuture(payload.text)
    } else {
        if op.fallible {
            docs.push("Throws when the operation fails.".to_string());
        }
        Body::Fail
    };

    Ok(Member {
        canonical: op.name.clone(),
        returns: returns.text,
        name: names.member(&op.name)?.to_string(),
        params,
        suffix: "",
        body,
        docs,
    })
}

/// Generate the header and source for a service.
pub(crate) fn emit(
    service: &ValidatedService,
    table: &TypeTable,
    names: &NameMap,
) -> GenerationResult<OutputSet> {
    let def = service.definition();
    let service_name = names.type_name(&def.name)?;

    let mut includes = BTreeSet::new();
    if !def.enums.is_empty() {
        includes.insert("<cstdint>".to_string());
    }
    if !def.events.is_empty() {
        includes.insert("<functional>".to_string());
        includes.insert("<vector>".to_string());
    }

    let mut declarations = CodeWriter::new();
    for declaration in service.declarations() {
        match declaration {
            Declaration::Enum(e) => write_enum(&mut declarations, e, names)?,
            Declaration::Struct(s) => {
                write_struct(&mut declarations, s, table, names, &mut includes)?
            }
        }
        declarations.blank();
    }

    let members = collect_members(def, table, names, &mut includes)?;
    write_service_class(&mut declarations, def, service_name, &members);
    declarations.blank();
    write_stub_class(&mut declarations, service_name, &members);

    let header_name = format!("{service_name}.h");
    let guard = include_guard(def, names)?;
    let namespaces: Vec<&str> = names.package_segments().iter().map(String::as_str).collect();

    let mut header = CodeWriter::new();
    header.banner(def);
    header.line(format!("#ifndef {guard}"));
    header.line(format!("#define {guard}"));
    header.blank();
    for include in &includes {
        header.line(format!("#include {include}"));
    }
    if !includes.is_empty() {
        header.blank();
    }
    open_namespaces(&mut header, &namespaces);
    let mut header = header.finish();
    header.push_str(&declarations.finish());
    let mut tail = CodeWriter::new();
    tail.blank();
    close_namespaces(&mut tail, &namespaces);
    tail.line(format!("#endif  // {guard}"));
    header.push_str(&tail.finish());

    let source = generate_source(def, service_name, &header_name, &members, &namespaces);

    let mut out = OutputSet::new(TargetId::Cpp);
    out.add(header_name, header)?;
    out.add(format!("{service_name}.cpp"), source)?;
    Ok(out)
}

fn open_namespaces(w: &mut CodeWriter, namespaces: &[&str]) {
    for namespace in namespaces {
        w.line(format!("namespace {namespace} {{"));
    }
    if !namespaces.is_empty() {
        w.blank();
    }
}

fn close_namespaces(w: &mut CodeWriter, namespaces: &[&str]) {
    for namespace in namespaces.iter().rev() {
        w.line(format!("}}  // namespace {namespace}"));
    }
    if !namespaces.is_empty() {
        w.blank();
    }
}

fn write_enum(w: &mut CodeWriter, e: &EnumDef, names: &NameMap) -> GenerationResult<()> {
    let underlying = if e.fits_i32() { "int32_t" } else { "int64_t" };
    w.line_docs(&e.docs);
    w.open(format!("enum class {} : {underlying} {{", names.type_name(&e.name)?));
    for member in &e.members {
        let name = names.enum_member(&e.name, &member.name)?;
        // The literal 9223372036854775808 has no signed type.
        if member.ordinal == i64::MIN {
            w.line(format!("{name} = INT64_MIN,"));
        } else {
            w.line(format!("{name} = {},", member.ordinal));
        }
    }
    w.close("};");
    Ok(())
}

fn write_struct(
    w: &mut CodeWriter,
    s: &StructDef,
    table: &TypeTable,
    names: &NameMap,
    includes: &mut BTreeSet<String>,
) -> GenerationResult<()> {
    w.line_docs(&s.docs);
    w.open(format!("struct {} {{", names.type_name(&s.name)?));
    for field in &s.fields {
        let native = resolve_into(table, names, &field.ty, includes)?;
        w.line_docs(&field.docs);
        w.line(format!("{} {};", native.text, names.field(&s.name, &field.name)?));
    }
    w.close("};");
    Ok(())
}

fn write_service_class(
    w: &mut CodeWriter,
    def: &ServiceDefinition,
    service_name: &str,
    members: &ServiceMembers,
) {
    let mut docs = def.docs.clone();
    if let Some(version) = def.version {
        docs.push(format!("Interface version {version}."));
    }
    w.line_docs(&docs);
    w.line(format!("class {service_name} {{"));
    w.line("public:");
    w.indent();

    for (alias, _, args) in &members.handlers {
        w.line(format!("using {alias} = std::function<void({})>;", args.join(", ")));
    }
    if !members.handlers.is_empty() {
        w.blank();
    }
    w.line(format!("virtual ~{service_name}() = default;"));

    let sections = [
        ("// Operations", &members.operations),
        ("// Attributes", &members.getters_and_setters),
        ("// Events", &members.subscriptions),
    ];
    for (marker, group) in sections {
        if group.is_empty() {
            continue;
        }
        w.blank();
        w.line(marker);
        for member in group {
            w.blank();
            w.line_docs(&member.docs);
            w.line(format!("virtual {} = 0;", member.declaration()));
        }
    }

    w.dedent();
    w.line("};");
}

fn write_stub_class(w: &mut CodeWriter, service_name: &str, members: &ServiceMembers) {
    w.line(format!("/// Placeholder implementation of {service_name}. Every operation fails."));
    w.line(format!("class {service_name}Stub : public {service_name} {{"));
    w.line("public:");
    w.indent();
    let all = members
        .operations
        .iter()
        .chain(&members.getters_and_setters)
        .chain(&members.subscriptions);
    for member in all {
        w.line(format!("{} override;", member.declaration()));
    }
    w.dedent();

    if !members.handlers.is_empty() {
        w.blank();
        w.line("private:");
        w.indent();
        for (alias, list, _) in &members.handlers {
            w.line(format!("std::vector<{alias}> {list};"));
        }
        w.dedent();
    }
    w.line("};");
}

fn generate_source(
    def: &ServiceDefinition,
    service_name: &str,
    header_name: &str,
    members: &ServiceMembers,
    namespaces: &[&str],
) -> String {
    let stub = format!("{service_name}Stub");
    let mut includes = BTreeSet::from(["<stdexcept>"]);
    if !members.subscriptions.is_empty() {
        includes.insert("<utility>");
    }
    if members
        .operations
        .iter()
        .any(|m| matches!(m.body, Body::FailedFuture(_)))
    {
        includes.insert("<exception>");
    }

    let mut w = CodeWriter::new();
    w.banner(def);
    w.line(format!("#include \"{header_name}\""));
    w.blank();
    for include in includes {
        w.line(format!("#include {include}"));
    }
    w.blank();
    open_namespaces(&mut w, namespaces);

    let all = members
        .operations
        .iter()
        .chain(&members.getters_and_setters)
        .chain(&members.subscriptions);
    for member in all {
        let failure = format!("std::logic_error(\"{} is not implemented\")", member.canonical);
        w.open(format!("{} {{", member.definition(&stub)));
        match &member.body {
            Body::Fail => {
                w.line(format!("throw {failure};"));
            }
            Body::FailedFuture(payload) => {
                w.line(format!("std::promise<{payload}> promise;"));
                w.line(format!("promise.set_exception(std::make_exception_ptr({failure}));"));
                w.line("return promise.get_future();");
            }
            Body::Subscribe(list) => {
                w.line(format!("{list}.push_back(std::move(handler));"));
            }
        }
        w.close("}");
        w.blank();
    }

    close_namespaces(&mut w, namespaces);
    w.finish()
}
