#![allow(non_snake_case)]

use super::*;
use crate::model::{EnumDef, Operation, ServiceDefinition, StructDef};
use crate::naming::{Casing, NamingStrategy, Role};
use crate::resolver::resolve;

fn names() -> NameMap {
    let def = ServiceDefinition::new("Station")
        .with_operation(Operation::new("read", AbstractType::struct_ref("reading")))
        .with_enum(EnumDef::new("level").with_member("LOW", 0))
        .with_struct(StructDef::new("reading").with_field("level", AbstractType::enum_ref("level")));
    let service = resolve(def).unwrap();

    NamingStrategy::new(TargetId::Java)
        .with_casing(Role::Type, Casing::Pascal)
        .build_names(&service)
        .unwrap()
}

fn java_table() -> TypeTable {
    TypeTable::new(
        TargetId::Java,
        Template::new("List<{T}>").with_import("java.util.List"),
        Template::new("Map<{K}, {V}>").with_import("java.util.Map"),
        DeferredTemplate::new("CompletableFuture<{T}>", AsyncConvention::ReturnHandle)
            .with_import("java.util.concurrent.CompletableFuture"),
    )
    .with_primitive(PrimitiveKind::Int32, PrimitiveEntry::new("int").with_boxed("Integer"))
    .with_primitive(PrimitiveKind::String, PrimitiveEntry::new("String"))
    .with_primitive(PrimitiveKind::Void, PrimitiveEntry::new("void").with_boxed("Void"))
    .with_primitive(
        PrimitiveKind::UInt64,
        PrimitiveEntry::new("BigInteger").with_import("java.math.BigInteger"),
    )
}

fn callback_table() -> TypeTable {
    TypeTable::new(
        TargetId::JavaScript,
        Template::new("Array<{T}>"),
        Template::new("Object<{K}, {V}>"),
        DeferredTemplate::new("function(?Error, {T}=): void", AsyncConvention::CallbackParameter)
            .with_void_pattern("function(?Error): void"),
    )
    .with_primitive(PrimitiveKind::Int32, PrimitiveEntry::new("number"))
    .with_primitive(PrimitiveKind::String, PrimitiveEntry::new("string"))
    .with_primitive(PrimitiveKind::Void, PrimitiveEntry::new("void"))
}

#[test]
fn TypeTable___primitive___uses_text_and_boxed_form() {
    let native = java_table()
        .resolve(&AbstractType::primitive(PrimitiveKind::Int32), &names())
        .unwrap();

    assert_eq!(native.text, "int");
    assert_eq!(native.boxed, "Integer");
    assert!(native.imports.is_empty());
    assert_eq!(native.convention, None);
}

#[test]
fn TypeTable___sequence___boxes_inner_type() {
    let native = java_table()
        .resolve(&AbstractType::sequence(AbstractType::primitive(PrimitiveKind::Int32)), &names())
        .unwrap();

    assert_eq!(native.text, "List<Integer>");
    assert!(native.imports.contains("java.util.List"));
}

#[test]
fn TypeTable___mapping___collects_nested_imports() {
    let ty = AbstractType::mapping(
        PrimitiveKind::String,
        AbstractType::sequence(AbstractType::primitive(PrimitiveKind::UInt64)),
    );

    let native = java_table().resolve(&ty, &names()).unwrap();

    assert_eq!(native.text, "Map<String, List<BigInteger>>");
    assert_eq!(
        native.imports.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["java.math.BigInteger", "java.util.List", "java.util.Map"]
    );
}

#[test]
fn TypeTable___references___use_target_type_names() {
    let native = java_table()
        .with_struct_passing(Passing::ConstRef)
        .resolve(&AbstractType::struct_ref("reading"), &names())
        .unwrap();

    assert_eq!(native.text, "Reading");
    assert!(native.is_const_ref());
}

#[test]
fn TypeTable___deferred___records_return_handle_convention() {
    let native = java_table()
        .resolve(&AbstractType::deferred(AbstractType::enum_ref("level")), &names())
        .unwrap();

    assert_eq!(native.text, "CompletableFuture<Level>");
    assert_eq!(native.convention, Some(AsyncConvention::ReturnHandle));
    assert!(native.imports.contains("java.util.concurrent.CompletableFuture"));
}

#[test]
fn TypeTable___deferred_void___uses_boxed_void_without_void_pattern() {
    let native = java_table()
        .resolve(&AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Void)), &names())
        .unwrap();

    assert_eq!(native.text, "CompletableFuture<Void>");
}

#[test]
fn TypeTable___deferred_void___prefers_void_pattern() {
    let table = callback_table();

    let void = table
        .resolve(&AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Void)), &names())
        .unwrap();
    let number = table
        .resolve(&AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Int32)), &names())
        .unwrap();

    assert_eq!(void.text, "function(?Error): void");
    assert_eq!(number.text, "function(?Error, number=): void");
    assert_eq!(table.async_convention(), AsyncConvention::CallbackParameter);
}

#[test]
fn TypeTable___missing_primitive___returns_unmapped_type() {
    let table = java_table().without_primitive(PrimitiveKind::String);

    let err = table
        .resolve(&AbstractType::sequence(AbstractType::primitive(PrimitiveKind::String)), &names())
        .unwrap_err();

    match err {
        GenerationError::UnmappedType { target, ty } => {
            assert_eq!(target, TargetId::Java);
            assert_eq!(ty, "string");
        }
        other => panic!("expected UnmappedType, got {other:?}"),
    }
}

#[test]
fn TypeTable___missing_mapping_key___returns_unmapped_type() {
    let ty = AbstractType::mapping(PrimitiveKind::Float64, AbstractType::primitive(PrimitiveKind::Int32));

    let err = java_table().resolve(&ty, &names()).unwrap_err();

    assert!(matches!(err, GenerationError::UnmappedType { ref ty, .. } if ty == "float64"));
}

#[test]
fn TypeTable___undeclared_reference___returns_internal_error() {
    let err = java_table()
        .resolve(&AbstractType::struct_ref("Ghost"), &names())
        .unwrap_err();

    assert!(matches!(err, GenerationError::Internal(_)));
}
