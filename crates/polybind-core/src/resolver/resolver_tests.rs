#![allow(non_snake_case)]

use super::*;
use crate::model::{Attribute, EnumDef, Event, Field, Operation, PrimitiveKind, StructDef};
use test_case::test_case;

fn float64() -> AbstractType {
    AbstractType::primitive(PrimitiveKind::Float64)
}

fn calculator() -> ServiceDefinition {
    ServiceDefinition::new("Calculator")
        .with_operation(
            Operation::new(
                "calculate",
                AbstractType::deferred(AbstractType::struct_ref("CalculationResult")),
            )
            .with_param("left", float64())
            .with_param("right", float64())
            .with_param("op", AbstractType::enum_ref("Operation")),
        )
        .with_enum(
            EnumDef::new("Operation")
                .with_member("ADD", 1)
                .with_member("SUBTRACT", 2)
                .with_member("DIVIDE", 4),
        )
        .with_struct(
            StructDef::new("CalculationResult")
                .with_field("result", float64())
                .with_field("isValid", AbstractType::primitive(PrimitiveKind::Bool)),
        )
}

#[test]
fn resolve___calculator___succeeds_with_enum_first() {
    let service = resolve(calculator()).unwrap();

    assert_eq!(
        service.declaration_order(),
        vec!["Operation", "CalculationResult"]
    );
    assert_eq!(service.name(), "Calculator");
}

#[test]
fn resolve___struct_dependencies___precede_referrers() {
    let def = ServiceDefinition::new("Shop")
        .with_struct(
            StructDef::new("Order")
                .with_field("lines", AbstractType::sequence(AbstractType::struct_ref("Line")))
                .with_field("customer", AbstractType::struct_ref("Customer")),
        )
        .with_struct(StructDef::new("Line").with_field("product", AbstractType::struct_ref("Product")))
        .with_struct(StructDef::new("Product").with_field("name", AbstractType::primitive(PrimitiveKind::String)))
        .with_struct(StructDef::new("Customer"));

    let service = resolve(def).unwrap();

    assert_eq!(
        service.declaration_order(),
        vec!["Product", "Line", "Customer", "Order"]
    );
}

#[test]
fn resolve___two_struct_cycle___returns_cyclic_reference() {
    let def = ServiceDefinition::new("Loop")
        .with_struct(StructDef::new("A").with_field("b", AbstractType::struct_ref("B")))
        .with_struct(StructDef::new("B").with_field("a", AbstractType::struct_ref("A")));

    let err = resolve(def).unwrap_err();

    match err {
        GenerationError::CyclicReference { cycle } => assert_eq!(cycle, vec!["A", "B", "A"]),
        other => panic!("expected CyclicReference, got {other:?}"),
    }
}

#[test]
fn resolve___self_reference_through_sequence___returns_cyclic_reference() {
    let def = ServiceDefinition::new("Tree").with_struct(
        StructDef::new("Node").with_field("children", AbstractType::sequence(AbstractType::struct_ref("Node"))),
    );

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::CyclicReference { ref cycle } if cycle == &vec!["Node".to_string(), "Node".to_string()]));
}

#[test]
fn resolve___undefined_parameter_struct___returns_undefined_reference() {
    let def = ServiceDefinition::new("Haunted").with_operation(
        Operation::new("summon", AbstractType::primitive(PrimitiveKind::Void))
            .with_param("spirit", AbstractType::struct_ref("Ghost")),
    );

    let err = resolve(def).unwrap_err();

    match err {
        GenerationError::UndefinedReference {
            kind,
            name,
            referenced_from,
        } => {
            assert_eq!(kind, "struct");
            assert_eq!(name, "Ghost");
            assert_eq!(referenced_from, "parameter summon.spirit");
        }
        other => panic!("expected UndefinedReference, got {other:?}"),
    }
}

#[test]
fn resolve___struct_ref_to_enum___returns_undefined_reference() {
    let def = calculator().with_struct(
        StructDef::new("Wrong").with_field("op", AbstractType::struct_ref("Operation")),
    );

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::UndefinedReference { kind: "struct", .. }));
}

#[test]
fn resolve___undefined_event_payload___returns_undefined_reference() {
    let def = calculator().with_event(Event::tuple(
        "failed",
        vec![Field::new("level", AbstractType::enum_ref("Severity"))],
    ));

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::UndefinedReference { kind: "enum", .. }));
}

#[test]
fn resolve___struct_and_enum_share_name___returns_name_collision() {
    let def = calculator().with_struct(StructDef::new("Operation"));

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::NameCollision { ref name, .. } if name == "Operation"));
}

#[test]
fn resolve___attribute_shadows_operation___returns_name_collision() {
    let def = calculator().with_attribute(Attribute::new("calculate", float64(), false));

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::NameCollision { ref scope, .. } if scope == "service Calculator"));
}

#[test]
fn resolve___duplicate_parameter___returns_name_collision() {
    let def = ServiceDefinition::new("S").with_operation(
        Operation::new("op", float64())
            .with_param("x", float64())
            .with_param("x", float64()),
    );

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::NameCollision { ref scope, .. } if scope == "operation op"));
}

#[test]
fn resolve___duplicate_ordinal___returns_duplicate_ordinal() {
    let def = ServiceDefinition::new("S").with_enum(
        EnumDef::new("Mode").with_member("ON", 1).with_member("ENABLED", 1),
    );

    let err = resolve(def).unwrap_err();

    match err {
        GenerationError::DuplicateOrdinal {
            ordinal,
            member,
            previous,
            ..
        } => {
            assert_eq!(ordinal, 1);
            assert_eq!(member, "ENABLED");
            assert_eq!(previous, "ON");
        }
        other => panic!("expected DuplicateOrdinal, got {other:?}"),
    }
}

#[test]
fn resolve___void_field___returns_invalid_type_usage() {
    let def = ServiceDefinition::new("S").with_struct(
        StructDef::new("Empty").with_field("nothing", AbstractType::primitive(PrimitiveKind::Void)),
    );

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidTypeUsage { .. }));
}

#[test]
fn resolve___deferred_parameter___returns_invalid_type_usage() {
    let def = ServiceDefinition::new("S").with_operation(
        Operation::new("op", float64())
            .with_param("later", AbstractType::deferred(float64())),
    );

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidTypeUsage { ref context, .. } if context == "parameter op.later"));
}

#[test]
fn resolve___nested_deferred_return___returns_invalid_type_usage() {
    let def = ServiceDefinition::new("S").with_operation(Operation::new(
        "op",
        AbstractType::deferred(AbstractType::deferred(float64())),
    ));

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidTypeUsage { .. }));
}

#[test]
fn resolve___deferred_void_return___is_accepted() {
    let def = ServiceDefinition::new("S").with_operation(Operation::new(
        "reset",
        AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Void)),
    ));

    assert!(resolve(def).is_ok());
}

#[test]
fn resolve___invalid_identifier___returns_invalid_identifier() {
    let def = ServiceDefinition::new("S").with_enum(EnumDef::new("Mode").with_member("2FAST", 1));

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidIdentifier { ref identifier, .. } if identifier == "2FAST"));
}

#[test_case("org.my-lib.clock" ; "dash")]
#[test_case("org..clock" ; "empty segment")]
#[test_case("org.9lives" ; "leading digit")]
fn resolve___invalid_package_segment___returns_invalid_identifier(package: &str) {
    let def = ServiceDefinition::new("Clock").with_package(package);

    let err = resolve(def).unwrap_err();

    assert!(matches!(err, GenerationError::InvalidIdentifier { ref context, .. } if context.contains(package)));
}

#[test]
fn resolve___same_input___produces_same_order() {
    let first = resolve(calculator()).unwrap();
    let second = resolve(calculator()).unwrap();

    assert_eq!(first.declaration_order(), second.declaration_order());
}

#[test]
fn is_identifier___accepts_canonical_forms() {
    assert!(is_identifier("isValid"));
    assert!(is_identifier("_private"));
    assert!(is_identifier("ENGINE_CHECK"));
    assert!(!is_identifier(""));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier("has-dash"));
    assert!(!is_identifier("ünïcode"));
}
