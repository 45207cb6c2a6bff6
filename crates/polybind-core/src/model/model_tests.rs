#![allow(non_snake_case)]

use super::*;

#[test]
fn ServiceDefinition___from_json___parses_calculator_contract() {
    let json = r#"{
        "name": "Calculator",
        "package": "org.example.calculator",
        "version": { "major": 1, "minor": 0 },
        "operations": [{
            "name": "calculate",
            "parameters": [
                { "name": "left", "type": { "primitive": "float64" } },
                { "name": "right", "type": { "primitive": "float64" } },
                { "name": "op", "type": { "enum": "Operation" } }
            ],
            "returns": { "deferred": { "struct": "CalculationResult" } },
            "fallible": true
        }],
        "enums": [{
            "name": "Operation",
            "members": [
                { "name": "ADD", "ordinal": 1 },
                { "name": "DIVIDE", "ordinal": 4 }
            ]
        }],
        "structs": [{
            "name": "CalculationResult",
            "fields": [
                { "name": "result", "type": { "primitive": "float64" } },
                { "name": "isValid", "type": { "primitive": "bool" } }
            ]
        }]
    }"#;

    let service: ServiceDefinition = serde_json::from_str(json).unwrap();

    assert_eq!(service.name, "Calculator");
    assert_eq!(service.version, Some(InterfaceVersion { major: 1, minor: 0 }));
    assert_eq!(service.operations[0].parameters.len(), 3);
    assert!(service.operations[0].fallible);
    assert_eq!(
        service.operations[0].returns,
        AbstractType::deferred(AbstractType::struct_ref("CalculationResult"))
    );
    assert_eq!(service.enums[0].members[1].ordinal, 4);
    assert!(service.events.is_empty());
}

#[test]
fn ServiceDefinition___from_json___parses_event_payloads() {
    let json = r#"{
        "name": "Dashboard",
        "events": [
            { "name": "dataChanged", "payload": { "value": { "struct": "VehicleData" } } },
            { "name": "fuelCritical", "payload": { "tuple": [
                { "name": "remaining", "type": { "primitive": "float32" } },
                { "name": "range", "type": { "primitive": "float32" } }
            ] } }
        ]
    }"#;

    let service: ServiceDefinition = serde_json::from_str(json).unwrap();

    assert_eq!(service.events[0].payload.arity(), 1);
    assert_eq!(service.events[1].payload.arity(), 2);
}

#[test]
fn AbstractType___mapping___parses_key_and_value() {
    let json = r#"{ "mapping": { "key": "string", "value": { "sequence": { "primitive": "int32" } } } }"#;

    let ty: AbstractType = serde_json::from_str(json).unwrap();

    assert_eq!(
        ty,
        AbstractType::mapping(
            PrimitiveKind::String,
            AbstractType::sequence(AbstractType::primitive(PrimitiveKind::Int32))
        )
    );
}

#[test]
fn AbstractType___display___renders_nested_types() {
    let ty = AbstractType::deferred(AbstractType::mapping(
        PrimitiveKind::String,
        AbstractType::sequence(AbstractType::struct_ref("Item")),
    ));

    assert_eq!(ty.to_string(), "deferred<mapping<string, sequence<struct Item>>>");
}

#[test]
fn AbstractType___references___collects_in_source_order() {
    let ty = AbstractType::mapping(
        PrimitiveKind::String,
        AbstractType::sequence(AbstractType::enum_ref("Level")),
    );

    let refs = ty.references();

    assert_eq!(refs, vec![TypeReference::Enum("Level")]);
}

#[test]
fn AbstractType___payload___unwraps_deferred() {
    let ty = AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Bool));

    assert_eq!(ty.payload(), &AbstractType::primitive(PrimitiveKind::Bool));
    assert!(ty.is_deferred());
}

#[test]
fn AbstractType___nested_kinds___ignores_top_level() {
    let top_void = AbstractType::primitive(PrimitiveKind::Void);
    let nested_void = AbstractType::sequence(AbstractType::primitive(PrimitiveKind::Void));
    let nested_deferred =
        AbstractType::sequence(AbstractType::deferred(AbstractType::struct_ref("X")));

    assert_eq!(top_void.nested_kinds(), (false, false));
    assert_eq!(nested_void.nested_kinds(), (true, false));
    assert_eq!(nested_deferred.nested_kinds(), (false, true));
}

#[test]
fn PrimitiveKind___serde___uses_canonical_names() {
    for kind in PrimitiveKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();

        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
}

#[test]
fn EnumDef___fits_i32___detects_wide_ordinals() {
    let narrow = EnumDef::new("Narrow").with_member("A", i64::from(i32::MAX));
    let wide = EnumDef::new("Wide").with_member("A", i64::from(i32::MAX) + 1);

    assert!(narrow.fits_i32());
    assert!(!wide.fits_i32());
}

#[test]
fn ServiceDefinition___package_segments___skips_empty_parts() {
    let service = ServiceDefinition::new("S").with_package("org.example..calc");

    assert_eq!(service.package_segments(), vec!["org", "example", "calc"]);
}

#[test]
fn ServiceDefinition___from_toml___parses_inline_tables() {
    let toml_src = r#"
        name = "Clock"

        [[operations]]
        name = "now"
        returns = { deferred = { primitive = "int64" } }

        [[attributes]]
        name = "timezone"
        type = { primitive = "string" }
        mutable = true
    "#;

    let service: ServiceDefinition = toml::from_str(toml_src).unwrap();

    assert_eq!(
        service.operations[0].returns,
        AbstractType::deferred(AbstractType::primitive(PrimitiveKind::Int64))
    );
    assert!(service.attributes[0].mutable);
}
