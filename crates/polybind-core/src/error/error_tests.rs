#![allow(non_snake_case)]

use super::*;

#[test]
fn GenerationError___cyclic_reference___displays_cycle_path() {
    let err = GenerationError::CyclicReference {
        cycle: vec!["A".into(), "B".into(), "A".into()],
    };

    let display = err.to_string();

    assert_eq!(display, "cyclic reference: A -> B -> A");
}

#[test]
fn GenerationError___undefined_reference___names_kind_and_origin() {
    let err = GenerationError::UndefinedReference {
        kind: "struct",
        name: "Ghost".into(),
        referenced_from: "parameter calculate.left".into(),
    };

    let display = err.to_string();

    assert_eq!(
        display,
        "undefined struct reference 'Ghost' in parameter calculate.left"
    );
}

#[test]
fn GenerationError___unmapped_type___prefixes_target() {
    let err = GenerationError::UnmappedType {
        target: TargetId::Cpp,
        ty: "float64".into(),
    };

    assert_eq!(err.to_string(), "[cpp] no mapping for type float64");
}

#[test]
fn GenerationError___inconsistent___counts_and_lists_violations() {
    let err = GenerationError::Inconsistent(vec![ConsistencyViolation {
        target: TargetId::Java,
        entity: "enum Operation.ADD".into(),
        expected: "ordinal 1".into(),
        observed: "ordinal 0".into(),
    }]);

    let display = err.to_string();

    assert!(display.starts_with("1 consistency violation(s)"));
    assert!(
        display.contains("[java] enum Operation.ADD: expected ordinal 1, observed ordinal 0")
    );
}

#[test]
fn GenerationError___targets_failed___lists_each_target() {
    let err = GenerationError::TargetsFailed(vec![
        TargetFailure::new(
            TargetId::Java,
            GenerationError::UnmappedType {
                target: TargetId::Java,
                ty: "uint64".into(),
            },
        ),
        TargetFailure::new(TargetId::Cpp, GenerationError::Internal("boom".into())),
    ]);

    let display = err.to_string();

    assert!(display.contains("java: [java] no mapping for type uint64"));
    assert!(display.contains("cpp: internal error: boom"));
}

#[test]
fn GenerationError___all_variants___have_unique_codes() {
    let errors = vec![
        GenerationError::CyclicReference { cycle: vec![] },
        GenerationError::UndefinedReference {
            kind: "enum",
            name: "".into(),
            referenced_from: "".into(),
        },
        GenerationError::NameCollision {
            scope: "".into(),
            name: "".into(),
        },
        GenerationError::DuplicateOrdinal {
            enum_name: "".into(),
            ordinal: 0,
            member: "".into(),
            previous: "".into(),
        },
        GenerationError::InvalidIdentifier {
            identifier: "".into(),
            context: "".into(),
        },
        GenerationError::InvalidTypeUsage {
            context: "".into(),
            reason: "".into(),
        },
        GenerationError::NamingCollision {
            target: TargetId::Java,
            scope: "".into(),
            identifier: "".into(),
            reason: "".into(),
        },
        GenerationError::UnmappedType {
            target: TargetId::Java,
            ty: "".into(),
        },
        GenerationError::TargetsFailed(vec![]),
        GenerationError::Inconsistent(vec![]),
        GenerationError::Config("".into()),
        GenerationError::Internal("".into()),
    ];

    let codes: Vec<u8> = errors.iter().map(|e| e.error_code()).collect();
    let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();

    assert_eq!(codes.len(), unique.len(), "All error codes should be unique");
    assert!(!codes.contains(&0), "0 is reserved for success");
    assert!(!codes.contains(&1), "1 is reserved for generic CLI failures");
}

#[test]
fn GenerationError___from_toml_error___converts_to_config() {
    let toml_err = toml::from_str::<toml::Value>("targets = [").unwrap_err();

    let err: GenerationError = toml_err.into();

    assert!(matches!(err, GenerationError::Config(_)));
}
