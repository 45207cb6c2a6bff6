#![allow(non_snake_case)]

use super::*;
use std::path::Path;

#[test]
fn GeneratorConfig___default___has_expected_values() {
    let config = GeneratorConfig::default();

    assert_eq!(config.targets, TargetId::ALL.to_vec());
    assert!(config.parallel);
    assert_eq!(config.log_level, "info");
    assert!(config.output_roots.is_empty());
}

#[test]
fn GeneratorConfig___from_empty_text___returns_defaults() {
    let config = GeneratorConfig::from_toml_str("  \n").unwrap();

    assert_eq!(config, GeneratorConfig::default());
}

#[test]
fn GeneratorConfig___from_toml___parses_all_fields() {
    let text = r#"
        targets = ["cpp", "java"]
        parallel = false
        log_level = "debug"

        [output_roots]
        java = "out/java"
    "#;

    let config = GeneratorConfig::from_toml_str(text).unwrap();

    assert_eq!(config.targets, vec![TargetId::Cpp, TargetId::Java]);
    assert!(!config.parallel);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.output_root(TargetId::Java), Path::new("out/java"));
}

#[test]
fn GeneratorConfig___output_root___defaults_per_target() {
    let config = GeneratorConfig::default();

    assert_eq!(
        config.output_root(TargetId::JavaScript),
        Path::new("generated/javascript")
    );
}

#[test]
fn GeneratorConfig___output_root___accepts_alias_keys() {
    let config = GeneratorConfig::from_toml_str("[output_roots]\njs = \"web/lib\"\n").unwrap();

    assert_eq!(config.output_root(TargetId::JavaScript), Path::new("web/lib"));
}

#[test]
fn GeneratorConfig___empty_targets___is_config_error() {
    let err = GeneratorConfig::from_toml_str("targets = []").unwrap_err();

    assert!(matches!(err, GenerationError::Config(ref msg) if msg.contains("at least one")));
}

#[test]
fn GeneratorConfig___duplicate_target___is_config_error() {
    let err = GeneratorConfig::from_toml_str(r#"targets = ["java", "java"]"#).unwrap_err();

    assert!(matches!(err, GenerationError::Config(ref msg) if msg.contains("more than once")));
}

#[test]
fn GeneratorConfig___unknown_target___is_config_error() {
    let err = GeneratorConfig::from_toml_str(r#"targets = ["kotlin"]"#).unwrap_err();

    assert!(matches!(err, GenerationError::Config(_)));
}

#[test]
fn GeneratorConfig___unknown_output_root_key___is_config_error() {
    let err = GeneratorConfig::from_toml_str("[output_roots]\nswift = \"out\"\n").unwrap_err();

    assert!(matches!(err, GenerationError::Config(ref msg) if msg.contains("swift")));
}

#[test]
fn GeneratorConfig___aliased_output_root_keys___is_config_error() {
    let text = "[output_roots]\njavascript = \"web/a\"\njs = \"web/b\"\n";

    let err = GeneratorConfig::from_toml_str(text).unwrap_err();

    assert!(matches!(
        err,
        GenerationError::Config(ref msg) if msg.contains("'javascript' and 'js'")
    ));
    assert_eq!(err.error_code(), 12);
}

#[test]
fn GeneratorConfig___builders___override_defaults() {
    let config = GeneratorConfig::new()
        .with_targets([TargetId::Cpp])
        .with_output_root(TargetId::Cpp, "native")
        .with_parallel(false);

    assert!(config.validate().is_ok());
    assert_eq!(config.targets, vec![TargetId::Cpp]);
    assert_eq!(config.output_root(TargetId::Cpp), Path::new("native"));
    assert!(!config.parallel);
}
