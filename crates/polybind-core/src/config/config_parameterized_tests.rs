#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// ============================================================================
// Parameterized config TOML parsing tests
// ============================================================================

#[test_case(r#"log_level = "info""#, "info")]
#[test_case(r#"log_level = "debug""#, "debug")]
#[test_case(r#"log_level = "warn""#, "warn")]
#[test_case(r#"log_level = "trace""#, "trace")]
fn GeneratorConfig___log_level_toml___parses_correctly(text: &str, expected_level: &str) {
    let config = GeneratorConfig::from_toml_str(text).unwrap();
    assert_eq!(config.log_level, expected_level);
}

#[test_case(r#"targets = ["java"]"#, &[TargetId::Java])]
#[test_case(r#"targets = ["javascript", "cpp"]"#, &[TargetId::JavaScript, TargetId::Cpp])]
#[test_case("parallel = true", &TargetId::ALL)]
fn GeneratorConfig___targets_toml___parses_correctly(text: &str, expected: &[TargetId]) {
    let config = GeneratorConfig::from_toml_str(text).unwrap();
    assert_eq!(config.targets, expected);
}

#[test_case("parallel = false", false)]
#[test_case("parallel = true", true)]
#[test_case(r#"log_level = "info""#, true)]
fn GeneratorConfig___parallel_toml___parses_correctly(text: &str, expected: bool) {
    let config = GeneratorConfig::from_toml_str(text).unwrap();
    assert_eq!(config.parallel, expected);
}

#[test_case("targets = 3" ; "wrong type")]
#[test_case("parallel = \"yes\"" ; "string for bool")]
#[test_case("targets = [" ; "truncated")]
fn GeneratorConfig___malformed_toml___is_config_error(text: &str) {
    let err = GeneratorConfig::from_toml_str(text).unwrap_err();
    assert_eq!(err.error_code(), 12);
}
