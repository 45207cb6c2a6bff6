//! Loading service definitions and configuration from disk

use anyhow::{Context, Result, bail};
use polybind_core::{GeneratorConfig, ServiceDefinition};
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "polybind.toml";

/// Load a service definition; the format follows the file extension.
pub fn load_definition(path: &Path) -> Result<ServiceDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read service definition: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
        Some("toml") => parse_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display())),
        _ => bail!(
            "Unsupported definition format: {} (expected .json or .toml)",
            path.display()
        ),
    }
}

pub fn parse_json(content: &str) -> Result<ServiceDefinition> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_toml(content: &str) -> Result<ServiceDefinition> {
    Ok(toml::from_str(content)?)
}

/// Load the run configuration.
///
/// An explicit path must exist. Without one, `polybind.toml` in the working
/// directory is used when present, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
        None => return Ok(GeneratorConfig::default()),
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = GeneratorConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    Ok(config)
}
