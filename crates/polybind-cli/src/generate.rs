//! Generate command implementation

use crate::{loader, writer};
use anyhow::{Context, Result, bail};
use polybind_codegen::{Generator, TargetProfile};
use polybind_core::{GeneratorConfig, TargetId};
use std::path::Path;

/// Apply command-line target and parallelism overrides to a config.
pub fn apply_overrides(
    config: GeneratorConfig,
    targets: &[String],
    sequential: bool,
) -> Result<GeneratorConfig> {
    let mut config = config;
    if !targets.is_empty() {
        let parsed = targets
            .iter()
            .map(|name| match TargetId::parse(name) {
                Some(target) => Ok(target),
                None => bail!("Unknown target '{name}' (expected java, javascript or cpp)"),
            })
            .collect::<Result<Vec<_>>>()?;
        config = config.with_targets(parsed);
    }
    if sequential {
        config = config.with_parallel(false);
    }
    config.validate()?;
    Ok(config)
}

/// Generate, verify and write bindings.
pub fn run(input: &Path, config: GeneratorConfig, base: &Path, dry_run: bool) -> Result<()> {
    let definition = loader::load_definition(input)?;
    let service_name = definition.name.clone();

    println!("Generating bindings for {service_name}");

    let generation = Generator::new(config)?
        .generate(definition)
        .with_context(|| format!("Generation failed for {service_name}"))?;

    for output in generation.outputs() {
        println!(
            "✓ {}: {} file(s), {} bytes -> {}",
            output.target(),
            output.len(),
            output.total_bytes(),
            base.join(output.root()).display()
        );
    }

    if dry_run {
        for output in generation.outputs() {
            for file in output.files() {
                let path = output.root().join(file.path());
                println!("  {}  {}", &file.checksum()[..12], path.display());
            }
        }
        println!("\nDry run: nothing written");
        return Ok(());
    }

    let written = writer::write_outputs(generation.outputs(), base)?;
    println!("\nWrote {} file(s)", written.len());
    Ok(())
}

/// Print the built-in targets.
pub fn list_targets() {
    for target in TargetId::ALL {
        let profile = TargetProfile::builtin(target);
        println!(
            "{:<12} {:?}, default root {}",
            target.as_str(),
            profile.table().async_convention(),
            target.default_output_root()
        );
    }
}
