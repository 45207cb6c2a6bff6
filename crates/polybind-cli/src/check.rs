//! Check command implementation

use crate::{loader, writer};
use anyhow::{Context, Result};
use polybind_codegen::Generator;
use polybind_core::GeneratorConfig;
use std::path::Path;

/// Verify files on disk against a service definition.
pub fn run(input: &Path, config: GeneratorConfig, base: &Path) -> Result<()> {
    let definition = loader::load_definition(input)?;
    let service_name = definition.name.clone();

    println!("Checking generated bindings for {service_name}");

    let outputs = config
        .targets
        .iter()
        .map(|target| writer::read_output(*target, &base.join(config.output_root(*target))))
        .collect::<Result<Vec<_>>>()?;

    let report = Generator::new(config)?
        .check(definition, &outputs)
        .with_context(|| format!("Check failed for {service_name}"))?;

    for output in &outputs {
        let count = report.violations_for(output.target()).count();
        let mark = if count == 0 { "✓" } else { "✗" };
        println!("{mark} {}: {} file(s), {count} violation(s)", output.target(), output.len());
    }
    for violation in report.violations() {
        println!("  {violation}");
    }

    report.into_result()?;
    println!("\nGenerated bindings are consistent!");
    Ok(())
}
