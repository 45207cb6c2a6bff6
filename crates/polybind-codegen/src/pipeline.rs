//! The end-to-end generation run.
//!
//! A run resolves the definition, computes every target's [`NameMap`] up
//! front, emits each target (on rayon workers unless configured otherwise),
//! and verifies all outputs before handing them back. Any failure discards
//! every output of the run.

use crate::consistency::{ConsistencyReport, TargetCheck, verify};
use crate::emitter::TargetProfile;
use crate::output::OutputSet;
use polybind_core::{
    GenerationError, GenerationResult, GeneratorConfig, NameMap, ServiceDefinition, TargetFailure,
    TargetId, ValidatedService, resolve,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Runs generation for the configured targets.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    profiles: Vec<TargetProfile>,
}

impl Generator {
    /// Create a generator with the built-in profile of every configured target.
    pub fn new(config: GeneratorConfig) -> GenerationResult<Self> {
        config.validate()?;
        let profiles = config
            .targets
            .iter()
            .map(|target| TargetProfile::builtin(*target))
            .collect();
        Ok(Self { config, profiles })
    }

    /// Replace the profile of a configured target.
    pub fn with_profile(mut self, profile: TargetProfile) -> GenerationResult<Self> {
        let slot = self
            .profiles
            .iter_mut()
            .find(|p| p.target() == profile.target())
            .ok_or_else(|| {
                GenerationError::Config(format!("target '{}' is not configured", profile.target()))
            })?;
        *slot = profile;
        Ok(self)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn profiles(&self) -> &[TargetProfile] {
        &self.profiles
    }

    /// Resolve, name, emit and verify.
    pub fn generate(&self, definition: ServiceDefinition) -> GenerationResult<Generation> {
        info!(
            service = %definition.name,
            targets = self.profiles.len(),
            parallel = self.config.parallel,
            "Generating bindings"
        );

        let service = resolve(definition)?;
        let names = self
            .profiles
            .iter()
            .map(|profile| profile.build_names(&service))
            .collect::<GenerationResult<Vec<_>>>()?;

        let outputs = self.emit_all(&service, &names)?;

        let checks: Vec<TargetCheck<'_>> = self
            .profiles
            .iter()
            .zip(&names)
            .zip(&outputs)
            .map(|((profile, names), output)| TargetCheck {
                profile,
                names,
                output,
            })
            .collect();
        let report = verify(&service, &checks)?;
        for violation in report.violations() {
            warn!(target_id = %violation.target, entity = %violation.entity, "{violation}");
        }
        let report = report.into_result()?;

        let files: usize = outputs.iter().map(OutputSet::len).sum();
        info!(service = %service.name(), files, "Generation complete");

        Ok(Generation {
            service,
            outputs,
            report,
        })
    }

    /// Verify outputs produced elsewhere, e.g. files read back from disk.
    pub fn check(
        &self,
        definition: ServiceDefinition,
        outputs: &[OutputSet],
    ) -> GenerationResult<ConsistencyReport> {
        let service = resolve(definition)?;
        let mut names = Vec::with_capacity(outputs.len());
        let mut profiles = Vec::with_capacity(outputs.len());
        for output in outputs {
            let profile = self
                .profiles
                .iter()
                .find(|p| p.target() == output.target())
                .ok_or_else(|| {
                    let target = output.target();
                    GenerationError::Config(format!("target '{target}' is not configured"))
                })?;
            names.push(profile.build_names(&service)?);
            profiles.push(profile);
        }

        let checks: Vec<TargetCheck<'_>> = profiles
            .iter()
            .zip(&names)
            .zip(outputs)
            .map(|((profile, names), output)| TargetCheck {
                profile,
                names,
                output,
            })
            .collect();
        verify(&service, &checks)
    }

    fn emit_all(
        &self,
        service: &ValidatedService,
        names: &[NameMap],
    ) -> GenerationResult<Vec<OutputSet>> {
        let emit_one = |(profile, names): (&TargetProfile, &NameMap)| {
            let target = profile.target();
            debug!(target_id = %target, "Emitting target");
            profile
                .emit(service, names)
                .map(|output| output.with_root(self.config.output_root(target)))
                .map_err(|error| TargetFailure::new(target, error))
        };

        let results: Vec<Result<OutputSet, TargetFailure>> = if self.config.parallel {
            self.profiles.par_iter().zip(names).map(emit_one).collect()
        } else {
            self.profiles.iter().zip(names).map(emit_one).collect()
        };

        let mut outputs = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(output) => outputs.push(output),
                Err(failure) => {
                    warn!(target_id = %failure.target, error = %failure.error, "Target failed");
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(outputs)
        } else {
            Err(GenerationError::TargetsFailed(failures))
        }
    }
}

/// The verified result of a run.
#[derive(Debug, Clone)]
pub struct Generation {
    service: ValidatedService,
    outputs: Vec<OutputSet>,
    report: ConsistencyReport,
}

impl Generation {
    pub fn service(&self) -> &ValidatedService {
        &self.service
    }

    /// Output sets in configured target order.
    pub fn outputs(&self) -> &[OutputSet] {
        &self.outputs
    }

    pub fn output(&self, target: TargetId) -> Option<&OutputSet> {
        self.outputs.iter().find(|o| o.target() == target)
    }

    pub fn report(&self) -> &ConsistencyReport {
        &self.report
    }

    pub fn into_outputs(self) -> Vec<OutputSet> {
        self.outputs
    }
}
