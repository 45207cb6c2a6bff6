//! Generator configuration types

use crate::{GenerationError, GenerationResult, TargetId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

/// Generator configuration, usually read from `polybind.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Targets to generate, in run order (default: all)
    #[serde(default = "default_targets")]
    pub targets: Vec<TargetId>,

    /// Output directory per target id
    ///
    /// Keys are target ids (`java`, `javascript`, `cpp`; aliases such as
    /// `js` are accepted). A target without an entry writes to
    /// `generated/<target>`.
    #[serde(default)]
    pub output_roots: BTreeMap<String, PathBuf>,

    /// Emit targets on the rayon pool (default: true)
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_targets() -> Vec<TargetId> {
    TargetId::ALL.to_vec()
}

fn default_parallel() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            targets: default_targets(),
            output_roots: BTreeMap::new(),
            parallel: default_parallel(),
            log_level: default_log_level(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate configuration from TOML text
    ///
    /// Empty or whitespace-only input yields the defaults.
    pub fn from_toml_str(text: &str) -> GenerationResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Restrict the run to the given targets
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = TargetId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Set the output directory of one target
    pub fn with_output_root(mut self, target: TargetId, root: impl Into<PathBuf>) -> Self {
        self.output_roots
            .insert(target.as_str().to_string(), root.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check target selection and output root keys
    pub fn validate(&self) -> GenerationResult<()> {
        if self.targets.is_empty() {
            return Err(GenerationError::Config(
                "at least one target must be selected".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if !seen.insert(*target) {
                return Err(GenerationError::Config(format!(
                    "target '{target}' is listed more than once"
                )));
            }
        }

        let mut roots: HashMap<TargetId, &str> = HashMap::new();
        for key in self.output_roots.keys() {
            let Some(target) = TargetId::parse(key) else {
                return Err(GenerationError::Config(format!(
                    "unknown target '{key}' in output_roots"
                )));
            };
            if let Some(previous) = roots.insert(target, key) {
                return Err(GenerationError::Config(format!(
                    "output_roots keys '{previous}' and '{key}' both name {target}"
                )));
            }
        }

        Ok(())
    }

    /// Output directory for a target
    pub fn output_root(&self, target: TargetId) -> PathBuf {
        self.output_roots
            .iter()
            .find(|(key, _)| TargetId::parse(key) == Some(target))
            .map(|(_, root)| root.clone())
            .unwrap_or_else(|| PathBuf::from(target.default_output_root()))
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;

#[cfg(test)]
#[path = "config/config_parameterized_tests.rs"]
mod config_parameterized_tests;
