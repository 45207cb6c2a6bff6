//! Target profiles and emitter dispatch.
//!
//! A [`TargetProfile`] bundles everything one target needs: its injected
//! [`TypeTable`], its [`NamingStrategy`] and the scan patterns used by the
//! consistency checker. Dispatch to the target's emitter is an explicit match
//! on [`TargetId`].

use crate::consistency::ScanPatterns;
use crate::output::OutputSet;
use crate::targets::{cpp, java, javascript};
use polybind_core::{
    GenerationResult, NameMap, NamingStrategy, TargetId, TypeTable, ValidatedService,
};

/// Tables, naming rules and scanner for one target.
#[derive(Debug, Clone)]
pub struct TargetProfile {
    target: TargetId,
    table: TypeTable,
    naming: NamingStrategy,
}

impl TargetProfile {
    /// The built-in profile of a target.
    pub fn builtin(target: TargetId) -> Self {
        let (table, naming) = match target {
            TargetId::Java => (java::type_table(), java::naming()),
            TargetId::JavaScript => (javascript::type_table(), javascript::naming()),
            TargetId::Cpp => (cpp::type_table(), cpp::naming()),
        };
        Self {
            target,
            table,
            naming,
        }
    }

    /// Substitute the type table, e.g. to restrict the mapped primitives.
    #[must_use]
    pub fn with_table(mut self, table: TypeTable) -> Self {
        self.table = table;
        self
    }

    #[must_use]
    pub fn with_naming(mut self, naming: NamingStrategy) -> Self {
        self.naming = naming;
        self
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    /// Compute the target's names for every scope of the service.
    pub fn build_names(&self, service: &ValidatedService) -> GenerationResult<NameMap> {
        self.naming.build_names(service)
    }

    /// Render the service. The returned set uses the default output root.
    pub fn emit(&self, service: &ValidatedService, names: &NameMap) -> GenerationResult<OutputSet> {
        match self.target {
            TargetId::Java => java::emit(service, &self.table, names),
            TargetId::JavaScript => javascript::emit(service, &self.table, names),
            TargetId::Cpp => cpp::emit(service, &self.table, names),
        }
    }

    pub fn scan_patterns(&self) -> ScanPatterns {
        match self.target {
            TargetId::Java => java::SCAN_PATTERNS,
            TargetId::JavaScript => javascript::SCAN_PATTERNS,
            TargetId::Cpp => cpp::SCAN_PATTERNS,
        }
    }

    /// Name of the subscription method for an event member name.
    pub fn subscription_name(&self, event: &str) -> String {
        match self.target {
            TargetId::Java => java::subscription_name(event),
            TargetId::JavaScript => javascript::subscription_name(event),
            TargetId::Cpp => cpp::subscription_name(event),
        }
    }

    /// Enum-shaped table of event names the target emits beside the
    /// service, if any.
    pub fn events_table(&self, service_name: &str) -> Option<String> {
        match self.target {
            TargetId::JavaScript => Some(javascript::events_table(service_name)),
            TargetId::Java | TargetId::Cpp => None,
        }
    }

    /// Key under which the scanner records an attribute's accessors.
    pub fn accessor_key(&self, attribute: &str) -> String {
        match self.target {
            TargetId::Java => java::accessor_key(attribute),
            TargetId::JavaScript | TargetId::Cpp => attribute.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use polybind_core::{AsyncConvention, PrimitiveKind};
    use test_case::test_case;

    #[test_case(TargetId::Java, AsyncConvention::ReturnHandle)]
    #[test_case(TargetId::JavaScript, AsyncConvention::CallbackParameter)]
    #[test_case(TargetId::Cpp, AsyncConvention::ReturnHandle)]
    fn TargetProfile___builtin___declares_async_convention(
        target: TargetId,
        expected: AsyncConvention,
    ) {
        let profile = TargetProfile::builtin(target);

        assert_eq!(profile.target(), target);
        assert_eq!(profile.table().async_convention(), expected);
    }

    #[test]
    fn TargetProfile___builtin___maps_every_primitive() {
        for target in TargetId::ALL {
            let profile = TargetProfile::builtin(target);
            for kind in PrimitiveKind::ALL {
                assert!(profile.table().has_primitive(kind), "{target} lacks {kind}");
            }
        }
    }

    #[test_case(TargetId::Java, "fuelCritical", "addFuelCriticalListener")]
    #[test_case(TargetId::JavaScript, "fuelCritical", "onFuelCritical")]
    #[test_case(TargetId::Cpp, "fuel_critical", "on_fuel_critical")]
    fn TargetProfile___subscription_name___follows_target_style(
        target: TargetId,
        event: &str,
        expected: &str,
    ) {
        assert_eq!(TargetProfile::builtin(target).subscription_name(event), expected);
    }

    #[test_case(TargetId::Java, None)]
    #[test_case(TargetId::JavaScript, Some("ClockEvents"))]
    #[test_case(TargetId::Cpp, None)]
    fn TargetProfile___events_table___only_for_javascript(
        target: TargetId,
        expected: Option<&str>,
    ) {
        let table = TargetProfile::builtin(target).events_table("Clock");

        assert_eq!(table.as_deref(), expected);
    }

    #[test]
    fn TargetProfile___with_table___replaces_table() {
        let table = java::type_table().without_primitive(PrimitiveKind::Float64);

        let profile = TargetProfile::builtin(TargetId::Java).with_table(table);

        assert!(!profile.table().has_primitive(PrimitiveKind::Float64));
    }
}
