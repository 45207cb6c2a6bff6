//! Built-in targets.
//!
//! Each target module provides its type table, its naming strategy, the scan
//! patterns for its output and an `emit` function. Modules never share
//! state; [`TargetProfile`](crate::TargetProfile) dispatches to them.

pub mod cpp;
pub mod java;
pub mod javascript;

use polybind_core::{GenerationResult, NameMap, NativeType, TypeTable};
use polybind_core::model::{AbstractType, EventPayload, Field};
use std::collections::BTreeSet;

/// Resolve a type and record its imports.
pub(crate) fn resolve_into(
    table: &TypeTable,
    names: &NameMap,
    ty: &AbstractType,
    imports: &mut BTreeSet<String>,
) -> GenerationResult<NativeType> {
    let native = table.resolve(ty, names)?;
    imports.extend(native.imports.iter().cloned());
    Ok(native)
}

/// Resolved event payload: one `(name, type)` pair per handler argument.
///
/// A value payload yields a single unnamed argument.
pub(crate) fn payload_args(
    table: &TypeTable,
    names: &NameMap,
    event: &str,
    payload: &EventPayload,
    imports: &mut BTreeSet<String>,
) -> GenerationResult<Vec<(Option<String>, NativeType)>> {
    match payload {
        EventPayload::Value(ty) => Ok(vec![(None, resolve_into(table, names, ty, imports)?)]),
        EventPayload::Tuple(fields) => fields
            .iter()
            .map(|Field { name, ty, .. }| {
                let native = resolve_into(table, names, ty, imports)?;
                Ok((Some(names.event_field(event, name)?.to_string()), native))
            })
            .collect(),
    }
}
