//! Shared service definitions for unit tests.

use polybind_core::model::Field;
use polybind_core::{
    AbstractType, Attribute, EnumDef, Event, Operation, PrimitiveKind, ServiceDefinition,
    StructDef, ValidatedService, resolve,
};

pub(crate) fn prim(kind: PrimitiveKind) -> AbstractType {
    AbstractType::primitive(kind)
}

/// The calculator: one deferred operation over an enum and a struct.
pub(crate) fn calculator() -> ServiceDefinition {
    ServiceDefinition::new("Calculator")
        .with_package("org.example.calculator")
        .with_version(1, 0)
        .with_doc("Performs arithmetic.")
        .with_enum(
            EnumDef::new("Operation")
                .with_member("ADD", 1)
                .with_member("SUBTRACT", 2)
                .with_member("DIVIDE", 4),
        )
        .with_struct(
            StructDef::new("CalculationResult")
                .with_field("result", prim(PrimitiveKind::Float64))
                .with_field("isValid", prim(PrimitiveKind::Bool)),
        )
        .with_operation(
            Operation::new(
                "calculate",
                AbstractType::deferred(AbstractType::struct_ref("CalculationResult")),
            )
            .with_param("left", prim(PrimitiveKind::Float64))
            .with_param("right", prim(PrimitiveKind::Float64))
            .with_param("op", AbstractType::enum_ref("Operation"))
            .fallible(),
        )
}

/// A service touching every member kind: sync and deferred operations,
/// value and tuple events, read-only and mutable attributes, nested
/// references and a 64-bit enum.
pub(crate) fn dashboard() -> ServiceDefinition {
    ServiceDefinition::new("VehicleDashboard")
        .with_package("com.acme.vehicle")
        .with_version(2, 3)
        .with_struct(
            StructDef::new("Trip")
                .with_field(
                    "waypoints",
                    AbstractType::sequence(AbstractType::struct_ref("GeoPoint")),
                )
                .with_field(
                    "tags",
                    AbstractType::mapping(PrimitiveKind::String, prim(PrimitiveKind::Int32)),
                )
                .with_field("gear", AbstractType::enum_ref("Gear")),
        )
        .with_struct(
            StructDef::new("GeoPoint")
                .with_field("latitude", prim(PrimitiveKind::Float64))
                .with_field("longitude", prim(PrimitiveKind::Float64)),
        )
        .with_enum(
            EnumDef::new("Gear")
                .with_member("PARK", 0)
                .with_member("DRIVE", 99)
                .with_member("REVERSE", -1),
        )
        .with_enum(
            EnumDef::new("Odometer")
                .with_member("ZERO", 0)
                .with_member("FAR", 5_000_000_000),
        )
        .with_operation(
            Operation::new("startTrip", AbstractType::deferred(AbstractType::struct_ref("Trip")))
                .with_param("origin", AbstractType::struct_ref("GeoPoint"))
                .with_param("label", prim(PrimitiveKind::String)),
        )
        .with_operation(
            Operation::new("resetTrip", prim(PrimitiveKind::Void))
                .with_param("new", prim(PrimitiveKind::Bool))
                .fallible(),
        )
        .with_operation(Operation::new(
            "syncNow",
            AbstractType::deferred(prim(PrimitiveKind::Void)),
        ))
        .with_event(Event::value("fuelCritical", prim(PrimitiveKind::Float32)))
        .with_event(Event::tuple(
            "gearChanged",
            vec![
                Field::new("previous", AbstractType::enum_ref("Gear")),
                Field::new("current", AbstractType::enum_ref("Gear")),
            ],
        ))
        .with_attribute(Attribute::new("speed", prim(PrimitiveKind::Float64), false))
        .with_attribute(Attribute::new("driverName", prim(PrimitiveKind::String), true))
}

pub(crate) fn validated(def: ServiceDefinition) -> ValidatedService {
    resolve(def).unwrap()
}

/// Operations spelled like accessors and subscriptions the other members
/// derive, under a package with a keyword segment.
pub(crate) fn shadowing() -> ServiceDefinition {
    let level = prim(PrimitiveKind::Float32);
    let void = prim(PrimitiveKind::Void);
    ServiceDefinition::new("Panel")
        .with_package("org.example.class")
        .with_attribute(Attribute::new("currentSpeed", level.clone(), false))
        .with_attribute(Attribute::new("brightness", level.clone(), true))
        .with_event(Event::value("fuelCritical", level.clone()))
        .with_operation(Operation::new("getCurrentSpeed", level.clone()))
        .with_operation(Operation::new("setBrightness", void.clone()).with_param("level", level))
        .with_operation(Operation::new("onFuelCritical", void.clone()))
        .with_operation(Operation::new("addFuelCriticalListener", void))
}

/// An enum holding both ends of the ordinal range.
pub(crate) fn extremes() -> ServiceDefinition {
    ServiceDefinition::new("Limits").with_enum(
        EnumDef::new("Bound")
            .with_member("LOWEST", i64::MIN)
            .with_member("HIGHEST", i64::MAX),
    )
}
