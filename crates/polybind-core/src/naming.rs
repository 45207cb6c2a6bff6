//! Naming convention utilities and per-target naming strategies.
//!
//! Canonical identifiers are split into words and re-cased per target and
//! role. A [`NamingStrategy`] also carries the target's reserved keywords and
//! its escape suffix; [`NamingStrategy::build_names`] renames every scope of a
//! validated service up front into a [`NameMap`], so that naming failures
//! abort the run before any emitter starts.
//!
//! Emitters expand attributes and events into further members of the
//! service type (`getSpeed`, `on_fuel_critical`). A strategy's
//! [`MemberExpansion`] names those identifiers so they are claimed in the
//! service scope too: an operation that lands on one is escaped.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `display_name` | [`to_camel_case`] | `displayName` |
//! | `calculationResult` | [`to_pascal_case`] | `CalculationResult` |
//! | `isValid` | [`to_snake_case`] | `is_valid` |
//! | `engineCheck` | [`to_screaming_snake_case`] | `ENGINE_CHECK` |
//! | `VehicleDashboard` | [`to_kebab_case`] | `vehicle-dashboard` |
//! | `word` | [`capitalize`] | `Word` |

use crate::model::{EventPayload, ServiceDefinition};
use crate::resolver::{ValidatedService, is_identifier};
use crate::{GenerationError, GenerationResult, TargetId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Split an identifier into words.
///
/// Boundaries are `_`, `-`, `.`, lower-to-upper transitions, digit-to-upper
/// transitions, and the end of an acronym (`HTTPServer` is `HTTP`, `Server`).
///
/// # Examples
///
/// ```
/// use polybind_core::naming::split_words;
///
/// assert_eq!(split_words("isValid"), vec!["is", "Valid"]);
/// assert_eq!(split_words("ENGINE_CHECK"), vec!["ENGINE", "CHECK"]);
/// assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
/// ```
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// Convert an identifier to camelCase.
///
/// # Examples
///
/// ```
/// use polybind_core::naming::to_camel_case;
///
/// assert_eq!(to_camel_case("hello_world"), "helloWorld");
/// assert_eq!(to_camel_case("display_name"), "displayName");
/// assert_eq!(to_camel_case("already"), "already");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::new();

    for (i, word) in split_words(s).iter().enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            result.push_str(&lower);
        } else {
            result.push_str(&capitalize(&lower));
        }
    }

    result
}

/// Convert an identifier to PascalCase.
///
/// Handles snake_case, kebab-case, camelCase and already-capitalized input.
///
/// # Examples
///
/// ```
/// use polybind_core::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
/// assert_eq!(to_pascal_case("hello-world"), "HelloWorld");
/// assert_eq!(to_pascal_case("hello"), "Hello");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|word| capitalize(&word.to_lowercase()))
        .collect()
}

/// Convert an identifier to snake_case.
pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert an identifier to SCREAMING_SNAKE_CASE.
pub fn to_screaming_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert an identifier to kebab-case, for file names.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use polybind_core::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize("world"), "World");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// What an identifier names in the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Type,
    Field,
    Method,
    EnumMember,
    Constant,
}

/// Casing transform applied to canonical identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// Keep the canonical spelling.
    Preserve,
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
}

impl Casing {
    pub fn apply(&self, s: &str) -> String {
        match self {
            Casing::Preserve => s.to_string(),
            Casing::Camel => to_camel_case(s),
            Casing::Pascal => to_pascal_case(s),
            Casing::Snake => to_snake_case(s),
            Casing::ScreamingSnake => to_screaming_snake_case(s),
        }
    }
}

/// A naming scope: identifiers in one scope must be distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Top-level type names (service, enums, structs).
    Types,
    /// Constant names (service, events).
    Constants,
    /// Members of the service type (operations, events, attributes).
    Service,
    Struct(String),
    Enum(String),
    Operation(String),
    Event(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Types => write!(f, "types"),
            Scope::Constants => write!(f, "constants"),
            Scope::Service => write!(f, "service members"),
            Scope::Struct(name) => write!(f, "struct {name}"),
            Scope::Enum(name) => write!(f, "enum {name}"),
            Scope::Operation(name) => write!(f, "operation {name}"),
            Scope::Event(name) => write!(f, "event {name}"),
        }
    }
}

/// A member of the service type, carrying its target name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceMember<'a> {
    Operation(&'a str),
    Attribute { name: &'a str, mutable: bool },
    Event(&'a str),
}

/// Identifiers a member occupies on the generated service type.
pub type MemberExpansion = fn(ServiceMember<'_>) -> Vec<String>;

/// Every member occupies exactly its own name.
pub fn own_name(member: ServiceMember<'_>) -> Vec<String> {
    match member {
        ServiceMember::Operation(name)
        | ServiceMember::Attribute { name, .. }
        | ServiceMember::Event(name) => vec![name.to_string()],
    }
}

/// Per-target identifier rules.
#[derive(Debug, Clone)]
pub struct NamingStrategy {
    target: TargetId,
    type_case: Casing,
    field_case: Casing,
    method_case: Casing,
    member_case: Casing,
    constant_case: Casing,
    keywords: BTreeSet<String>,
    escape_suffix: String,
    reserved_parameters: BTreeSet<String>,
    expansion: MemberExpansion,
}

impl NamingStrategy {
    /// Create a strategy that preserves identifiers and reserves nothing.
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            type_case: Casing::Preserve,
            field_case: Casing::Preserve,
            method_case: Casing::Preserve,
            member_case: Casing::Preserve,
            constant_case: Casing::Preserve,
            keywords: BTreeSet::new(),
            escape_suffix: "_".to_string(),
            reserved_parameters: BTreeSet::new(),
            expansion: own_name,
        }
    }

    pub fn with_casing(mut self, role: Role, casing: Casing) -> Self {
        match role {
            Role::Type => self.type_case = casing,
            Role::Field => self.field_case = casing,
            Role::Method => self.method_case = casing,
            Role::EnumMember => self.member_case = casing,
            Role::Constant => self.constant_case = casing,
        }
        self
    }

    pub fn with_keywords<'a>(mut self, keywords: impl IntoIterator<Item = &'a str>) -> Self {
        self.keywords
            .extend(keywords.into_iter().map(ToString::to_string));
        self
    }

    pub fn with_escape_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.escape_suffix = suffix.into();
        self
    }

    /// Names the emitter itself introduces into every parameter list.
    pub fn with_reserved_parameters<'a>(
        mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        self.reserved_parameters
            .extend(names.into_iter().map(ToString::to_string));
        self
    }

    /// How service members expand into identifiers on the service type.
    pub fn with_member_expansion(mut self, expansion: MemberExpansion) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Identifiers `member` occupies on the service type.
    pub fn expand(&self, member: ServiceMember<'_>) -> Vec<String> {
        (self.expansion)(member)
    }

    pub fn casing(&self, role: Role) -> Casing {
        match role {
            Role::Type => self.type_case,
            Role::Field => self.field_case,
            Role::Method => self.method_case,
            Role::EnumMember => self.member_case,
            Role::Constant => self.constant_case,
        }
    }

    pub fn is_keyword(&self, identifier: &str) -> bool {
        self.keywords.contains(identifier)
    }

    /// Rename a single identifier, escaping it if it is a keyword.
    pub fn rename(&self, canonical: &str, role: Role) -> GenerationResult<String> {
        let scope = "identifier".to_string();
        let base = self.cased(canonical, role, &scope)?;
        if !self.is_keyword(&base) {
            return Ok(base);
        }

        let escaped = format!("{base}{}", self.escape_suffix);
        if self.is_keyword(&escaped) {
            return Err(self.collision(&scope, escaped, canonical));
        }
        Ok(escaped)
    }

    /// Rename the identifiers of one scope.
    ///
    /// The first claimant of a name keeps it; later siblings, keywords and
    /// `reserved` names get the escape suffix. An escaped name that still
    /// collides (with a keyword, a reserved name, an assigned name or a
    /// sibling's plain name) is fatal.
    pub fn rename_scope(
        &self,
        scope: &Scope,
        entries: &[(&str, Role)],
        reserved: &BTreeSet<String>,
    ) -> GenerationResult<Vec<String>> {
        let scope_label = scope.to_string();
        let bases = entries
            .iter()
            .map(|(name, role)| self.cased(name, *role, &scope_label))
            .collect::<GenerationResult<Vec<_>>>()?;

        let mut taken: HashSet<String> = reserved.iter().cloned().collect();
        let mut renamed = Vec::with_capacity(bases.len());

        for (i, base) in bases.iter().enumerate() {
            let clashes = self.is_keyword(base) || taken.contains(base);
            let name = if clashes {
                let escaped = format!("{base}{}", self.escape_suffix);
                if self.is_keyword(&escaped)
                    || taken.contains(&escaped)
                    || bases[i + 1..].contains(&escaped)
                {
                    return Err(self.collision(&scope_label, escaped, entries[i].0));
                }
                tracing::debug!(
                    target_id = %self.target,
                    scope = %scope_label,
                    from = %base,
                    to = %escaped,
                    "Escaped identifier"
                );
                escaped
            } else {
                base.clone()
            };

            taken.insert(name.clone());
            renamed.push(name);
        }

        Ok(renamed)
    }

    /// Rename every scope of a validated service.
    pub fn build_names(&self, service: &ValidatedService) -> GenerationResult<NameMap> {
        let def = service.definition();
        let none = BTreeSet::new();
        let mut map = NameMap::new(self.target);

        let mut types = vec![(def.name.as_str(), Role::Type)];
        types.extend(def.enums.iter().map(|e| (e.name.as_str(), Role::Type)));
        types.extend(def.structs.iter().map(|s| (s.name.as_str(), Role::Type)));
        self.fill(&mut map, Scope::Types, &types, &none)?;

        let mut constants = vec![(def.name.as_str(), Role::Constant)];
        constants.extend(def.events.iter().map(|e| (e.name.as_str(), Role::Constant)));
        self.fill(&mut map, Scope::Constants, &constants, &none)?;

        let mut members: Vec<(&str, Role)> = Vec::new();
        members.extend(def.operations.iter().map(|o| (o.name.as_str(), Role::Method)));
        members.extend(def.events.iter().map(|e| (e.name.as_str(), Role::Method)));
        members.extend(def.attributes.iter().map(|a| (a.name.as_str(), Role::Field)));
        self.fill(&mut map, Scope::Service, &members, &none)?;
        self.claim_service_members(&mut map, def)?;
        map.package = def
            .package_segments()
            .iter()
            .map(|segment| self.package_segment(segment))
            .collect::<GenerationResult<_>>()?;

        for op in &def.operations {
            let params: Vec<_> = op
                .parameters
                .iter()
                .map(|p| (p.name.as_str(), Role::Field))
                .collect();
            self.fill(
                &mut map,
                Scope::Operation(op.name.clone()),
                &params,
                &self.reserved_parameters,
            )?;
        }
        for event in &def.events {
            if let EventPayload::Tuple(fields) = &event.payload {
                let fields: Vec<_> = fields
                    .iter()
                    .map(|f| (f.name.as_str(), Role::Field))
                    .collect();
                self.fill(&mut map, Scope::Event(event.name.clone()), &fields, &none)?;
            }
        }
        for s in &def.structs {
            let fields: Vec<_> = s.fields.iter().map(|f| (f.name.as_str(), Role::Field)).collect();
            self.fill(&mut map, Scope::Struct(s.name.clone()), &fields, &none)?;
        }
        for e in &def.enums {
            let members: Vec<_> = e
                .members
                .iter()
                .map(|m| (m.name.as_str(), Role::EnumMember))
                .collect();
            self.fill(&mut map, Scope::Enum(e.name.clone()), &members, &none)?;
        }

        Ok(map)
    }

    /// Claim the expanded identifiers of attributes and events, then give
    /// each operation a name none of them uses.
    ///
    /// Two expansions claiming one identifier is fatal. An operation on a
    /// claimed identifier is escaped once; a second collision is fatal.
    fn claim_service_members(
        &self,
        map: &mut NameMap,
        def: &ServiceDefinition,
    ) -> GenerationResult<()> {
        let scope = Scope::Service;
        let label = scope.to_string();
        let mut claimed: HashMap<String, &str> = HashMap::new();

        for attr in &def.attributes {
            let member = ServiceMember::Attribute {
                name: map.get(&scope, &attr.name)?,
                mutable: attr.mutable,
            };
            for identifier in self.expand(member) {
                self.claim(&mut claimed, identifier, &attr.name, &label)?;
            }
        }
        for event in &def.events {
            let member = ServiceMember::Event(map.get(&scope, &event.name)?);
            for identifier in self.expand(member) {
                self.claim(&mut claimed, identifier, &event.name, &label)?;
            }
        }

        for op in &def.operations {
            let name = map.get(&scope, &op.name)?.to_string();
            let expanded = self.expand(ServiceMember::Operation(&name));
            if expanded.iter().all(|identifier| !claimed.contains_key(identifier)) {
                for identifier in expanded {
                    self.claim(&mut claimed, identifier, &op.name, &label)?;
                }
                continue;
            }

            let escaped = format!("{name}{}", self.escape_suffix);
            let assigned = map
                .names
                .get(&scope)
                .is_some_and(|names| names.values().any(|n| *n == escaped));
            if self.is_keyword(&escaped) || assigned {
                return Err(self.collision(&label, escaped, &op.name));
            }
            for identifier in self.expand(ServiceMember::Operation(&escaped)) {
                if claimed.contains_key(&identifier) {
                    return Err(self.collision(&label, identifier, &op.name));
                }
                claimed.insert(identifier, &op.name);
            }
            tracing::debug!(
                target_id = %self.target,
                scope = %label,
                from = %name,
                to = %escaped,
                "Escaped operation shadowed by a derived member"
            );
            map.names
                .entry(scope.clone())
                .or_default()
                .insert(op.name.clone(), escaped);
        }

        Ok(())
    }

    fn claim<'d>(
        &self,
        claimed: &mut HashMap<String, &'d str>,
        identifier: String,
        owner: &'d str,
        scope: &str,
    ) -> GenerationResult<()> {
        if let Some(previous) = claimed.get(&identifier) {
            return Err(GenerationError::NamingCollision {
                target: self.target,
                scope: scope.to_string(),
                reason: format!("is derived from both '{previous}' and '{owner}'"),
                identifier,
            });
        }
        claimed.insert(identifier, owner);
        Ok(())
    }

    /// Package segments keep their spelling; keywords get the escape suffix.
    fn package_segment(&self, segment: &str) -> GenerationResult<String> {
        if !self.is_keyword(segment) {
            return Ok(segment.to_string());
        }
        let escaped = format!("{segment}{}", self.escape_suffix);
        if self.is_keyword(&escaped) {
            return Err(self.collision("package", escaped, segment));
        }
        Ok(escaped)
    }

    fn fill(
        &self,
        map: &mut NameMap,
        scope: Scope,
        entries: &[(&str, Role)],
        reserved: &BTreeSet<String>,
    ) -> GenerationResult<()> {
        let renamed = self.rename_scope(&scope, entries, reserved)?;
        let names = map.names.entry(scope).or_default();
        for ((canonical, _), name) in entries.iter().zip(renamed) {
            names.insert((*canonical).to_string(), name);
        }
        Ok(())
    }

    fn cased(&self, canonical: &str, role: Role, scope: &str) -> GenerationResult<String> {
        let cased = self.casing(role).apply(canonical);
        if is_identifier(&cased) {
            Ok(cased)
        } else {
            Err(GenerationError::NamingCollision {
                target: self.target,
                scope: scope.to_string(),
                identifier: cased,
                reason: format!("derived from '{canonical}' is not a valid identifier"),
            })
        }
    }

    fn collision(&self, scope: &str, identifier: String, canonical: &str) -> GenerationError {
        GenerationError::NamingCollision {
            target: self.target,
            scope: scope.to_string(),
            identifier,
            reason: format!("still collides after escaping '{canonical}'"),
        }
    }
}

/// Target identifiers for every scope of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMap {
    target: TargetId,
    names: BTreeMap<Scope, BTreeMap<String, String>>,
    package: Vec<String>,
}

impl NameMap {
    fn new(target: TargetId) -> Self {
        Self {
            target,
            names: BTreeMap::new(),
            package: Vec::new(),
        }
    }

    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Package segments, keyword-escaped for the target.
    pub fn package_segments(&self) -> &[String] {
        &self.package
    }

    /// Look up the target identifier for `canonical` in `scope`.
    pub fn get(&self, scope: &Scope, canonical: &str) -> GenerationResult<&str> {
        self.names
            .get(scope)
            .and_then(|names| names.get(canonical))
            .map(String::as_str)
            .ok_or_else(|| {
                GenerationError::Internal(format!(
                    "[{}] no name for '{canonical}' in {scope}",
                    self.target
                ))
            })
    }

    pub fn type_name(&self, canonical: &str) -> GenerationResult<&str> {
        self.get(&Scope::Types, canonical)
    }

    pub fn constant(&self, canonical: &str) -> GenerationResult<&str> {
        self.get(&Scope::Constants, canonical)
    }

    /// Operation, event or attribute name on the service type.
    pub fn member(&self, canonical: &str) -> GenerationResult<&str> {
        self.get(&Scope::Service, canonical)
    }

    pub fn field(&self, struct_name: &str, field: &str) -> GenerationResult<&str> {
        self.get(&Scope::Struct(struct_name.to_string()), field)
    }

    pub fn enum_member(&self, enum_name: &str, member: &str) -> GenerationResult<&str> {
        self.get(&Scope::Enum(enum_name.to_string()), member)
    }

    pub fn param(&self, operation: &str, param: &str) -> GenerationResult<&str> {
        self.get(&Scope::Operation(operation.to_string()), param)
    }

    pub fn event_field(&self, event: &str, field: &str) -> GenerationResult<&str> {
        self.get(&Scope::Event(event.to_string()), field)
    }
}
