//! Cross-target consistency checking.
//!
//! Each target's emitted text is scanned back into a [`Surface`]: operation
//! signatures, enum members with ordinals, struct fields, event subscription
//! points and attribute accessors. The expected surface is derived from the
//! validated model through the target's [`NameMap`]; every difference between
//! the two becomes a [`ConsistencyViolation`].
//!
//! Scanning is line based. Enum and struct bodies are recognised by their
//! opening line and end at the next line starting with `}`. Service members
//! are only read inside `// Operations`, `// Attributes` and `// Events`
//! sections, so stubs and helper classes never leak into the surface.

use crate::emitter::TargetProfile;
use crate::output::OutputSet;
use polybind_core::{
    AsyncConvention, ConsistencyViolation, GenerationError, GenerationResult, NameMap, TargetId,
    ValidatedService,
};
use regex::Regex;
use std::collections::BTreeMap;

const SECTION_PATTERN: &str = r"^    // (Operations|Attributes|Events)$";
const CLOSE_PATTERN: &str = r"^\}";

/// Line patterns a target's scanner recognises.
///
/// `operation` captures the member name and the raw parameter list;
/// `enum_member` captures the member name and its ordinal. Every other
/// pattern captures exactly one name. `member` matches any declaration
/// inside a service section and captures the identifier it declares.
#[derive(Debug, Clone, Copy)]
pub struct ScanPatterns {
    pub enum_open: &'static str,
    pub enum_member: &'static str,
    pub struct_open: &'static str,
    pub struct_field: &'static str,
    pub operation: &'static str,
    pub getter: &'static str,
    pub setter: &'static str,
    pub subscription: &'static str,
    pub member: &'static str,
    /// Name of the trailing continuation parameter, for callback targets.
    pub callback_param: Option<&'static str>,
}

/// Compiled [`ScanPatterns`].
#[derive(Debug, Clone)]
pub struct ScanRules {
    enum_open: Regex,
    enum_member: Regex,
    struct_open: Regex,
    struct_field: Regex,
    operation: Regex,
    getter: Regex,
    setter: Regex,
    subscription: Regex,
    member: Regex,
    section: Regex,
    close: Regex,
    callback_param: Option<&'static str>,
}

impl ScanRules {
    pub fn compile(patterns: &ScanPatterns) -> GenerationResult<Self> {
        Ok(Self {
            enum_open: compile(patterns.enum_open)?,
            enum_member: compile(patterns.enum_member)?,
            struct_open: compile(patterns.struct_open)?,
            struct_field: compile(patterns.struct_field)?,
            operation: compile(patterns.operation)?,
            getter: compile(patterns.getter)?,
            setter: compile(patterns.setter)?,
            subscription: compile(patterns.subscription)?,
            member: compile(patterns.member)?,
            section: compile(SECTION_PATTERN)?,
            close: compile(CLOSE_PATTERN)?,
            callback_param: patterns.callback_param,
        })
    }
}

fn compile(pattern: &str) -> GenerationResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| GenerationError::Internal(format!("invalid scan pattern {pattern:?}: {e}")))
}

/// An operation as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    pub name: String,
    /// Parameter names, without the trailing callback.
    pub params: Vec<String>,
    pub has_callback: bool,
}

/// An attribute accessor pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeAccessor {
    pub key: String,
    pub readable: bool,
    pub writable: bool,
}

/// The externally visible shape of one target's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    pub operations: Vec<OperationSignature>,
    pub enums: BTreeMap<String, Vec<(String, i64)>>,
    pub structs: BTreeMap<String, Vec<String>>,
    pub subscriptions: Vec<String>,
    pub attributes: Vec<AttributeAccessor>,
    /// Identifiers declared in service sections, in order. Only filled by
    /// [`scan`].
    pub members: Vec<String>,
}

impl Surface {
    fn operation(&self, name: &str) -> Option<&OperationSignature> {
        self.operations.iter().find(|o| o.name == name)
    }

    fn has_subscription(&self, name: &str) -> bool {
        self.subscriptions.iter().any(|s| s == name)
    }

    fn attribute(&self, key: &str) -> Option<&AttributeAccessor> {
        self.attributes.iter().find(|a| a.key == key)
    }

    fn attribute_mut(&mut self, key: &str) -> &mut AttributeAccessor {
        let index = match self.attributes.iter().position(|a| a.key == key) {
            Some(index) => index,
            None => {
                self.attributes.push(AttributeAccessor {
                    key: key.to_string(),
                    readable: false,
                    writable: false,
                });
                self.attributes.len() - 1
            }
        };
        &mut self.attributes[index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Operations,
    Attributes,
    Events,
}

enum Block {
    Enum(String),
    Struct(String),
}

/// Scan every file of an output set.
pub fn scan(output: &OutputSet, rules: &ScanRules) -> Surface {
    let mut surface = Surface::default();

    for file in output.files() {
        let mut block: Option<Block> = None;
        let mut section: Option<Section> = None;

        for line in file.contents().lines() {
            if let Some(current) = &block {
                if rules.close.is_match(line) {
                    block = None;
                    continue;
                }
                match current {
                    Block::Enum(name) => {
                        let member = rules.enum_member.captures(line).and_then(|caps| {
                            parse_ordinal(&caps[2]).map(|ordinal| (caps[1].to_string(), ordinal))
                        });
                        if let Some(member) = member {
                            surface.enums.entry(name.clone()).or_default().push(member);
                        }
                    }
                    Block::Struct(name) => {
                        if let Some(caps) = rules.struct_field.captures(line) {
                            surface
                                .structs
                                .entry(name.clone())
                                .or_default()
                                .push(caps[1].to_string());
                        }
                    }
                }
                continue;
            }

            if let Some(caps) = rules.enum_open.captures(line) {
                surface.enums.entry(caps[1].to_string()).or_default();
                block = Some(Block::Enum(caps[1].to_string()));
                continue;
            }
            if let Some(caps) = rules.struct_open.captures(line) {
                surface.structs.entry(caps[1].to_string()).or_default();
                block = Some(Block::Struct(caps[1].to_string()));
                continue;
            }
            if let Some(caps) = rules.section.captures(line) {
                section = match &caps[1] {
                    "Operations" => Some(Section::Operations),
                    "Attributes" => Some(Section::Attributes),
                    _ => Some(Section::Events),
                };
                continue;
            }
            if rules.close.is_match(line) {
                section = None;
                continue;
            }

            if section.is_some()
                && let Some(caps) = rules.member.captures(line)
            {
                surface.members.push(caps[1].to_string());
            }
            match section {
                Some(Section::Operations) => {
                    if let Some(caps) = rules.operation.captures(line) {
                        surface
                            .operations
                            .push(signature(&caps[1], &caps[2], rules.callback_param));
                    }
                }
                Some(Section::Attributes) => {
                    if let Some(caps) = rules.getter.captures(line) {
                        surface.attribute_mut(&caps[1]).readable = true;
                    } else if let Some(caps) = rules.setter.captures(line) {
                        surface.attribute_mut(&caps[1]).writable = true;
                    }
                }
                Some(Section::Events) => {
                    if let Some(caps) = rules.subscription.captures(line) {
                        surface.subscriptions.push(caps[1].to_string());
                    }
                }
                None => {}
            }
        }
    }

    surface
}

/// Ordinal text as emitted. `INT64_MIN` stands in for the one value C++
/// cannot spell as a literal.
fn parse_ordinal(text: &str) -> Option<i64> {
    match text {
        "INT64_MIN" => Some(i64::MIN),
        _ => text.parse().ok(),
    }
}

fn signature(name: &str, raw_params: &str, callback: Option<&str>) -> OperationSignature {
    let mut params = param_names(raw_params);
    let has_callback = match callback {
        Some(callback) if params.last().is_some_and(|p| p == callback) => {
            params.pop();
            true
        }
        _ => false,
    };

    OperationSignature {
        name: name.to_string(),
        params,
        has_callback,
    }
}

/// Extract parameter names from a declaration's parameter list.
///
/// Commas nested in `<>`, `()` or `[]` do not split, and `/* ... */`
/// comments are ignored. The name is the last identifier of each parameter.
pub fn param_names(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            '<' | '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            '>' | ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);

    parts
        .iter()
        .filter_map(|part| {
            let mut name: Vec<char> = part
                .trim()
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            name.reverse();
            (!name.is_empty()).then(|| name.into_iter().collect())
        })
        .collect()
}

/// Derive the surface a target's output must have.
pub fn expected_surface(
    service: &ValidatedService,
    profile: &TargetProfile,
    names: &NameMap,
) -> GenerationResult<Surface> {
    let def = service.definition();
    let callback_target = profile.table().async_convention() == AsyncConvention::CallbackParameter;
    let mut surface = Surface::default();

    for op in &def.operations {
        let params = op
            .parameters
            .iter()
            .map(|p| names.param(&op.name, &p.name).map(str::to_string))
            .collect::<GenerationResult<Vec<_>>>()?;
        surface.operations.push(OperationSignature {
            name: names.member(&op.name)?.to_string(),
            params,
            has_callback: callback_target && op.returns.is_deferred(),
        });
    }

    for e in &def.enums {
        let members = e
            .members
            .iter()
            .map(|m| Ok((names.enum_member(&e.name, &m.name)?.to_string(), m.ordinal)))
            .collect::<GenerationResult<Vec<_>>>()?;
        surface
            .enums
            .insert(names.type_name(&e.name)?.to_string(), members);
    }

    for s in &def.structs {
        let fields = s
            .fields
            .iter()
            .map(|f| names.field(&s.name, &f.name).map(str::to_string))
            .collect::<GenerationResult<Vec<_>>>()?;
        surface
            .structs
            .insert(names.type_name(&s.name)?.to_string(), fields);
    }

    for event in &def.events {
        surface
            .subscriptions
            .push(profile.subscription_name(names.member(&event.name)?));
    }

    for attr in &def.attributes {
        surface.attributes.push(AttributeAccessor {
            key: profile.accessor_key(names.member(&attr.name)?),
            readable: true,
            writable: attr.mutable,
        });
    }

    if !def.events.is_empty()
        && let Some(table) = profile.events_table(names.type_name(&def.name)?)
    {
        surface.enums.insert(table, Vec::new());
    }

    Ok(surface)
}

/// Compare an expected surface against an observed one.
pub fn compare(
    target: TargetId,
    expected: &Surface,
    observed: &Surface,
) -> Vec<ConsistencyViolation> {
    let mut violations = Vec::new();
    let mut violation = |entity: String, expected: String, observed: String| {
        violations.push(ConsistencyViolation {
            target,
            entity,
            expected,
            observed,
        });
    };

    for op in &expected.operations {
        let entity = format!("operation {}", op.name);
        let Some(found) = observed.operation(&op.name) else {
            violation(entity, "declared".to_string(), "missing".to_string());
            continue;
        };
        if found.params.len() != op.params.len() {
            violation(
                format!("{entity} parameter count"),
                format!("{} ({})", op.params.len(), op.params.join(", ")),
                format!("{} ({})", found.params.len(), found.params.join(", ")),
            );
        } else if found.params != op.params {
            violation(
                format!("{entity} parameters"),
                op.params.join(", "),
                found.params.join(", "),
            );
        }
        if found.has_callback != op.has_callback {
            violation(
                format!("{entity} callback"),
                callback_label(op.has_callback),
                callback_label(found.has_callback),
            );
        }
    }
    for op in &observed.operations {
        if expected.operation(&op.name).is_none() {
            violation(
                format!("operation {}", op.name),
                "absent".to_string(),
                "declared".to_string(),
            );
        }
    }

    let mut declared: BTreeMap<&str, usize> = BTreeMap::new();
    for member in &observed.members {
        *declared.entry(member.as_str()).or_default() += 1;
    }
    for (member, count) in declared {
        if count > 1 {
            violation(
                format!("member {member}"),
                "declared once".to_string(),
                format!("declared {count} times"),
            );
        }
    }

    for (name, members) in &expected.enums {
        let Some(found) = observed.enums.get(name) else {
            violation(format!("enum {name}"), "declared".to_string(), "missing".to_string());
            continue;
        };
        for (member, ordinal) in members {
            let entity = format!("enum {name}.{member}");
            match found.iter().find(|(m, _)| m == member) {
                None => violation(entity, format!("ordinal {ordinal}"), "missing".to_string()),
                Some((_, seen)) if seen != ordinal => {
                    violation(entity, format!("ordinal {ordinal}"), format!("ordinal {seen}"))
                }
                Some(_) => {}
            }
        }
        for (member, ordinal) in found {
            if !members.iter().any(|(m, _)| m == member) {
                violation(
                    format!("enum {name}.{member}"),
                    "absent".to_string(),
                    format!("ordinal {ordinal}"),
                );
            }
        }
    }
    for name in observed.enums.keys() {
        if !expected.enums.contains_key(name) {
            violation(format!("enum {name}"), "absent".to_string(), "declared".to_string());
        }
    }

    for (name, fields) in &expected.structs {
        match observed.structs.get(name) {
            None => {
                violation(format!("struct {name}"), "declared".to_string(), "missing".to_string())
            }
            Some(found) if found != fields => violation(
                format!("struct {name} fields"),
                fields.join(", "),
                found.join(", "),
            ),
            Some(_) => {}
        }
    }

    for name in observed.structs.keys() {
        if !expected.structs.contains_key(name) {
            violation(format!("struct {name}"), "absent".to_string(), "declared".to_string());
        }
    }

    for subscription in &expected.subscriptions {
        if !observed.has_subscription(subscription) {
            violation(
                format!("event subscription {subscription}"),
                "declared".to_string(),
                "missing".to_string(),
            );
        }
    }
    for subscription in &observed.subscriptions {
        if !expected.has_subscription(subscription) {
            violation(
                format!("event subscription {subscription}"),
                "absent".to_string(),
                "declared".to_string(),
            );
        }
    }

    for attr in &expected.attributes {
        let entity = format!("attribute {}", attr.key);
        match observed.attribute(&attr.key) {
            None => violation(entity, access_label(attr), "missing".to_string()),
            Some(found) if found.readable != attr.readable || found.writable != attr.writable => {
                violation(entity, access_label(attr), access_label(found))
            }
            Some(_) => {}
        }
    }
    for attr in &observed.attributes {
        if expected.attribute(&attr.key).is_none() {
            violation(format!("attribute {}", attr.key), "absent".to_string(), access_label(attr));
        }
    }

    violations
}

fn callback_label(has_callback: bool) -> String {
    if has_callback { "trailing callback" } else { "no callback" }.to_string()
}

fn access_label(attr: &AttributeAccessor) -> String {
    match (attr.readable, attr.writable) {
        (true, true) => "read-write",
        (true, false) => "read-only",
        (false, true) => "write-only",
        (false, false) => "inaccessible",
    }
    .to_string()
}

/// One target's inputs to [`verify`].
#[derive(Debug, Clone, Copy)]
pub struct TargetCheck<'a> {
    pub profile: &'a TargetProfile,
    pub names: &'a NameMap,
    pub output: &'a OutputSet,
}

/// Outcome of a consistency run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    checked: Vec<TargetId>,
    violations: Vec<ConsistencyViolation>,
}

impl ConsistencyReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn checked(&self) -> &[TargetId] {
        &self.checked
    }

    pub fn violations(&self) -> &[ConsistencyViolation] {
        &self.violations
    }

    pub fn violations_for(&self, target: TargetId) -> impl Iterator<Item = &ConsistencyViolation> {
        self.violations.iter().filter(move |v| v.target == target)
    }

    /// `Inconsistent` if any violation was found.
    pub fn into_result(self) -> GenerationResult<Self> {
        if self.is_clean() {
            Ok(self)
        } else {
            Err(GenerationError::Inconsistent(self.violations))
        }
    }
}

/// Verify every target's output against the model.
pub fn verify(
    service: &ValidatedService,
    checks: &[TargetCheck<'_>],
) -> GenerationResult<ConsistencyReport> {
    let mut report = ConsistencyReport::default();

    for check in checks {
        let target = check.profile.target();
        let rules = ScanRules::compile(&check.profile.scan_patterns())?;
        let expected = expected_surface(service, check.profile, check.names)?;
        let observed = scan(check.output, &rules);
        let violations = compare(target, &expected, &observed);

        tracing::debug!(
            target_id = %target,
            operations = observed.operations.len(),
            violations = violations.len(),
            "Checked target output"
        );

        report.checked.push(target);
        report.violations.extend(violations);
    }

    Ok(report)
}
