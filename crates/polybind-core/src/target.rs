//! Target platform identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported output targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    /// Managed, class-based platform with `CompletableFuture` results.
    Java,
    /// Single-threaded event-loop platform with callback continuations.
    JavaScript,
    /// Systems platform with separate header and source artifacts.
    Cpp,
}

impl TargetId {
    /// Every target, in canonical order.
    pub const ALL: [TargetId; 3] = [TargetId::Java, TargetId::JavaScript, TargetId::Cpp];

    /// Get the target key string (e.g., "javascript").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::Cpp => "cpp",
        }
    }

    /// Parse a target from its string representation.
    ///
    /// Accepts the canonical key plus the common short forms `js` and `c++`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "java" => Some(Self::Java),
            "javascript" | "js" => Some(Self::JavaScript),
            "cpp" | "c++" => Some(Self::Cpp),
            _ => None,
        }
    }

    /// Default output directory, relative to the working directory.
    #[must_use]
    pub fn default_output_root(&self) -> String {
        format!("generated/{}", self.as_str())
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    #[test_case("java", Some(TargetId::Java))]
    #[test_case("javascript", Some(TargetId::JavaScript))]
    #[test_case("js", Some(TargetId::JavaScript))]
    #[test_case("cpp", Some(TargetId::Cpp))]
    #[test_case("C++", Some(TargetId::Cpp))]
    #[test_case(" Java ", Some(TargetId::Java))]
    #[test_case("kotlin", None)]
    #[test_case("", None)]
    fn TargetId___parse___recognizes_keys_and_aliases(input: &str, expected: Option<TargetId>) {
        assert_eq!(TargetId::parse(input), expected);
    }

    #[test]
    fn TargetId___as_str___roundtrips_through_parse() {
        for target in TargetId::ALL {
            assert_eq!(TargetId::parse(target.as_str()), Some(target));
        }
    }

    #[test]
    fn TargetId___default_output_root___uses_key() {
        assert_eq!(TargetId::Cpp.default_output_root(), "generated/cpp");
    }

    #[test]
    fn TargetId___serde___uses_lowercase_keys() {
        let json = serde_json::to_string(&TargetId::JavaScript).unwrap();

        assert_eq!(json, "\"javascript\"");
    }
}
