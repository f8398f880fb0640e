//! Version resolution
//!
//! Extracts a dotted numeric version from a file name with a configurable
//! pattern and turns it into a [`VersionTuple`] that orders numerically:
//! `1.10.0` is newer than `1.2.3`.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::fmt;

use crate::core::error::ConfigError;

/// Pattern used when none is configured. Matches the first numeric run
/// following `qc`, either plain (`123`) or dotted (`1.2.3`).
pub const DEFAULT_VERSION_PATTERN: &str = r"qc.*?(\d+(?:\.\d+)*)";

static DEFAULT_PATTERN: Lazy<VersionPattern> = Lazy::new(|| {
    VersionPattern::new(DEFAULT_VERSION_PATTERN).expect("Invalid DEFAULT_VERSION_PATTERN regex")
});

/// An ordered sequence of non-negative integers.
///
/// Ordering is lexicographic, component by component. A strict prefix is
/// smaller than the longer tuple (`(1,2) < (1,2,0)`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionTuple(Vec<u64>);

impl VersionTuple {
    /// Parse a dot separated numeric string. Any empty or non-numeric
    /// component rejects the whole string.
    pub fn parse(s: &str) -> Option<Self> {
        let components = s
            .split('.')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;

        Some(Self(components))
    }
}

impl From<Vec<u64>> for VersionTuple {
    fn from(components: Vec<u64>) -> Self {
        Self(components)
    }
}

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl Serialize for VersionTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A compiled, case-insensitive version pattern with exactly one capture group.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    source: String,
    regex: Regex,
}

impl VersionPattern {
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(ConfigError::CaptureGroups {
                pattern: pattern.to_string(),
                found: groups,
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    #[allow(dead_code)]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Resolve the version embedded in `file_name`, if any.
    pub fn resolve(&self, file_name: &str) -> Option<VersionTuple> {
        let captured = self.regex.captures(file_name)?.get(1)?;
        VersionTuple::parse(captured.as_str())
    }
}

impl Default for VersionPattern {
    fn default() -> Self {
        DEFAULT_PATTERN.clone()
    }
}

impl fmt::Display for VersionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Free-function form of [`VersionPattern::resolve`].
#[allow(dead_code)]
pub fn resolve(file_name: &str, pattern: &VersionPattern) -> Option<VersionTuple> {
    pattern.resolve(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(components: &[u64]) -> VersionTuple {
        VersionTuple::from(components.to_vec())
    }

    #[rstest]
    #[case("1.2.3", Some(vec![1, 2, 3]))]
    #[case("456", Some(vec![456]))]
    #[case("01.002", Some(vec![1, 2]))] // leading zeros are plain integers
    #[case("1..2", None)] // empty component
    #[case("1.2.", None)]
    #[case("", None)]
    #[case("1.a", None)]
    fn test_version_tuple_parse(#[case] input: &str, #[case] expected: Option<Vec<u64>>) {
        assert_eq!(VersionTuple::parse(input), expected.map(VersionTuple::from));
    }

    #[rstest]
    #[case("qc_app1.2.3.apk", Some(vec![1, 2, 3]))]
    #[case("qc_app1.10.0.apk", Some(vec![1, 10, 0]))]
    #[case("QC_App_456.APK", Some(vec![456]))] // case-insensitive
    #[case("my_qc_build_7.apk", Some(vec![7]))]
    #[case("qc_app_beta.apk", None)] // no numeric run after qc
    #[case("app1.2.3.apk", None)] // no qc marker
    fn test_resolve_default_pattern(#[case] name: &str, #[case] expected: Option<Vec<u64>>) {
        let pattern = VersionPattern::default();
        assert_eq!(resolve(name, &pattern), expected.map(VersionTuple::from));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let pattern = VersionPattern::default();
        let first = pattern.resolve("qc_app2.0.1.apk");
        let second = pattern.resolve("qc_app2.0.1.apk");
        assert_eq!(first, second);
        assert_eq!(first, Some(v(&[2, 0, 1])));
    }

    #[test]
    fn test_resolve_custom_pattern() {
        let pattern = VersionPattern::new(r"_v(\d+(?:\.\d+)*)\.apk$").unwrap();
        assert_eq!(pattern.resolve("qc_tool_v3.1.apk"), Some(v(&[3, 1])));
        assert_eq!(pattern.resolve("qc_tool.apk"), None);
    }

    #[test]
    fn test_resolve_optional_group_not_participating() {
        let pattern = VersionPattern::new(r"qc(?:_(\d+))?").unwrap();
        assert_eq!(pattern.resolve("qc.apk"), None);
        assert_eq!(pattern.resolve("qc_12.apk"), Some(v(&[12])));
    }

    #[test]
    fn test_resolve_overflowing_component_is_rejected() {
        let pattern = VersionPattern::default();
        assert_eq!(pattern.resolve("qc_99999999999999999999999.apk"), None);
    }

    #[test]
    fn test_ordering_is_numeric_not_textual() {
        assert!(v(&[1, 10, 0]) > v(&[1, 2, 3]));
        assert!(v(&[2]) > v(&[1, 99, 99]));
    }

    #[test]
    fn test_ordering_prefix_is_smaller() {
        assert!(v(&[1, 2]) < v(&[1, 2, 0]));
        assert!(v(&[1, 3]) > v(&[1, 2, 9]));
        assert_eq!(v(&[1, 2]), v(&[1, 2]));
    }

    #[test]
    fn test_ordering_is_transitive() {
        let a = v(&[1, 0]);
        let b = v(&[1, 0, 5]);
        let c = v(&[1, 1]);
        assert!(a < b && b < c);
        assert!(a < c);
    }

    #[test]
    fn test_display() {
        assert_eq!(v(&[1, 10, 0]).to_string(), "1.10.0");
        assert_eq!(v(&[456]).to_string(), "456");
    }

    #[test]
    fn test_serialize_as_array() {
        let json = serde_json::to_string(&v(&[1, 2, 3])).unwrap();
        assert_eq!(json, "[1,2,3]");
    }

    #[test]
    fn test_pattern_rejects_zero_groups() {
        let err = VersionPattern::new(r"qc\d+").unwrap_err();
        assert!(matches!(err, ConfigError::CaptureGroups { found: 0, .. }));
    }

    #[test]
    fn test_pattern_rejects_two_groups() {
        let err = VersionPattern::new(r"(qc)(\d+)").unwrap_err();
        assert!(matches!(err, ConfigError::CaptureGroups { found: 2, .. }));
    }

    #[test]
    fn test_pattern_rejects_invalid_regex() {
        let err = VersionPattern::new(r"qc(\d+").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_default_pattern_source() {
        assert_eq!(VersionPattern::default().as_str(), DEFAULT_VERSION_PATTERN);
    }
}
