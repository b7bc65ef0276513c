//! Verdicts: the public [`ValidationResult`] and the engine-internal [`Invalid`].
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grammar::ROOT_TYPE;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// Input was not a structured value at all (produced by [`crate::validate`]).
    InvalidInput,
    InvalidPrimitive,
    InvalidList,
    MissingKey,
    ExtraKey,
    TypeNotAllowed,
    /// Nesting exceeded [`crate::ValidatorOptions::max_depth`].
    TooDeep,
}

/// Failure travelling up the recursion. Segments are pushed to the front as
/// each level unwinds, so the root segment ends up first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} at [{}]", join_path(.path))]
pub struct Invalid {
    pub code: ErrorCode,
    pub path: VecDeque<String>,
}

pub type Verdict = Result<(), Invalid>;

/// Outcome of one validation call.
///
/// Serializes as `{isValid, errorCode, errorPath}`; `errorCode` is `""` and
/// `errorPath` is `[]` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(with = "code_or_empty")]
    pub error_code: Option<ErrorCode>,
    pub error_path: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "invalid-input",
            ErrorCode::InvalidPrimitive => "invalid-primitive",
            ErrorCode::InvalidList => "invalid-list",
            ErrorCode::MissingKey => "missing-key",
            ErrorCode::ExtraKey => "extra-key",
            ErrorCode::TypeNotAllowed => "type-not-allowed",
            ErrorCode::TooDeep => "too-deep",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Invalid {
    pub fn new(code: ErrorCode) -> Self {
        Self { code, path: VecDeque::new() }
    }

    pub fn within(mut self, segment: impl Into<String>) -> Self {
        self.path.push_front(segment.into());
        self
    }
}

/// Path accumulation for fallible steps: a no-op on success.
pub trait WithinExt {
    fn within(self, key: &str) -> Self;
    fn within_index(self, key: &str, index: usize) -> Self;
}

impl<T> WithinExt for Result<T, Invalid> {
    fn within(self, key: &str) -> Self {
        self.map_err(|invalid| invalid.within(key))
    }
    fn within_index(self, key: &str, index: usize) -> Self {
        self.map_err(|invalid| invalid.within(index.to_string()).within(key))
    }
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, error_code: None, error_path: Vec::new() }
    }

    pub fn invalid(code: ErrorCode, path: Vec<String>) -> Self {
        Self { is_valid: false, error_code: Some(code), error_path: path }
    }

    /// Prepend `segments` to a failing path; successes pass through.
    pub fn nested<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.is_valid {
            let mut path: Vec<String> = segments.into_iter().map(Into::into).collect();
            path.append(&mut self.error_path);
            self.error_path = path;
        }
        self
    }

    /// Follow `error_path` from `root`, which is the validated program.
    ///
    /// The leading `"program"` segment names the root itself. Paths that do
    /// not start there (e.g. library failures) yield `None`.
    pub fn locate<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let (first, rest) = self.error_path.split_first()?;
        if first != ROOT_TYPE {
            return None;
        }
        rest.iter().try_fold(root, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl From<Verdict> for ValidationResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Ok(()) => Self::valid(),
            Err(Invalid { code, path }) => Self::invalid(code, path.into()),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_code {
            None if self.is_valid => f.write_str("valid"),
            None => write!(f, "invalid at [{}]", self.error_path.join(", ")),
            Some(code) => write!(f, "{code} at [{}]", self.error_path.join(", ")),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn join_path(path: &VecDeque<String>) -> String {
    path.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

mod code_or_empty {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ErrorCode;

    pub fn serialize<S: Serializer>(code: &Option<ErrorCode>, serializer: S) -> Result<S::Ok, S::Error> {
        match code {
            Some(code) => code.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ErrorCode>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        ErrorCode::deserialize(serde::de::value::StrDeserializer::<D::Error>::new(&raw)).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_with_empty_code_and_path() {
        let out = serde_json::to_value(ValidationResult::valid()).unwrap();
        assert_eq!(out, json!({"isValid": true, "errorCode": "", "errorPath": []}));
    }

    #[test]
    fn failure_round_trips_through_wire_shape() {
        let wire = json!({
            "isValid": false,
            "errorCode": "missing-key",
            "errorPath": ["program", "functions", "0", "function"],
        });
        let parsed: ValidationResult = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(parsed.error_code, Some(ErrorCode::MissingKey));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), wire);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let wire = json!({"isValid": false, "errorCode": "nope", "errorPath": []});
        assert!(serde_json::from_value::<ValidationResult>(wire).is_err());
    }

    #[test]
    fn within_prepends_only_on_failure() {
        let ok: Verdict = Ok(());
        assert_eq!(ok.within("x"), Ok(()));

        let failed: Verdict = Err(Invalid::new(ErrorCode::ExtraKey));
        let failed = failed.within_index("functions", 2).within("program");
        let invalid = failed.unwrap_err();
        assert_eq!(Vec::from(invalid.path), ["program", "functions", "2"]);
    }

    #[test]
    fn nested_leaves_success_untouched() {
        assert_eq!(ValidationResult::valid().nested(["libraries", "x"]), ValidationResult::valid());
        let failed = ValidationResult::invalid(ErrorCode::ExtraKey, vec!["program".into()])
            .nested(["libraries", "x"]);
        assert_eq!(failed.error_path, ["libraries", "x", "program"]);
    }

    #[test]
    fn locate_walks_keys_and_indices() {
        let root = json!({"functions": [{"id": "f", "function": {"name": 3}}]});
        let result = ValidationResult::invalid(
            ErrorCode::InvalidPrimitive,
            vec!["program".into(), "functions".into(), "0".into(), "function".into(), "name".into()],
        );
        assert_eq!(result.locate(&root), Some(&json!(3)));

        let elsewhere = ValidationResult::invalid(ErrorCode::ExtraKey, vec!["libraries".into()]);
        assert_eq!(elsewhere.locate(&root), None);
    }

    #[test]
    fn display_names_code_and_path() {
        let result = ValidationResult::invalid(ErrorCode::TypeNotAllowed, vec!["program".into(), "x".into()]);
        assert_eq!(result.to_string(), "type-not-allowed at [program, x]");
        assert_eq!(ValidationResult::valid().to_string(), "valid");
    }
}
