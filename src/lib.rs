//! Syntax validation for tactile programs.
//!
//! A program is an arbitrary JSON tree; [`validate`] checks it against the
//! grammar in [`grammar`] and reports at most one failure as a
//! [`ValidationResult`] with the path to the offending node.
//!
//! ```
//! use serde_json::json;
//!
//! let result = tactile_syntax::validate(&json!({"functions": []}), None);
//! assert!(result.is_valid);
//! ```
pub mod engine;
pub mod grammar;
pub mod load;
pub mod node;
pub mod result;

use indexmap::IndexMap;
use serde_json::Value;

pub use engine::{validate_syntax, validate_syntax_with, validate_token, ValidatorOptions};
pub use result::{ErrorCode, ValidationResult};

/// External programs by library name, each `program`-shaped.
pub type Libraries = IndexMap<String, Value>;

pub fn validate(input: &Value, libraries: Option<&Libraries>) -> ValidationResult {
    validate_with(input, libraries, &ValidatorOptions::default())
}

/// Only objects and arrays reach the engine; scalars are `invalid-input`.
///
/// Libraries are taken as already validated. With
/// [`ValidatorOptions::check_libraries`] they are syntax-checked first, in
/// order, and their failures are reported under `["libraries", name, ..]`.
/// Resolving names across programs is not done here.
pub fn validate_with(input: &Value, libraries: Option<&Libraries>, options: &ValidatorOptions) -> ValidationResult {
    if !matches!(input, Value::Object(_) | Value::Array(_)) {
        tracing::debug!("input is not a structured value");
        return ValidationResult::invalid(ErrorCode::InvalidInput, Vec::new());
    }

    let checked = libraries.filter(|_| options.check_libraries);
    for (name, library) in checked.into_iter().flatten() {
        let result = validate_syntax_with(library, options);
        if !result.is_valid {
            tracing::debug!(library = %name, %result, "library failed validation");
            return result.nested(["libraries", name.as_str()]);
        }
    }

    let result = validate_syntax_with(input, options);
    tracing::debug!(
        libraries = libraries.map_or(0, IndexMap::len),
        %result,
        "validated program"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn program() -> Value {
        json!({"functions": [{"id": "f", "function": {
            "name": "f",
            "description": "",
            "domainParams": [],
            "valueParams": [],
            "domain": {"discriminator": "domain-literal", "payload": "integer"},
            "body": {"discriminator": "integer-literal", "payload": "1"},
        }}]})
    }

    #[test]
    fn scalar_input_is_invalid_input() {
        for input in [json!("{\"functions\": []}"), json!(3), json!(null), json!(true)] {
            let result = validate(&input, None);
            assert_eq!(result, ValidationResult::invalid(ErrorCode::InvalidInput, vec![]));
        }
    }

    #[test]
    fn arrays_reach_the_engine() {
        let result = validate(&json!([]), None);
        assert_eq!(result.error_code, Some(ErrorCode::MissingKey));
        assert_eq!(result.error_path, ["program"]);
    }

    #[test]
    fn valid_program_with_libraries() {
        let mut libraries = Libraries::new();
        libraries.insert("mylib".into(), program());
        assert_eq!(validate(&program(), Some(&libraries)), ValidationResult::valid());
    }

    fn broken_libraries() -> Libraries {
        let mut libraries = Libraries::new();
        libraries.insert("good".into(), program());
        libraries.insert("bad".into(), json!({"functions": "none"}));
        libraries
    }

    #[test]
    fn libraries_are_trusted_by_default() {
        let libraries = broken_libraries();
        assert_eq!(validate(&json!({"functions": []}), Some(&libraries)), ValidationResult::valid());
        assert_eq!(validate(&program(), Some(&libraries)), ValidationResult::valid());
    }

    #[test]
    fn checked_library_is_reported_under_its_name() {
        let options = ValidatorOptions { check_libraries: true, ..ValidatorOptions::default() };
        let result = validate_with(&program(), Some(&broken_libraries()), &options);
        assert_eq!(result.error_code, Some(ErrorCode::InvalidList));
        assert_eq!(result.error_path, ["libraries", "bad", "program", "functions"]);
    }
}
