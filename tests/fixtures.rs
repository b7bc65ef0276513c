//! Runs the conformance corpus under `fixtures/`.
use std::path::{Path, PathBuf};

use tactile_syntax::load::load_fixture;
use tactile_syntax::{validate, validate_with, ValidationResult, ValidatorOptions};

// =============================================================================
// Helpers
// =============================================================================

fn fixture_paths(group: &str) -> Vec<PathBuf> {
    let pattern = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(group)
        .join("*.json");
    let paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .collect::<Result<_, _>>()
        .expect("readable fixture directory");
    assert!(!paths.is_empty(), "no fixtures under {group}");
    paths
}

fn run_group(group: &str) {
    for path in fixture_paths(group) {
        let fixture = load_fixture(&path).unwrap_or_else(|error| panic!("{error}"));
        let actual = validate(&fixture.input, fixture.libraries.as_ref());
        assert_eq!(
            actual,
            fixture.expect,
            "{} ({})",
            path.display(),
            fixture.description
        );
        if !actual.is_valid && actual.error_path.first().map(String::as_str) == Some("program") {
            assert!(
                actual.locate(&fixture.input).is_some(),
                "{}: error path does not resolve",
                path.display()
            );
        }
    }
}

// =============================================================================
// Corpus
// =============================================================================

#[test]
fn valid_fixtures_pass() {
    run_group("valid");
}

#[test]
fn invalid_fixtures_report_expected_error() {
    run_group("invalid");
}

#[test]
fn valid_fixtures_stay_valid_as_libraries() {
    let mut libraries = tactile_syntax::Libraries::new();
    for path in fixture_paths("valid") {
        let fixture = load_fixture(&path).unwrap();
        let name = path.file_stem().unwrap().to_string_lossy().to_string();
        libraries.insert(name, fixture.input);
    }
    let program = serde_json::json!({"functions": []});
    let options = ValidatorOptions { check_libraries: true, ..ValidatorOptions::default() };
    assert_eq!(validate_with(&program, Some(&libraries), &options), ValidationResult::valid());
}
