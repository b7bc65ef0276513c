//! Caller-side loading: program files, library manifests and fixtures.
//!
//! Nothing here is part of validation itself; the engine only ever sees
//! already-parsed [`serde_json::Value`]s.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Libraries, ValidationResult};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse JSON in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{path}: at JSON path {at} → {message}")]
    Shape { path: PathBuf, at: String, message: String },
    #[error("JSON pointer {pointer:?} selects nothing in {path}")]
    Pointer { path: PathBuf, pointer: String },
    #[error("library spec {0:?} is not of the form NAME=PATH")]
    LibrarySpec(String),
}

/// A library manifest: `{"name": "path/to/program.json", ...}`. Relative
/// paths resolve against the manifest's directory.
pub type Manifest = IndexMap<String, PathBuf>;

/// One conformance case: an input, optional libraries and the exact verdict.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub description: String,
    pub input: Value,
    #[serde(default)]
    pub libraries: Option<Libraries>,
    pub expect: ValidationResult,
}

pub fn read_json(path: &Path) -> Result<Value, LoadError> {
    let source = read(path)?;
    serde_json::from_str(&source).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })
}

/// Load `path`, optionally narrowing to the subnode at `pointer`.
pub fn load_program(path: &Path, pointer: Option<&str>) -> Result<Value, LoadError> {
    let mut value = read_json(path)?;
    match pointer {
        None => Ok(value),
        Some(pointer) => value
            .pointer_mut(pointer)
            .map(Value::take)
            .ok_or_else(|| LoadError::Pointer { path: path.to_path_buf(), pointer: pointer.to_string() }),
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    let mut manifest: Manifest = from_file_with_path(path)?;
    let base = path.parent().unwrap_or(Path::new(""));
    for target in manifest.values_mut() {
        if target.is_relative() {
            *target = base.join(&*target);
        }
    }
    Ok(manifest)
}

/// Parse `NAME=PATH`.
pub fn parse_library_spec(spec: &str) -> Result<(String, PathBuf), LoadError> {
    match spec.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(LoadError::LibrarySpec(spec.to_string())),
    }
}

/// Read every library in `manifest`, keeping manifest order.
pub fn load_libraries(manifest: &Manifest) -> Result<Libraries, LoadError> {
    manifest
        .iter()
        .map(|(name, path)| -> Result<(String, Value), LoadError> { Ok((name.clone(), read_json(path)?)) })
        .collect()
}

pub fn load_fixture(path: &Path) -> Result<Fixture, LoadError> {
    from_file_with_path(path)
}

// ------------------------------- Helpers --------------------------------- //

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read { path: path.to_path_buf(), source })
}

/// Deserialize with JSON-path context in error messages.
fn from_file_with_path<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let source = read(path)?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| LoadError::Shape {
        path: path.to_path_buf(),
        at: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
