//! Runs every fixture under `fixtures/` (or the globs given as arguments) and
//! prints a pass/fail line per case.
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use tactile_syntax::load::load_fixture;
use tactile_syntax::validate;

fn default_patterns() -> Vec<String> {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures");
    ["valid", "invalid"]
        .iter()
        .map(|group| root.join(group).join("*.json").to_string_lossy().to_string())
        .collect()
}

fn collect_paths(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for pattern in patterns {
        for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
            out.push(entry?);
        }
    }
    out.sort();
    Ok(out)
}

fn run() -> Result<bool> {
    let mut patterns: Vec<String> = std::env::args().skip(1).collect();
    if patterns.is_empty() {
        patterns = default_patterns();
    }

    let mut failed = 0usize;
    let paths = collect_paths(&patterns)?;
    for path in &paths {
        let fixture = load_fixture(path)?;
        let actual = validate(&fixture.input, fixture.libraries.as_ref());
        if actual == fixture.expect {
            eprintln!("{} {}", "✅".green(), path.display());
        } else {
            failed += 1;
            eprintln!("{} {} — {}", "❌".red(), path.display(), fixture.description);
            eprintln!("    expected: {}", serde_json::to_string(&fixture.expect)?);
            eprintln!("    actual:   {}", serde_json::to_string(&actual)?);
        }
    }
    eprintln!("—— {} fixtures, {failed} failed ——", paths.len());
    Ok(failed == 0)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
