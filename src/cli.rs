//! Minimal CLI: check program files against the grammar, or print the grammar.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use tactile_syntax::grammar::{self, Rule};
use tactile_syntax::load::{self, Manifest};
use tactile_syntax::{ValidationResult, ValidatorOptions};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate tactile programs (JSON) against the language grammar
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate one or more program files
    Check(CheckOut),
    /// print the grammar table
    Grammar,
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the program in each document (e.g. /data/program)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct LibrarySettings {
    /// external library program, as NAME=PATH (repeatable)
    #[arg(long = "library", value_name = "NAME=PATH")]
    library: Vec<String>,

    /// JSON manifest mapping library names to program files
    #[arg(long = "libraries", value_name = "MANIFEST.json")]
    manifest: Option<PathBuf>,

    /// syntax-check libraries too instead of trusting them
    #[arg(long)]
    check_libraries: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    library_settings: LibrarySettings,

    /// deepest nesting accepted before reporting `too-deep`
    #[arg(long, default_value_t = tactile_syntax::engine::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    file: PathBuf,
    #[serde(flatten)]
    result: ValidationResult,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn resolve(&self) -> anyhow::Result<Vec<PathBuf>> {
        resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")
    }
}

impl LibrarySettings {
    fn manifest(&self) -> anyhow::Result<Manifest> {
        let mut manifest = match self.manifest.as_ref() {
            Some(path) => load::load_manifest(path)
                .with_context(|| format!("failed to load library manifest {}", path.display()))?,
            None => Manifest::new(),
        };
        for spec in &self.library {
            let (name, path) = load::parse_library_spec(spec)?;
            manifest.insert(name, path);
        }
        Ok(manifest)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS)
                }

                // 1) load libraries once, shared by every input
                let manifest = target.library_settings.manifest()?;
                let libraries = load::load_libraries(&manifest).context("failed to load libraries")?;
                let libraries = (!libraries.is_empty()).then_some(&libraries);

                // 2) validate inputs in parallel; order of the report follows the inputs
                let options = ValidatorOptions {
                    max_depth: target.max_depth,
                    check_libraries: target.library_settings.check_libraries,
                };
                let pointer = target.input_settings.json_pointer.as_deref();
                let paths = target.input_settings.resolve()?;
                tracing::debug!(files = paths.len(), libraries = manifest.len(), "checking");
                let reports = paths
                    .par_iter()
                    .map(|path| -> anyhow::Result<FileReport> {
                        let program = load::load_program(path, pointer)?;
                        let result = tactile_syntax::validate_with(&program, libraries, &options);
                        Ok(FileReport { file: path.clone(), result })
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;

                // 3) report
                let rendered = match target.format {
                    Format::Json => serde_json::to_string_pretty(&reports)?,
                    Format::Text => render_text(&reports, target.out.is_none()),
                };
                write_output(target.out.as_deref(), &rendered)?;

                let all_valid = reports.iter().all(|report| report.result.is_valid);
                Ok(if all_valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Grammar => {
                println!("{}", render_grammar());
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn render_text(reports: &[FileReport], colour: bool) -> String {
    let mut out = String::new();
    for report in reports {
        let file = report.file.display();
        let line = match (report.result.is_valid, colour) {
            (true, true) => format!("{} {file}", "✔".green()),
            (true, false) => format!("✔ {file}"),
            (false, true) => format!("{} {file}: {}", "✘".red(), report.result.to_string().yellow()),
            (false, false) => format!("✘ {file}: {}", report.result),
        };
        out.push_str(&line);
        out.push('\n');
    }
    let failed = reports.iter().filter(|report| !report.result.is_valid).count();
    out.push_str(&format!("{} checked, {failed} invalid", reports.len()));
    out
}

fn render_grammar() -> String {
    let mut out = String::new();
    for (name, rule) in grammar::rules() {
        let marker = if grammar::is_variable_type(name) { " (variable)" } else { "" };
        out.push_str(&format!("{}{marker} : {}\n", name.bold(), rule.kind()));
        match rule {
            Rule::Primitive { pattern, .. } => out.push_str(&format!("    /{pattern}/\n")),
            Rule::Object(fields) => {
                for field in fields {
                    let ty = if field.is_list { format!("[{}]", field.expected_type) } else { field.expected_type.to_string() };
                    out.push_str(&format!("    {}: {ty}\n", field.key));
                }
            }
            Rule::Multitype(tags) => out.push_str(&format!("    one of {}\n", tags.join(" | "))),
        }
    }
    out
}

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{contents}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched: Vec<PathBuf> = glob::glob(pattern)?.collect::<Result<_, _>>()?;
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
            out.append(&mut matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
