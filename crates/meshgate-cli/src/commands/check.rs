//! Check command implementation
//!
//! Loads each document, runs the validation passes, applies fixes in fix
//! mode and writes the corrected document back.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use meshgate_lint::{
    is_supported, run as run_session, AssetSource, FixRecord, FixSummary, LoadedAsset, Protections,
    ValidationReport, ValidatorConfig,
};
use meshgate_model::Document;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::reporting::{
    print_findings, print_fixes, print_protections, print_uv_priority, stats_line,
};
use super::{EXIT_LOAD_FAILURE, EXIT_VALIDATION_FAILURE};

/// Command-line options for `meshgate check`.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub fix: bool,
    pub json: bool,
    pub config: Option<String>,
    pub disable_passes: Vec<String>,
    /// Comma-separated pass IDs.
    pub only_passes: Option<String>,
    pub no_uv_policy: bool,
}

/// JSON output for the check command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    /// True if every file loaded and had no errors.
    pub success: bool,
    pub files: Vec<FileOutput>,
}

/// Result of checking one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutput {
    pub path: String,
    /// True if the file loaded and the pre-fix document had no errors.
    pub passed: bool,
    /// Set when the file could not be read or parsed; no passes ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protections: Option<Protections>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_summary: Option<FixSummary>,
    /// Set when the fixer failed. Does not change `passed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_error: Option<String>,
    /// True if fixes were written back to `path`.
    pub saved: bool,
    /// Set when writing fixes back failed. Does not change `passed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
}

impl FileOutput {
    fn load_failure(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            passed: false,
            load_error: Some(error),
            report: None,
            protections: None,
            fix_summary: None,
            fix_error: None,
            saved: false,
            save_error: None,
        }
    }
}

/// Builds the validator config from an optional file plus flags.
pub fn build_config(options: &CheckOptions) -> Result<ValidatorConfig> {
    let mut config = match &options.config {
        Some(path) => ValidatorConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => ValidatorConfig::default(),
    };

    config.fix |= options.fix;
    config
        .disabled_passes
        .extend(options.disable_passes.iter().cloned());
    if let Some(only) = &options.only_passes {
        config.only_passes = Some(
            only.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        );
    }
    if options.no_uv_policy {
        config.require_texcoord0 = false;
    }
    Ok(config)
}

/// Expands directories into the `.gltf`/`.glb` files below them, sorted.
///
/// Explicit file arguments are kept as given, even with an unknown
/// extension, so the loader can report them.
pub fn collect_inputs(paths: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for path in paths {
        let path = Path::new(path);
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry =
                    entry.with_context(|| format!("Failed to scan directory: {}", path.display()))?;
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            debug!(dir = %path.display(), files = found.len(), "scanned directory");
            inputs.extend(found);
        } else {
            inputs.push(path.to_path_buf());
        }
    }
    Ok(inputs)
}

/// Checks one file: load, validate, fix and write back.
pub fn check_file(path: &Path, config: &ValidatorConfig) -> FileOutput {
    match LoadedAsset::load(path) {
        Ok(asset) => {
            let (source, document) = asset.into_parts();
            check_loaded(&source, document, config)
        }
        Err(e) => FileOutput::load_failure(path, e.to_string()),
    }
}

/// Validates an already-loaded document and writes any fixes back to
/// `source`.
pub fn check_loaded(source: &AssetSource, document: Document, config: &ValidatorConfig) -> FileOutput {
    let path = source.path.as_path();
    let outcome = match run_session(document, Box::new(source.resolver()), config.clone()) {
        Ok(outcome) => outcome,
        Err(e) => return FileOutput::load_failure(path, e.to_string()),
    };

    if let Some(e) = &outcome.fix_error {
        warn!(path = %path.display(), error = %e, "could not apply fixes");
    }

    let (saved, save_error) = if outcome.document_modified {
        match source.save(&outcome.document) {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not write fixes");
                (false, Some(e.to_string()))
            }
        }
    } else {
        (false, None)
    };

    let passed = outcome.passed();
    let fix_summary = match outcome.fix_summary {
        Some(summary) => Some(summary),
        None if config.fix => manual_only_summary(&outcome.report),
        None => None,
    };

    FileOutput {
        path: path.display().to_string(),
        passed,
        load_error: None,
        protections: Some(outcome.report.protections()),
        report: Some(outcome.report),
        fix_summary,
        fix_error: outcome.fix_error.map(|e| e.to_string()),
        saved,
        save_error,
    }
}

/// Fix-mode summary for a run where nothing was auto-fixable, so the
/// manual records still get listed.
fn manual_only_summary(report: &ValidationReport) -> Option<FixSummary> {
    let manual: Vec<FixRecord> = report
        .fixes
        .iter()
        .filter(|f| !f.kind.is_auto_fixable())
        .cloned()
        .collect();
    if manual.is_empty() {
        return None;
    }
    Some(FixSummary {
        manual,
        ..FixSummary::default()
    })
}

/// Run the check command.
///
/// # Returns
/// Exit code: 0 if every file passed, 1 if any had errors, 2 if any failed
/// to load.
pub fn run(paths: &[String], options: &CheckOptions) -> Result<ExitCode> {
    let config = build_config(options)?;
    let inputs = collect_inputs(paths)?;

    if inputs.is_empty() {
        anyhow::bail!("no .gltf or .glb files found in: {}", paths.join(", "));
    }

    let files: Vec<FileOutput> = inputs
        .iter()
        .map(|path| check_file(path, &config))
        .collect();

    if options.json {
        let output = CheckOutput {
            success: files.iter().all(|f| f.passed),
            files,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize report")?
        );
        return Ok(exit_code(&output.files));
    }

    for file in &files {
        print_text_output(file);
    }
    if files.len() > 1 {
        let passed = files.iter().filter(|f| f.passed).count();
        println!(
            "\n{} {}/{} file(s) passed",
            "Total:".bold(),
            passed,
            files.len()
        );
    }
    Ok(exit_code(&files))
}

fn exit_code(files: &[FileOutput]) -> ExitCode {
    ExitCode::from(exit_status(files))
}

/// Process exit status for a set of checked files.
pub fn exit_status(files: &[FileOutput]) -> u8 {
    if files.iter().any(|f| f.load_error.is_some()) {
        EXIT_LOAD_FAILURE
    } else if files.iter().all(|f| f.passed) {
        0
    } else {
        EXIT_VALIDATION_FAILURE
    }
}

/// Print one file's results in human-readable text format.
fn print_text_output(file: &FileOutput) {
    println!("{} {}", "Checking:".cyan().bold(), file.path);

    if let Some(error) = &file.load_error {
        println!("\n{} {}", "LOAD FAILED".red().bold(), error);
        return;
    }
    let Some(report) = &file.report else {
        return;
    };

    println!("  {}", stats_line(&report.stats).dimmed());
    print_findings(report);
    if let Some(summary) = &file.fix_summary {
        print_fixes(summary);
    }
    if let Some(error) = &file.fix_error {
        println!(
            "\n{}: could not apply fixes: {}",
            "warning".yellow().bold(),
            error
        );
    }
    if file.saved {
        println!("  {} wrote {}", "->".dimmed(), file.path);
    }
    if let Some(error) = &file.save_error {
        println!(
            "\n{}: could not write fixes: {}",
            "warning".yellow().bold(),
            error
        );
    }

    let summary = format!(
        "{} error(s), {} warning(s), {} info",
        report.summary.error_count, report.summary.warning_count, report.summary.info_count
    );
    if report.ok {
        if let Some(protections) = &file.protections {
            print_protections(protections);
        }
        println!("\n{} {}", "PASSED".green().bold(), summary.dimmed());
    } else {
        print_uv_priority(report);
        println!("\n{} {}", "FAILED".red().bold(), summary.dimmed());
    }
}
