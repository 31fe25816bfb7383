//! Passes command implementation
//!
//! Lists the registered validation passes.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use meshgate_lint::{FindingKind, PassRegistry};

/// Run the passes command.
pub fn run(json: bool) -> Result<ExitCode> {
    let registry = PassRegistry::default_passes();
    let metadata = registry.metadata();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&metadata).context("Failed to serialize pass list")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} ({})", "Validation passes".cyan().bold(), metadata.len());
    for pass in &metadata {
        println!(
            "  {:<12} {:<15} {}",
            pass.id.bold(),
            kind_label(pass.kind).dimmed(),
            pass.description
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn kind_label(kind: FindingKind) -> &'static str {
    match kind {
        FindingKind::Structural => "structural",
        FindingKind::Layout => "layout",
        FindingKind::Policy => "policy",
        FindingKind::Reconciliation => "reconciliation",
    }
}
