//! Colored text rendering of validation reports.

use colored::{ColoredString, Colorize};
use meshgate_lint::{Finding, FixSummary, Protections, ValidationReport};
use meshgate_model::DocumentStats;

/// Print a single finding.
pub(crate) fn print_finding(finding: &Finding, marker: ColoredString) {
    let location = finding
        .location
        .as_ref()
        .map(|l| format!(" at {}", l))
        .unwrap_or_default();

    println!(
        "  {} [{}]{}: {}",
        marker,
        finding.rule_id.cyan(),
        location.dimmed(),
        finding.message
    );

    if let Some(actual) = &finding.actual_value {
        if let Some(expected) = &finding.expected_range {
            println!(
                "    {} actual={}, expected={}",
                "->".dimmed(),
                actual,
                expected
            );
        } else {
            println!("    {} actual={}", "->".dimmed(), actual);
        }
    }

    if let Some(suggestion) = &finding.suggestion {
        println!("    {} {}", "suggestion:".dimmed(), suggestion);
    }
}

pub(crate) fn print_findings(report: &ValidationReport) {
    if !report.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for finding in &report.errors {
            print_finding(finding, "x".red());
        }
    }

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for finding in &report.warnings {
            print_finding(finding, "!".yellow());
        }
    }

    if !report.info.is_empty() {
        println!("\n{}", "Info:".blue().bold());
        for finding in &report.info {
            print_finding(finding, "i".blue());
        }
    }
}

/// UV errors are the most common rejection cause, so they get called out
/// ahead of the summary.
pub(crate) fn print_uv_priority(report: &ValidationReport) {
    let uv_errors: Vec<_> = report.uv_errors().collect();
    if uv_errors.is_empty() {
        return;
    }
    println!(
        "\n{} {} UV error(s) - fix these first:",
        "CRITICAL".red().bold(),
        uv_errors.len()
    );
    for finding in uv_errors {
        println!("  {} {}", "*".red(), finding.message);
    }
    println!(
        "  {} re-export with UVs or unwrap the meshes in the authoring tool",
        "->".dimmed()
    );
}

pub(crate) fn print_protections(protections: &Protections) {
    println!("\n{}", "Protections:".green().bold());
    for (active, label) in [
        (protections.uv_coverage_complete, "UV coverage complete"),
        (protections.layout_clean, "Accessor/bufferView alignment clean"),
        (protections.structure_intact, "No structural corruption"),
    ] {
        if active {
            println!("  {} {}", "+".green(), label);
        } else {
            println!("  {} {}", "-".dimmed(), label.dimmed());
        }
    }
}

pub(crate) fn print_fixes(summary: &FixSummary) {
    if summary.applied.is_empty() && summary.manual.is_empty() {
        return;
    }
    println!("\n{}", "Fixes:".cyan().bold());
    for fix in &summary.applied {
        println!("  {} {}", "+".green(), fix.message);
    }
    for fix in &summary.manual {
        println!("  {} {}", "?".yellow(), fix.message);
    }
}

pub(crate) fn stats_line(stats: &DocumentStats) -> String {
    format!(
        "{} accessors, {} bufferViews, {} buffers, {} meshes, {} materials, {} textures, {} images",
        stats.accessors,
        stats.buffer_views,
        stats.buffers,
        stats.meshes,
        stats.materials,
        stats.textures,
        stats.images
    )
}
