//! Test harness utilities for running checks against files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

use meshgate_cli::commands::check::{check_file, FileOutput};
use meshgate_lint::{Finding, LoadedAsset, ValidatorConfig};

use crate::fixtures::GltfFixture;

/// A temporary working directory for one test.
pub struct TestHarness {
    pub work_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().expect("Failed to create work dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }

    /// Writes `fixture` as `<name>.gltf` with its payloads.
    pub fn write_gltf(&self, fixture: &GltfFixture, name: &str) -> PathBuf {
        fixture.write_gltf(self.path(), &format!("{}.gltf", name))
    }

    /// Writes `fixture` as `<name>.glb`.
    pub fn write_glb(&self, fixture: &GltfFixture, name: &str) -> PathBuf {
        fixture.write_glb(self.path(), &format!("{}.glb", name))
    }

    /// Runs the check command's per-file flow with the default config.
    pub fn check(&self, path: &Path) -> FileOutput {
        check_file(path, &ValidatorConfig::default())
    }

    /// Runs the per-file flow in fix mode.
    pub fn check_and_fix(&self, path: &Path) -> FileOutput {
        check_file(path, &ValidatorConfig::default().with_fix(true))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-reads a document from disk as a JSON tree.
pub fn reload_json(path: &Path) -> Value {
    let asset = LoadedAsset::load(path).expect("reload document");
    asset.document.into_raw()
}

/// Reads a file's bytes.
pub fn read_bytes(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read file")
}

/// Rule IDs of `findings`, in report order.
pub fn rule_ids(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.rule_id.as_str()).collect()
}

/// Asserts that the file loaded and produced a report, returning it.
pub fn expect_report(output: &FileOutput) -> &meshgate_lint::ValidationReport {
    assert!(
        output.load_error.is_none(),
        "unexpected load failure for {}: {:?}",
        output.path,
        output.load_error
    );
    output.report.as_ref().expect("report present after load")
}
