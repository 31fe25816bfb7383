//! Validation report types for structured output.

use meshgate_model::DocumentStats;
use serde::{Deserialize, Serialize};

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Context only, e.g. checks that were skipped.
    Info,
    /// Recoverable inconsistency. Never fails a run.
    Warning,
    /// Definitely broken. Fails the run.
    Error,
}

/// Which class of invariant a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    /// Required field absent, malformed, or reference out of bounds.
    Structural,
    /// Byte arithmetic invariant violated.
    Layout,
    /// Requirement of the downstream ingest pipeline violated.
    Policy,
    /// Declared buffer size disagrees with the payload.
    Reconciliation,
}

/// A single finding produced by a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier (e.g. "reference/out-of-range", "layout/footprint").
    pub rule_id: String,

    pub kind: FindingKind,

    pub severity: Severity,

    /// Human-readable description naming the item and offending value.
    pub message: String,

    /// JSON path of the offending field (e.g. "accessors[2].bufferView").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Value that triggered the finding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,

    /// Expected value or acceptable range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<String>,

    /// How to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    /// Creates a new finding with required fields.
    pub fn new(
        rule_id: impl Into<String>,
        kind: FindingKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            kind,
            severity,
            message: message.into(),
            location: None,
            actual_value: None,
            expected_range: None,
            suggestion: None,
        }
    }

    /// Shorthand for an error-level finding.
    pub fn error(rule_id: impl Into<String>, kind: FindingKind, message: impl Into<String>) -> Self {
        Self::new(rule_id, kind, Severity::Error, message)
    }

    /// Builder method to set the JSON location.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set actual value.
    pub fn with_actual_value(mut self, value: impl Into<String>) -> Self {
        self.actual_value = Some(value.into());
        self
    }

    /// Builder method to set expected range.
    pub fn with_expected_range(mut self, range: impl Into<String>) -> Self {
        self.expected_range = Some(range.into());
        self
    }

    /// Builder method to set the suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// True for findings about the `TEXCOORD_0` channel.
    pub fn is_uv_finding(&self) -> bool {
        self.rule_id.starts_with("policy/texcoord")
    }
}

/// What a fix record changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    /// Overwrite a buffer's declared `byteLength` with the measured size.
    BufferByteLength,
    /// `TEXCOORD_0` is missing. Needs new data from the authoring tool.
    MissingTexcoord,
}

impl FixKind {
    /// True when the fixer may apply the record mechanically.
    pub fn is_auto_fixable(&self) -> bool {
        matches!(self, FixKind::BufferByteLength)
    }
}

/// The item a fix record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FixTarget {
    Buffer { index: usize },
    Primitive { mesh: usize, primitive: usize },
}

/// A finding that has been, or could be, addressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRecord {
    pub kind: FixKind,
    pub target: FixTarget,
    /// Declared value before the fix; `None` when it was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<u64>,
    pub message: String,
}

impl FixRecord {
    /// Auto-fixable record for a stale buffer size.
    pub fn buffer_byte_length(index: usize, old_value: Option<i64>, new_value: u64) -> Self {
        let old = old_value.map_or_else(|| "missing".to_string(), |v| v.to_string());
        Self {
            kind: FixKind::BufferByteLength,
            target: FixTarget::Buffer { index },
            old_value,
            new_value: Some(new_value),
            message: format!(
                "Fixed buffer {} byteLength from {} to {}",
                index, old, new_value
            ),
        }
    }

    /// Informational record for a primitive without UVs.
    pub fn missing_texcoord(mesh: usize, primitive: usize) -> Self {
        Self {
            kind: FixKind::MissingTexcoord,
            target: FixTarget::Primitive { mesh, primitive },
            old_value: None,
            new_value: None,
            message: format!(
                "Mesh {} Primitive {}: UV coordinates missing - requires manual fix in the authoring tool",
                mesh, primitive
            ),
        }
    }
}

/// Summary statistics for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

/// Confidence signals for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protections {
    /// Every primitive carries a VEC2 `TEXCOORD_0`.
    pub uv_coverage_complete: bool,
    /// Every accessor resolved its buffer view and passed the byte checks.
    pub layout_clean: bool,
    /// No structural corruption was found.
    pub structure_intact: bool,
}

/// Complete result of validating one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True if no errors were found. Warnings never clear it.
    pub ok: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
    /// Fix candidates, in pass order.
    pub fixes: Vec<FixRecord>,
    pub stats: DocumentStats,
    pub summary: ReportSummary,
    /// Pass ids that ran, in merge order.
    pub passes_run: Vec<String>,
    /// Whether the `TEXCOORD_0` requirement was enforced.
    pub uv_policy_enforced: bool,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new(stats: DocumentStats) -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
            fixes: Vec::new(),
            stats,
            summary: ReportSummary::default(),
            passes_run: Vec::new(),
            uv_policy_enforced: false,
        }
    }

    /// Adds a finding to the report and updates the summary.
    pub fn add_finding(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Info => {
                self.summary.info_count += 1;
                self.info.push(finding);
            }
            Severity::Warning => {
                self.summary.warning_count += 1;
                self.warnings.push(finding);
            }
            Severity::Error => {
                self.summary.error_count += 1;
                self.ok = false;
                self.errors.push(finding);
            }
        }
    }

    /// Appends one pass's output, preserving its internal order.
    pub fn absorb(&mut self, pass_id: &str, output: crate::passes::PassOutput) {
        self.passes_run.push(pass_id.to_string());
        for finding in output.findings {
            self.add_finding(finding);
        }
        self.fixes.extend(output.fixes);
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.ok
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        self.summary.warning_count > 0
    }

    /// Returns the total finding count.
    pub fn total_findings(&self) -> usize {
        self.summary.error_count + self.summary.warning_count + self.summary.info_count
    }

    /// Errors about the `TEXCOORD_0` channel, the most common rejection cause.
    pub fn uv_errors(&self) -> impl Iterator<Item = &Finding> {
        self.errors.iter().filter(|f| f.is_uv_finding())
    }

    /// Fix records the fixer may apply.
    pub fn auto_fixes(&self) -> impl Iterator<Item = &FixRecord> {
        self.fixes.iter().filter(|f| f.kind.is_auto_fixable())
    }

    fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .chain(self.info.iter())
    }

    fn ran(&self, pass_id: &str) -> bool {
        self.passes_run.iter().any(|p| p == pass_id)
    }

    /// Which protections this run can vouch for.
    ///
    /// A protection is only active when the pass that enforces it ran.
    /// UV coverage also needs at least one mesh to cover.
    pub fn protections(&self) -> Protections {
        Protections {
            uv_coverage_complete: self.ran("policy")
                && self.uv_policy_enforced
                && self.stats.meshes > 0
                && !self.all_findings().any(Finding::is_uv_finding),
            layout_clean: self.ran("layout")
                && !self.all_findings().any(|f| f.kind == FindingKind::Layout),
            structure_intact: self.ran("reference")
                && self.ran("policy")
                && !self.errors.iter().any(|f| f.kind == FindingKind::Structural),
        }
    }
}
