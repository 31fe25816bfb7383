//! Run lifecycle: load, validate, optionally fix, report.

use std::fmt;

use meshgate_model::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::fixer::{apply_fixes, FixError, FixSummary};
use crate::payload::PayloadResolver;
use crate::registry::PassRegistry;
use crate::report::ValidationReport;

/// Where a run currently is.
///
/// `NotStarted -> Loaded -> Validated -> (FixesApplied)? -> Reported`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    NotStarted,
    Loaded,
    Validated,
    FixesApplied,
    Reported,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::NotStarted => "not started",
            RunStage::Loaded => "loaded",
            RunStage::Validated => "validated",
            RunStage::FixesApplied => "fixes applied",
            RunStage::Reported => "reported",
        };
        write!(f, "{}", name)
    }
}

/// Errors from driving a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {operation} while {stage}")]
    OutOfOrder {
        operation: &'static str,
        stage: RunStage,
    },

    #[error("fix mode is disabled")]
    FixModeDisabled,

    #[error(transparent)]
    Fix(#[from] FixError),
}

/// Final state of a run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Findings for the document as it was loaded, before any fix.
    pub report: ValidationReport,
    pub fix_summary: Option<FixSummary>,
    /// The document, with fixes applied if any were.
    pub document: Document,
    pub document_modified: bool,
    /// Set when the fixer failed. The document is then left unfixed and
    /// the verdict still comes from `report`.
    pub fix_error: Option<FixError>,
}

impl RunOutcome {
    /// True if the pre-fix document had no errors.
    pub fn passed(&self) -> bool {
        self.report.ok
    }
}

/// One validation run over one document.
///
/// Enforces the stage order. The fixer only runs after every pass has
/// finished, and the report always describes the pre-fix document.
pub struct Session {
    stage: RunStage,
    config: ValidatorConfig,
    registry: PassRegistry,
    document: Option<Document>,
    resolver: Option<Box<dyn PayloadResolver>>,
    report: Option<ValidationReport>,
    fix_summary: Option<FixSummary>,
}

impl Session {
    pub fn new(config: ValidatorConfig) -> Self {
        let registry = PassRegistry::from_config(&config);
        Self::with_registry(config, registry)
    }

    pub fn with_registry(config: ValidatorConfig, registry: PassRegistry) -> Self {
        Self {
            stage: RunStage::NotStarted,
            config,
            registry,
            document: None,
            resolver: None,
            report: None,
            fix_summary: None,
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn expect_stage(&self, operation: &'static str, allowed: &[RunStage]) -> Result<(), SessionError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                operation,
                stage: self.stage,
            })
        }
    }

    fn advance(&mut self, stage: RunStage) {
        debug!(from = %self.stage, to = %stage, "session stage");
        self.stage = stage;
    }

    /// Hands the session a parsed document and a way to measure its payloads.
    pub fn load(
        &mut self,
        document: Document,
        resolver: Box<dyn PayloadResolver>,
    ) -> Result<(), SessionError> {
        self.expect_stage("load", &[RunStage::NotStarted])?;
        self.document = Some(document);
        self.resolver = Some(resolver);
        self.advance(RunStage::Loaded);
        Ok(())
    }

    /// Runs every enabled pass.
    pub fn validate(&mut self) -> Result<&ValidationReport, SessionError> {
        self.expect_stage("validate", &[RunStage::Loaded])?;
        let (Some(document), Some(resolver)) = (&self.document, &self.resolver) else {
            return Err(SessionError::OutOfOrder {
                operation: "validate",
                stage: self.stage,
            });
        };
        let report = self.registry.validate(document, &self.config, resolver.as_ref());
        self.advance(RunStage::Validated);
        Ok(self.report.insert(report))
    }

    /// Applies the auto-fixable records of the report.
    ///
    /// The stage only moves to `FixesApplied` when the document changed.
    /// The report is left as it was.
    pub fn apply_fixes(&mut self) -> Result<&FixSummary, SessionError> {
        self.expect_stage("apply fixes", &[RunStage::Validated])?;
        if !self.config.fix {
            return Err(SessionError::FixModeDisabled);
        }
        let (Some(document), Some(report)) = (self.document.as_mut(), self.report.as_ref()) else {
            return Err(SessionError::OutOfOrder {
                operation: "apply fixes",
                stage: self.stage,
            });
        };

        // Fix a copy so a failure part-way leaves the document untouched.
        let mut fixed = document.clone();
        let summary = apply_fixes(&mut fixed, &report.fixes)?;
        *document = fixed;
        if summary.modified() {
            self.advance(RunStage::FixesApplied);
        }
        Ok(self.fix_summary.insert(summary))
    }

    /// Ends the run and hands back the report and document.
    pub fn finish(mut self) -> Result<RunOutcome, SessionError> {
        self.expect_stage("report", &[RunStage::Validated, RunStage::FixesApplied])?;
        let document_modified = self.stage == RunStage::FixesApplied;
        self.advance(RunStage::Reported);
        match (self.report, self.document) {
            (Some(report), Some(document)) => Ok(RunOutcome {
                report,
                fix_summary: self.fix_summary,
                document,
                document_modified,
                fix_error: None,
            }),
            _ => Err(SessionError::OutOfOrder {
                operation: "report",
                stage: self.stage,
            }),
        }
    }
}

/// Validates `document` and, in fix mode, applies the auto-fixes.
///
/// A fixer failure is carried in [`RunOutcome::fix_error`] and does not
/// discard the report.
pub fn run(
    document: Document,
    resolver: Box<dyn PayloadResolver>,
    config: ValidatorConfig,
) -> Result<RunOutcome, SessionError> {
    let registry = PassRegistry::from_config(&config);
    run_with_registry(document, resolver, config, registry)
}

/// [`run`] with a caller-supplied pass registry.
pub fn run_with_registry(
    document: Document,
    resolver: Box<dyn PayloadResolver>,
    config: ValidatorConfig,
    registry: PassRegistry,
) -> Result<RunOutcome, SessionError> {
    let fix = config.fix;
    let mut session = Session::with_registry(config, registry);
    session.load(document, resolver)?;
    let report = session.validate()?;
    let mut fix_error = None;
    if fix && report.auto_fixes().next().is_some() {
        match session.apply_fixes() {
            Ok(_) => {}
            Err(SessionError::Fix(e)) => {
                warn!(error = %e, "fixes not applied");
                fix_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    let mut outcome = session.finish()?;
    outcome.fix_error = fix_error;
    Ok(outcome)
}
