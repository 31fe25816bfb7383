//! Validation pass trait and the built-in passes.

use meshgate_model::{Collection, Document};

use crate::config::ValidatorConfig;
use crate::payload::PayloadResolver;
use crate::report::{Finding, FindingKind, FixRecord};

pub mod buffer_size;
pub mod layout;
pub mod policy;
pub mod reference;

pub use buffer_size::BufferSizePass;
pub use layout::LayoutPass;
pub use policy::PolicyPass;
pub use reference::ReferencePass;

/// Everything a pass may read besides the document.
#[derive(Clone, Copy)]
pub struct PassContext<'a> {
    pub config: &'a ValidatorConfig,
    pub resolver: &'a dyn PayloadResolver,
}

/// Findings and fix candidates produced by one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOutput {
    pub findings: Vec<Finding>,
    pub fixes: Vec<FixRecord>,
}

impl PassOutput {
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == crate::report::Severity::Error)
            .count()
    }
}

/// An independent check over a whole document.
///
/// Passes never mutate the document and never see each other's output, so
/// the registry may run them in any order or concurrently.
pub trait ValidationPass: Send + Sync {
    /// Unique identifier (e.g., "reference", "layout").
    fn id(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// The invariant class most findings of this pass belong to.
    fn kind(&self) -> FindingKind;

    /// Run the pass. Findings follow document index order.
    fn run(&self, document: &Document, ctx: &PassContext<'_>) -> PassOutput;
}

/// Returns the built-in passes in merge order.
pub fn all_passes() -> Vec<Box<dyn ValidationPass>> {
    vec![
        Box::new(ReferencePass),
        Box::new(LayoutPass),
        Box::new(PolicyPass),
        Box::new(BufferSizePass),
    ]
}

/// Human-readable valid range for an index into `collection`.
pub(crate) fn index_range<T>(collection: &Collection<T>) -> String {
    match collection.len() {
        0 => "no entries".to_string(),
        len => format!("0..{}", len - 1),
    }
}
