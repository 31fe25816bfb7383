//! Applies auto-fixable records to a document.

use meshgate_model::{Document, DocumentError, Field};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::report::{FixKind, FixRecord, FixTarget};

/// Errors that can occur while applying fixes.
#[derive(Debug, Error)]
pub enum FixError {
    /// A record points at an item the document does not have.
    #[error("cannot apply fix to {target:?}: {source}")]
    Target {
        target: FixTarget,
        #[source]
        source: DocumentError,
    },

    /// The record's kind and target do not fit together.
    #[error("fix record {kind:?} does not apply to {target:?}")]
    Mismatched { kind: FixKind, target: FixTarget },
}

/// What the fixer did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixSummary {
    /// Records that changed the document.
    pub applied: Vec<FixRecord>,
    /// Records that need an author; never applied.
    pub manual: Vec<FixRecord>,
    /// Auto-fixable records that were already satisfied.
    pub unchanged: usize,
}

impl FixSummary {
    /// True if the document was modified.
    pub fn modified(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Applies every auto-fixable record to `document`.
///
/// Only buffer `byteLength` declarations are ever written. Applying the same
/// records twice changes nothing the second time.
pub fn apply_fixes(document: &mut Document, fixes: &[FixRecord]) -> Result<FixSummary, FixError> {
    let mut summary = FixSummary::default();

    for fix in fixes {
        if !fix.kind.is_auto_fixable() {
            debug!(message = %fix.message, "manual fix, not applied");
            summary.manual.push(fix.clone());
            continue;
        }

        let (FixTarget::Buffer { index }, Some(new_value)) = (fix.target, fix.new_value) else {
            return Err(FixError::Mismatched {
                kind: fix.kind,
                target: fix.target,
            });
        };

        let current = document.buffers.resolve(index as i64).map(|b| &b.byte_length);
        if matches!(current, Some(Field::Present(v)) if u64::try_from(*v).is_ok_and(|v| v == new_value)) {
            summary.unchanged += 1;
            continue;
        }

        document
            .set_buffer_byte_length(index, new_value)
            .map_err(|source| FixError::Target {
                target: fix.target,
                source,
            })?;
        info!(buffer = index, byte_length = new_value, "applied fix");
        summary.applied.push(fix.clone());
    }

    Ok(summary)
}
