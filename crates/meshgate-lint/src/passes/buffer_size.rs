//! Buffer reconciliation: declared `byteLength` against the measured payload.

use meshgate_model::{Document, Field};
use rayon::prelude::*;
use tracing::{debug, warn};

use super::{PassContext, PassOutput, ValidationPass};
use crate::payload::{PayloadError, PayloadResolver};
use crate::report::{Finding, FindingKind, FixRecord, Severity};

/// Measures every `uri`-backed buffer and compares it to its declaration.
///
/// A missing payload is an error, a size mismatch only a warning. In fix
/// mode each mismatch also yields an auto-fixable [`FixRecord`]. Buffers
/// without a `uri` are embedded and never measured.
pub struct BufferSizePass;

struct Measured<'a> {
    index: usize,
    uri: &'a str,
    declared: &'a Field<i64>,
    size: Result<u64, PayloadError>,
}

impl ValidationPass for BufferSizePass {
    fn id(&self) -> &'static str {
        "buffer-size"
    }

    fn description(&self) -> &'static str {
        "Declared buffer byteLength matches the size of the external payload"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::Reconciliation
    }

    fn run(&self, document: &Document, ctx: &PassContext<'_>) -> PassOutput {
        let candidates: Vec<_> = document
            .buffers
            .entries()
            .filter_map(|(index, buffer)| match buffer.external_uri() {
                Some(uri) => Some((index, uri, &buffer.byte_length)),
                None => {
                    debug!(buffer = index, "embedded buffer, skipping reconciliation");
                    None
                }
            })
            .collect();

        let mut measured: Vec<Measured<'_>> = if ctx.config.parallel {
            candidates
                .par_iter()
                .map(|candidate| measure(ctx.resolver, *candidate))
                .collect()
        } else {
            candidates
                .iter()
                .map(|candidate| measure(ctx.resolver, *candidate))
                .collect()
        };
        measured.sort_by_key(|m| m.index);

        let mut out = PassOutput::default();
        for item in measured {
            reconcile(item, ctx.config.fix, &mut out);
        }
        out
    }
}

fn measure<'a>(
    resolver: &dyn PayloadResolver,
    (index, uri, declared): (usize, &'a str, &'a Field<i64>),
) -> Measured<'a> {
    Measured {
        index,
        uri,
        declared,
        size: resolver.payload_size(uri),
    }
}

fn reconcile(item: Measured<'_>, fix: bool, out: &mut PassOutput) {
    let Measured {
        index,
        uri,
        declared,
        size,
    } = item;
    let location = format!("buffers[{}]", index);

    let actual = match size {
        Ok(actual) => actual,
        Err(PayloadError::NotFound(_)) => {
            warn!(buffer = index, uri, "payload not found");
            out.push(
                Finding::error(
                    "buffer-size/not-found",
                    FindingKind::Reconciliation,
                    format!("Buffer {}: Referenced file not found: {}", index, uri),
                )
                .at(format!("{}.uri", location))
                .with_actual_value(uri),
            );
            return;
        }
        Err(err) => {
            warn!(buffer = index, uri, error = %err, "payload unreadable");
            out.push(
                Finding::error(
                    "buffer-size/unreadable",
                    FindingKind::Reconciliation,
                    format!("Buffer {}: Cannot measure payload: {}", index, err),
                )
                .at(format!("{}.uri", location)),
            );
            return;
        }
    };

    let old_value = declared.present().copied();
    if old_value.is_some_and(|d| u64::try_from(d).is_ok_and(|d| d == actual)) {
        debug!(buffer = index, size = actual, "byteLength matches payload");
        return;
    }

    out.push(
        Finding::new(
            "buffer-size/mismatch",
            FindingKind::Reconciliation,
            Severity::Warning,
            format!(
                "Buffer {}: Size mismatch - declared: {}, actual: {}",
                index,
                declared.describe(),
                actual
            ),
        )
        .at(format!("{}.byteLength", location))
        .with_actual_value(actual.to_string())
        .with_expected_range(declared.describe())
        .with_suggestion("Run with --fix to update byteLength"),
    );
    if fix {
        out.fixes
            .push(FixRecord::buffer_byte_length(index, old_value, actual));
    }
}
