//! Binary layout: byte arithmetic of accessors against their buffer views.

use meshgate_model::{is_valid_stride, Accessor, BufferView, Document, Field, MAX_BYTE_STRIDE, MIN_BYTE_STRIDE};
use tracing::debug;

use super::{PassContext, PassOutput, ValidationPass};
use crate::report::{Finding, FindingKind, Severity};

/// Checks that declared byte geometry is physically realizable.
///
/// Per accessor: footprint (`count * elementSize <= byteLength`), offset
/// containment, and stride size and alignment. The checks are independent
/// and all of them are reported. An accessor whose buffer view does not
/// resolve gets a single info finding instead; the reference pass owns the
/// error.
pub struct LayoutPass;

impl ValidationPass for LayoutPass {
    fn id(&self) -> &'static str {
        "layout"
    }

    fn description(&self) -> &'static str {
        "Accessor footprints, offsets and strides fit their buffer views"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::Layout
    }

    fn run(&self, document: &Document, _ctx: &PassContext<'_>) -> PassOutput {
        let mut out = PassOutput::default();

        for (i, accessor) in document.accessors.entries() {
            let view = match &accessor.buffer_view {
                Field::Present(v) => document.buffer_views.resolve(*v).map(|view| (*v, view)),
                _ => None,
            };
            match view {
                Some((v, view)) => check_accessor(i, accessor, v, view, &mut out),
                None => out.push(
                    Finding::new(
                        "layout/unresolved-view",
                        FindingKind::Layout,
                        Severity::Info,
                        format!(
                            "Accessor {}: bufferView {} does not resolve, layout checks skipped",
                            i,
                            accessor.buffer_view.describe()
                        ),
                    )
                    .at(format!("accessors[{}].bufferView", i)),
                ),
            }
        }

        for (v, view) in document.buffer_views.entries() {
            check_view(document, v, view, &mut out);
        }

        out
    }
}

fn check_accessor(i: usize, accessor: &Accessor, v: i64, view: &BufferView, out: &mut PassOutput) {
    let element_size = accessor.element_size().map(i128::from);
    let view_length = view.byte_length.present().copied().map(i128::from);

    if let (Some(count), Some(per_element), Some(available)) =
        (accessor.count.present().copied(), element_size, view_length)
    {
        let needed = i128::from(count) * per_element;
        debug!(accessor = i, needed = %needed, available = %available, "footprint");
        if needed > available {
            out.push(
                Finding::error(
                    "layout/footprint",
                    FindingKind::Layout,
                    format!(
                        "Accessor {}: Data exceeds bufferView bounds - needs {} bytes ({} x {}), bufferView {} byteLength is {} ({} bytes short)",
                        i,
                        needed,
                        count,
                        per_element,
                        v,
                        available,
                        needed - available
                    ),
                )
                .at(format!("accessors[{}].count", i))
                .with_actual_value(needed.to_string())
                .with_expected_range(format!("<= {}", available))
                .with_suggestion("Reduce count or enlarge the bufferView"),
            );
        }
    }

    if let (Some(offset), Some(available)) = (accessor.byte_offset.present().copied(), view_length) {
        let offset = i128::from(offset);
        if offset < 0 || offset >= available {
            out.push(
                Finding::error(
                    "layout/offset",
                    FindingKind::Layout,
                    format!(
                        "Accessor {}: byteOffset {} outside bufferView {} (byteLength {})",
                        i, offset, v, available
                    ),
                )
                .at(format!("accessors[{}].byteOffset", i))
                .with_actual_value(offset.to_string())
                .with_expected_range(match available {
                    0 => "none (empty bufferView)".to_string(),
                    _ => format!("0..{}", available - 1),
                }),
            );
        }
    }

    if let Some(&stride) = view.byte_stride.present() {
        if let Some(per_element) = element_size {
            if i128::from(stride) < per_element {
                out.push(
                    Finding::error(
                        "layout/stride-too-small",
                        FindingKind::Layout,
                        format!(
                            "Accessor {}: byteStride {} of bufferView {} is smaller than one element ({} bytes)",
                            i, stride, v, per_element
                        ),
                    )
                    .at(format!("bufferViews[{}].byteStride", v))
                    .with_actual_value(stride.to_string())
                    .with_expected_range(format!(">= {}", per_element)),
                );
            }
        }
        if stride % 4 != 0 {
            out.push(
                Finding::error(
                    "layout/stride-alignment",
                    FindingKind::Layout,
                    format!(
                        "Accessor {}: byteStride {} of bufferView {} is not a multiple of 4",
                        i, stride, v
                    ),
                )
                .at(format!("bufferViews[{}].byteStride", v))
                .with_actual_value(stride.to_string()),
            );
        }
    }
}

fn check_view(document: &Document, v: usize, view: &BufferView, out: &mut PassOutput) {
    match &view.byte_stride {
        Field::Present(stride) if !is_valid_stride(*stride) => out.push(
            Finding::error(
                "layout/stride-invalid",
                FindingKind::Layout,
                format!("BufferView {}: Invalid byteStride {}", v, stride),
            )
            .at(format!("bufferViews[{}].byteStride", v))
            .with_actual_value(stride.to_string())
            .with_expected_range(format!(
                "{}..={}, multiple of 4",
                MIN_BYTE_STRIDE, MAX_BYTE_STRIDE
            )),
        ),
        Field::Invalid(raw) => out.push(
            Finding::error(
                "layout/stride-invalid",
                FindingKind::Layout,
                format!("BufferView {}: Invalid byteStride {}", v, raw),
            )
            .at(format!("bufferViews[{}].byteStride", v))
            .with_actual_value(raw.to_string()),
        ),
        _ => {}
    }

    match &view.byte_offset {
        Field::Present(offset) if *offset < 0 => out.push(
            Finding::error(
                "layout/negative-offset",
                FindingKind::Layout,
                format!("BufferView {}: Negative byteOffset {}", v, offset),
            )
            .at(format!("bufferViews[{}].byteOffset", v))
            .with_actual_value(offset.to_string()),
        ),
        Field::Invalid(raw) => out.push(
            Finding::error(
                "layout/negative-offset",
                FindingKind::Layout,
                format!("BufferView {}: Malformed byteOffset {}", v, raw),
            )
            .at(format!("bufferViews[{}].byteOffset", v))
            .with_actual_value(raw.to_string()),
        ),
        _ => {}
    }

    let buffer_length = view
        .buffer
        .present()
        .and_then(|b| document.buffers.resolve(*b))
        .and_then(|buffer| buffer.byte_length.present().copied());
    if let (Some(offset), Some(length), Some(buffer_length)) = (
        view.offset_or_default(),
        view.byte_length.present().copied(),
        buffer_length,
    ) {
        let end = i128::from(offset) + i128::from(length);
        if offset >= 0 && length >= 0 && end > i128::from(buffer_length) {
            out.push(
                Finding::error(
                    "layout/view-exceeds-buffer",
                    FindingKind::Layout,
                    format!(
                        "BufferView {}: Window ends at byte {} but buffer {} byteLength is {}",
                        v,
                        end,
                        view.buffer.describe(),
                        buffer_length
                    ),
                )
                .at(format!("bufferViews[{}]", v))
                .with_actual_value(end.to_string())
                .with_expected_range(format!("<= {}", buffer_length)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::test_support::{messages, rule_ids, run};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn graph(accessor: Value, view: Value) -> Value {
        json!({
            "accessors": [accessor],
            "bufferViews": [view],
            "buffers": [{ "byteLength": 4096 }]
        })
    }

    #[test]
    fn test_footprint_shortfall() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5126, "count": 100, "type": "VEC3" }),
                json!({ "buffer": 0, "byteLength": 800 }),
            ),
        );
        assert_eq!(rule_ids(&out), vec!["layout/footprint"]);
        assert_eq!(
            messages(&out),
            vec!["Accessor 0: Data exceeds bufferView bounds - needs 1200 bytes (100 x 12), bufferView 0 byteLength is 800 (400 bytes short)"]
        );
    }

    #[test]
    fn test_exact_fit_is_clean() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5123, "count": 6, "type": "SCALAR", "byteOffset": 0 }),
                json!({ "buffer": 0, "byteLength": 12 }),
            ),
        );
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_offset_equal_to_length_is_outside() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5121, "count": 0, "type": "SCALAR", "byteOffset": 16 }),
                json!({ "buffer": 0, "byteLength": 16 }),
            ),
        );
        assert_eq!(rule_ids(&out), vec!["layout/offset"]);
    }

    #[test]
    fn test_negative_accessor_offset() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5121, "count": 1, "type": "SCALAR", "byteOffset": -4 }),
                json!({ "buffer": 0, "byteLength": 16 }),
            ),
        );
        assert_eq!(rule_ids(&out), vec!["layout/offset"]);
    }

    #[test]
    fn test_offset_and_footprint_both_reported() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5126, "count": 10, "type": "VEC4", "byteOffset": 64 }),
                json!({ "buffer": 0, "byteLength": 64 }),
            ),
        );
        assert_eq!(rule_ids(&out), vec!["layout/footprint", "layout/offset"]);
    }

    #[test]
    fn test_stride_checks() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5126, "count": 1, "type": "VEC3" }),
                json!({ "buffer": 0, "byteLength": 64, "byteStride": 6 }),
            ),
        );
        assert_eq!(
            rule_ids(&out),
            vec![
                "layout/stride-too-small",
                "layout/stride-alignment",
                "layout/stride-invalid"
            ]
        );
    }

    #[test]
    fn test_null_stride_is_tightly_packed() {
        for stride in [json!(null), json!(12)] {
            let out = run(
                &LayoutPass,
                graph(
                    json!({ "bufferView": 0, "componentType": 5126, "count": 2, "type": "VEC3" }),
                    json!({ "buffer": 0, "byteLength": 24, "byteStride": stride }),
                ),
            );
            assert!(out.findings.is_empty(), "{:?}", out.findings);
        }
    }

    #[test]
    fn test_stride_out_of_range() {
        let out = run(
            &LayoutPass,
            json!({ "bufferViews": [{ "buffer": 0, "byteLength": 512, "byteStride": 256 }], "buffers": [{ "byteLength": 512 }] }),
        );
        assert_eq!(messages(&out), vec!["BufferView 0: Invalid byteStride 256"]);
    }

    #[test]
    fn test_unresolved_view_short_circuits() {
        let out = run(
            &LayoutPass,
            json!({
                "accessors": [
                    { "bufferView": 9, "componentType": 5126, "count": 100, "type": "VEC3" },
                    { "componentType": 5126, "count": 1, "type": "VEC3" }
                ]
            }),
        );
        assert_eq!(
            rule_ids(&out),
            vec!["layout/unresolved-view", "layout/unresolved-view"]
        );
        assert!(out.findings.iter().all(|f| f.severity == Severity::Info));
        assert_eq!(out.error_count(), 0);
    }

    #[test]
    fn test_unknown_type_skips_footprint() {
        let out = run(
            &LayoutPass,
            graph(
                json!({ "bufferView": 0, "componentType": 5126, "count": 1000, "type": "VEC5" }),
                json!({ "buffer": 0, "byteLength": 4 }),
            ),
        );
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_view_exceeds_buffer() {
        let out = run(
            &LayoutPass,
            json!({
                "bufferViews": [
                    { "buffer": 0, "byteOffset": 100, "byteLength": 28 },
                    { "buffer": 0, "byteOffset": 100, "byteLength": 29 }
                ],
                "buffers": [{ "byteLength": 128 }]
            }),
        );
        assert_eq!(
            messages(&out),
            vec!["BufferView 1: Window ends at byte 129 but buffer 0 byteLength is 128"]
        );
    }

    #[test]
    fn test_negative_view_offset() {
        let out = run(
            &LayoutPass,
            json!({ "bufferViews": [{ "buffer": 0, "byteOffset": -8, "byteLength": 4 }], "buffers": [{ "byteLength": 4 }] }),
        );
        assert_eq!(rule_ids(&out), vec!["layout/negative-offset"]);
    }
}
