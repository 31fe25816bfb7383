//! Ingest policy: required fields, enum values, bound shapes and the
//! mandatory attribute set.

use meshgate_model::{
    is_valid_mode, json_kind, Accessor, AccessorType, Collection, ComponentType, Document, Field, Mesh, Primitive,
    POSITION, TEXCOORD_0,
};
use tracing::debug;

use super::{PassContext, PassOutput, ValidationPass};
use crate::report::{Finding, FindingKind, FixRecord};

/// Checks format requirements that do not involve buffer arithmetic.
///
/// Also owns malformed entries: a collection entry that is not an object is
/// reported here once and skipped by every other pass.
pub struct PolicyPass;

impl ValidationPass for PolicyPass {
    fn id(&self) -> &'static str {
        "policy"
    }

    fn description(&self) -> &'static str {
        "Required fields, enum values, bounds and mandatory POSITION/TEXCOORD_0 attributes"
    }

    fn kind(&self) -> FindingKind {
        FindingKind::Policy
    }

    fn run(&self, document: &Document, ctx: &PassContext<'_>) -> PassOutput {
        let mut out = PassOutput::default();
        check_top_level(document, &mut out);

        malformed(&document.accessors, "accessors", "Accessor", &mut out);
        for (i, accessor) in document.accessors.entries() {
            check_accessor(i, accessor, &mut out);
        }

        malformed(&document.buffer_views, "bufferViews", "BufferView", &mut out);
        for (v, view) in document.buffer_views.entries() {
            match &view.byte_length {
                Field::Absent | Field::Null => out.push(missing_field(
                    format!("BufferView {}: Missing byteLength", v),
                    format!("bufferViews[{}].byteLength", v),
                )),
                Field::Present(length) if *length >= 0 => {}
                other => out.push(
                    structural(
                        "policy/invalid-byte-length",
                        format!("BufferView {}: Invalid byteLength {}", v, other.describe()),
                        format!("bufferViews[{}].byteLength", v),
                    )
                    .with_actual_value(other.describe())
                    .with_expected_range(">= 0"),
                ),
            }
        }

        malformed(&document.buffers, "buffers", "Buffer", &mut out);
        for (b, buffer) in document.buffers.entries() {
            match &buffer.byte_length {
                Field::Present(length) if *length <= 0 => out.push(
                    structural(
                        "policy/invalid-byte-length",
                        format!("Buffer {}: Invalid byteLength {}", b, length),
                        format!("buffers[{}].byteLength", b),
                    )
                    .with_actual_value(length.to_string())
                    .with_expected_range(">= 1"),
                ),
                Field::Invalid(raw) => out.push(
                    structural(
                        "policy/invalid-byte-length",
                        format!("Buffer {}: Invalid byteLength {}", b, raw),
                        format!("buffers[{}].byteLength", b),
                    )
                    .with_actual_value(raw.to_string()),
                ),
                _ => {}
            }
            if let Field::Invalid(raw) = &buffer.uri {
                out.push(
                    structural(
                        "policy/invalid-uri",
                        format!("Buffer {}: uri must be a string, found {}", b, json_kind(raw)),
                        format!("buffers[{}].uri", b),
                    )
                    .with_actual_value(raw.to_string()),
                );
            }
        }

        malformed(&document.meshes, "meshes", "Mesh", &mut out);
        for (m, mesh) in document.meshes.entries() {
            check_mesh(document, ctx, m, mesh, &mut out);
        }

        malformed(&document.materials, "materials", "Material", &mut out);
        malformed(&document.textures, "textures", "Texture", &mut out);
        malformed(&document.images, "images", "Image", &mut out);
        for (n, image) in document.images.entries() {
            if let Field::Invalid(raw) = &image.uri {
                out.push(
                    structural(
                        "policy/invalid-uri",
                        format!("Image {}: uri must be a string, found {}", n, json_kind(raw)),
                        format!("images[{}].uri", n),
                    )
                    .with_actual_value(raw.to_string()),
                );
            }
        }
        malformed(&document.samplers, "samplers", "Sampler", &mut out);

        out
    }
}

fn structural(rule_id: &str, message: String, location: String) -> Finding {
    Finding::error(rule_id, FindingKind::Structural, message).at(location)
}

fn policy(rule_id: &str, message: String, location: String) -> Finding {
    Finding::error(rule_id, FindingKind::Policy, message).at(location)
}

fn missing_field(message: String, location: String) -> Finding {
    structural("policy/missing-field", message, location)
}

fn check_top_level(document: &Document, out: &mut PassOutput) {
    let version = document.asset.present().map(|asset| &asset.version);
    if !matches!(version, Some(Field::Present(_))) {
        out.push(
            structural(
                "policy/asset-version",
                "Missing asset.version".to_string(),
                "asset.version".to_string(),
            )
            .with_suggestion("Declare \"asset\": { \"version\": \"2.0\" }"),
        );
    }

    for (name, rule_id, field) in [
        ("scenes", "policy/scenes", &document.scenes),
        ("nodes", "policy/nodes", &document.nodes),
    ] {
        if !field.present().is_some_and(|items| !items.is_empty()) {
            out.push(
                structural(rule_id, format!("Missing or empty {} array", name), name.to_string())
                    .with_actual_value(field.describe_kind()),
            );
        }
    }
}

/// Reports a collection that is not an array, and entries that are not objects.
fn malformed<T>(collection: &Collection<T>, name: &str, owner: &str, out: &mut PassOutput) {
    if let Field::Invalid(raw) = collection.state() {
        out.push(
            structural(
                "policy/malformed-collection",
                format!("{}: expected an array, found {}", name, json_kind(raw)),
                name.to_string(),
            )
            .with_actual_value(json_kind(raw)),
        );
        return;
    }
    for (i, entry) in collection.iter() {
        let kind = match entry {
            Field::Invalid(raw) => json_kind(raw),
            Field::Null => "null",
            Field::Absent | Field::Present(_) => continue,
        };
        out.push(
            structural(
                "policy/malformed-entry",
                format!("{} {}: expected an object, found {}", owner, i, kind),
                format!("{}[{}]", name, i),
            )
            .with_actual_value(kind),
        );
    }
}

fn check_accessor(i: usize, accessor: &Accessor, out: &mut PassOutput) {
    let at = |field: &str| format!("accessors[{}].{}", i, field);

    match &accessor.component_type {
        Field::Absent | Field::Null => {
            out.push(missing_field(format!("Accessor {}: Missing componentType", i), at("componentType")))
        }
        _ if accessor.component().is_some() => {}
        other => out.push(
            structural(
                "policy/invalid-component-type",
                format!("Accessor {}: Invalid componentType {}", i, other.describe()),
                at("componentType"),
            )
            .with_actual_value(other.describe())
            .with_expected_range(
                ComponentType::ALL
                    .iter()
                    .map(|c| c.code().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ),
    }

    match &accessor.element_type {
        Field::Absent | Field::Null => out.push(missing_field(format!("Accessor {}: Missing type", i), at("type"))),
        _ if accessor.element().is_some() => {}
        other => out.push(
            structural(
                "policy/invalid-type",
                format!("Accessor {}: Invalid type {}", i, other.describe()),
                at("type"),
            )
            .with_actual_value(other.describe())
            .with_expected_range(
                AccessorType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        ),
    }

    match &accessor.count {
        Field::Absent | Field::Null => out.push(missing_field(format!("Accessor {}: Missing count", i), at("count"))),
        Field::Present(count) if *count >= 0 => {}
        other => out.push(
            structural(
                "policy/invalid-count",
                format!("Accessor {}: Invalid count {}", i, other.describe()),
                at("count"),
            )
            .with_actual_value(other.describe())
            .with_expected_range(">= 0"),
        ),
    }

    // Integer offsets are range-checked by the layout pass.
    if let Field::Invalid(raw) = &accessor.byte_offset {
        out.push(
            structural(
                "policy/invalid-byte-offset",
                format!("Accessor {}: Invalid byteOffset {}", i, raw),
                at("byteOffset"),
            )
            .with_actual_value(raw.to_string())
            .with_expected_range("integer >= 0"),
        );
    }

    for (name, bounds) in [("min", &accessor.min), ("max", &accessor.max)] {
        match bounds {
            // Empty bounds mean "not computed".
            Field::Present(values) if values.is_empty() => {}
            Field::Present(values) => {
                let Some(element) = accessor.element() else {
                    continue;
                };
                let expected = element.component_count() as usize;
                if values.len() != expected {
                    out.push(
                        structural(
                            "policy/bounds-length",
                            format!(
                                "Accessor {}: {} has {} values, expected {} for {}",
                                i,
                                name,
                                values.len(),
                                expected,
                                element
                            ),
                            at(name),
                        )
                        .with_actual_value(values.len().to_string())
                        .with_expected_range(expected.to_string()),
                    );
                }
            }
            Field::Invalid(raw) => out.push(
                structural(
                    "policy/invalid-bounds",
                    format!("Accessor {}: {} must be an array of numbers", i, name),
                    at(name),
                )
                .with_actual_value(raw.to_string()),
            ),
            Field::Absent | Field::Null => {}
        }
    }
}

fn check_mesh(document: &Document, ctx: &PassContext<'_>, m: usize, mesh: &Mesh, out: &mut PassOutput) {
    let primitives = match mesh.primitives.present() {
        Some(primitives) if !primitives.is_empty() => primitives,
        _ => {
            out.push(
                structural(
                    "policy/empty-mesh",
                    format!("Mesh {}: No primitives", m),
                    format!("meshes[{}].primitives", m),
                )
                .with_actual_value(mesh.primitives.describe_kind()),
            );
            return;
        }
    };

    for (p, primitive) in primitives.iter().enumerate() {
        let location = format!("meshes[{}].primitives[{}]", m, p);
        let kind = match primitive {
            Field::Present(primitive) => {
                check_primitive(document, ctx, m, p, primitive, out);
                continue;
            }
            Field::Invalid(raw) => json_kind(raw),
            Field::Null | Field::Absent => "null",
        };
        out.push(
            structural(
                "policy/malformed-entry",
                format!("Mesh {} Primitive {}: expected an object, found {}", m, p, kind),
                location,
            )
            .with_actual_value(kind),
        );
    }
}

fn check_primitive(
    document: &Document,
    ctx: &PassContext<'_>,
    m: usize,
    p: usize,
    primitive: &Primitive,
    out: &mut PassOutput,
) {
    let owner = format!("Mesh {} Primitive {}", m, p);
    let at = |field: &str| format!("meshes[{}].primitives[{}].{}", m, p, field);

    if let Field::Invalid(raw) = &primitive.attributes {
        out.push(
            structural(
                "policy/invalid-attributes",
                format!("{}: attributes must be an object, found {}", owner, json_kind(raw)),
                at("attributes"),
            )
            .with_actual_value(json_kind(raw)),
        );
    }

    match &primitive.mode {
        Field::Present(mode) if is_valid_mode(*mode) => {}
        Field::Absent | Field::Null => {}
        other => out.push(
            structural(
                "policy/invalid-mode",
                format!("{}: Invalid mode {}", owner, other.describe()),
                at("mode"),
            )
            .with_actual_value(other.describe())
            .with_expected_range("0..=6"),
        ),
    }

    if !primitive.is_points() && primitive.attribute(POSITION).is_none() {
        out.push(
            policy(
                "policy/missing-position",
                format!("{}: Missing POSITION attribute", owner),
                at("attributes"),
            )
            .with_suggestion("Every non-POINTS primitive needs vertex positions"),
        );
    }

    if !ctx.config.require_texcoord0 {
        return;
    }

    match primitive.attribute(TEXCOORD_0) {
        None => {
            debug!(mesh = m, primitive = p, "TEXCOORD_0 missing");
            out.push(
                policy(
                    "policy/texcoord-missing",
                    format!("{}: Missing TEXCOORD_0 (UV coordinates)", owner),
                    at("attributes"),
                )
                .with_suggestion("Re-export with UVs, or unwrap the mesh in the authoring tool"),
            );
            if ctx.config.fix {
                out.fixes.push(FixRecord::missing_texcoord(m, p));
            }
        }
        Some(Field::Present(index)) => {
            // Out-of-range indices are the reference pass's to report.
            let Some(accessor) = document.accessors.resolve(*index) else {
                return;
            };
            if accessor.element() != Some(AccessorType::Vec2) {
                out.push(
                    policy(
                        "policy/texcoord-not-vec2",
                        format!(
                            "{}: TEXCOORD_0 accessor {} must be VEC2, found {}",
                            owner,
                            index,
                            accessor.element_type.describe()
                        ),
                        at("attributes.TEXCOORD_0"),
                    )
                    .with_actual_value(accessor.element_type.describe())
                    .with_expected_range("VEC2"),
                );
            }
        }
        Some(_) => {}
    }
}

trait DescribeKind {
    fn describe_kind(&self) -> String;
}

impl<T> DescribeKind for Field<Vec<T>> {
    fn describe_kind(&self) -> String {
        match self {
            Field::Absent => "missing".to_string(),
            Field::Null => "null".to_string(),
            Field::Invalid(raw) => json_kind(raw).to_string(),
            Field::Present(items) => format!("{} entries", items.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::passes::test_support::{document, messages, rule_ids, run, run_with};
    use crate::report::FixKind;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn scaffold(extra: Value) -> Value {
        let mut root = json!({
            "asset": { "version": "2.0" },
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }]
        });
        if let (Some(root), Some(extra)) = (root.as_object_mut(), extra.as_object()) {
            root.extend(extra.clone());
        }
        root
    }

    fn uv_mesh(attributes: Value) -> Value {
        scaffold(json!({
            "accessors": [
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3" },
                { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC2" }
            ],
            "meshes": [{ "primitives": [{ "attributes": attributes }] }]
        }))
    }

    #[test]
    fn test_clean_document() {
        let out = run(&PolicyPass, uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 1 })));
        assert!(out.findings.is_empty(), "{:?}", out.findings);
    }

    #[test]
    fn test_top_level_structure() {
        let out = run(&PolicyPass, json!({ "asset": {}, "scenes": [], "nodes": 3 }));
        assert_eq!(
            messages(&out),
            vec![
                "Missing asset.version",
                "Missing or empty scenes array",
                "Missing or empty nodes array",
            ]
        );
        assert_eq!(out.findings[2].actual_value.as_deref(), Some("number"));
    }

    #[test]
    fn test_enum_values() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "accessors": [
                    { "componentType": 5124, "type": "VEC5", "count": 1 },
                    { "componentType": "float", "type": 3, "count": -1 },
                    { "count": 2 }
                ]
            })),
        );
        assert_eq!(
            messages(&out),
            vec![
                "Accessor 0: Invalid componentType 5124",
                "Accessor 0: Invalid type VEC5",
                "Accessor 1: Invalid componentType \"float\"",
                "Accessor 1: Invalid type 3",
                "Accessor 1: Invalid count -1",
                "Accessor 2: Missing componentType",
                "Accessor 2: Missing type",
            ]
        );
    }

    #[test]
    fn test_bounds_shape() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "accessors": [
                    { "componentType": 5126, "type": "VEC3", "count": 1, "min": [], "max": [] },
                    { "componentType": 5126, "type": "VEC3", "count": 1, "min": [0, 0, 0], "max": [1, 1] },
                    { "componentType": 5126, "type": "VEC2", "count": 1, "min": ["a", "b"] }
                ]
            })),
        );
        assert_eq!(rule_ids(&out), vec!["policy/bounds-length", "policy/invalid-bounds"]);
        assert_eq!(
            messages(&out)[0],
            "Accessor 1: max has 2 values, expected 3 for VEC3"
        );
        assert_eq!(out.findings[0].expected_range.as_deref(), Some("3"));
    }

    #[test]
    fn test_byte_lengths() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "bufferViews": [{ "buffer": 0 }, { "buffer": 0, "byteLength": -1 }],
                "buffers": [{ "byteLength": 0 }, { "uri": 7, "byteLength": 4 }]
            })),
        );
        assert_eq!(
            messages(&out),
            vec![
                "BufferView 0: Missing byteLength",
                "BufferView 1: Invalid byteLength -1",
                "Buffer 0: Invalid byteLength 0",
                "Buffer 1: uri must be a string, found number",
            ]
        );
    }

    #[test]
    fn test_malformed_entries_and_collections() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "accessors": [null, 4],
                "materials": "none"
            })),
        );
        assert_eq!(
            messages(&out),
            vec![
                "Accessor 0: expected an object, found null",
                "Accessor 1: expected an object, found number",
                "materials: expected an array, found string",
            ]
        );
    }

    #[test]
    fn test_empty_mesh() {
        let out = run(
            &PolicyPass,
            scaffold(json!({ "meshes": [{ "primitives": [] }, { "name": "no-prims" }] })),
        );
        assert_eq!(messages(&out), vec!["Mesh 0: No primitives", "Mesh 1: No primitives"]);
    }

    #[test]
    fn test_missing_position_except_points() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "accessors": [{ "componentType": 5126, "type": "VEC2", "count": 1 }],
                "meshes": [{ "primitives": [
                    { "attributes": { "TEXCOORD_0": 0 } },
                    { "attributes": { "TEXCOORD_0": 0 }, "mode": 1 },
                    { "attributes": { "TEXCOORD_0": 0 }, "mode": 4 }
                ] }]
            })),
        );
        assert_eq!(
            messages(&out),
            vec![
                "Mesh 0 Primitive 0: Missing POSITION attribute",
                "Mesh 0 Primitive 2: Missing POSITION attribute",
            ]
        );
    }

    #[test]
    fn test_invalid_mode() {
        let out = run(
            &PolicyPass,
            scaffold(json!({
                "accessors": [{ "componentType": 5126, "type": "VEC2", "count": 1 }],
                "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0, "TEXCOORD_0": 0 }, "mode": 9 }] }]
            })),
        );
        assert_eq!(rule_ids(&out), vec!["policy/invalid-mode"]);
    }

    #[test]
    fn test_texcoord_missing_is_error() {
        let out = run(&PolicyPass, uv_mesh(json!({ "POSITION": 0 })));
        assert_eq!(rule_ids(&out), vec!["policy/texcoord-missing"]);
        assert!(out.findings[0].message.contains("TEXCOORD_0"));
        assert!(out.findings[0].is_uv_finding());
        assert!(out.fixes.is_empty());
    }

    #[test]
    fn test_texcoord_missing_records_manual_fix() {
        let config = ValidatorConfig::default().with_fix(true);
        let out = run_with(&PolicyPass, &document(uv_mesh(json!({ "POSITION": 0 }))), &config);
        assert_eq!(out.fixes.len(), 1);
        assert_eq!(out.fixes[0].kind, FixKind::MissingTexcoord);
        assert!(!out.fixes[0].kind.is_auto_fixable());
    }

    #[test]
    fn test_texcoord_must_be_vec2() {
        let out = run(&PolicyPass, uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 0 })));
        assert_eq!(
            messages(&out),
            vec!["Mesh 0 Primitive 0: TEXCOORD_0 accessor 0 must be VEC2, found VEC3"]
        );
    }

    #[test]
    fn test_texcoord_out_of_range_left_to_reference_pass() {
        let out = run(&PolicyPass, uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 9 })));
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_uv_policy_can_be_disabled() {
        let config = ValidatorConfig {
            require_texcoord0: false,
            ..ValidatorConfig::default()
        };
        let out = run_with(&PolicyPass, &document(uv_mesh(json!({ "POSITION": 0 }))), &config);
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_malformed_primitive() {
        let out = run(&PolicyPass, scaffold(json!({ "meshes": [{ "primitives": [42] }] })));
        assert_eq!(
            messages(&out),
            vec!["Mesh 0 Primitive 0: expected an object, found number"]
        );
    }

    #[test]
    fn test_non_integer_accessor_offset() {
        for offset in [json!("abc"), json!(4.5), json!(-1e30)] {
            let mut root = uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 1 }));
            root["accessors"][0]["byteOffset"] = offset;
            let out = run(&PolicyPass, root);
            assert_eq!(rule_ids(&out), vec!["policy/invalid-byte-offset"]);
            assert_eq!(out.findings[0].kind, FindingKind::Structural);
        }

        let mut root = uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 1 }));
        root["accessors"][0]["byteOffset"] = json!("abc");
        assert_eq!(
            messages(&run(&PolicyPass, root)),
            vec!["Accessor 0: Invalid byteOffset \"abc\""]
        );
    }

    #[test]
    fn test_integer_accessor_offset_left_to_layout() {
        let mut root = uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 1 }));
        root["accessors"][0]["byteOffset"] = json!(-4);
        assert!(run(&PolicyPass, root).findings.is_empty());
    }

    #[test]
    fn test_image_uri_must_be_string() {
        let mut root = uv_mesh(json!({ "POSITION": 0, "TEXCOORD_0": 1 }));
        root["images"] = json!([{ "uri": 42 }, { "uri": "albedo.png" }]);
        let out = run(&PolicyPass, root);
        assert_eq!(rule_ids(&out), vec!["policy/invalid-uri"]);
        assert_eq!(
            messages(&out),
            vec!["Image 0: uri must be a string, found number"]
        );
    }
}
