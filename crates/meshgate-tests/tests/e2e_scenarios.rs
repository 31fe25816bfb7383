//! End-to-end check scenarios over `.gltf` files on disk.
//!
//! Each test writes a fixture document and its `mesh.bin` payload into a
//! temporary directory, then runs the full per-file check flow.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p meshgate-tests --test e2e_scenarios
//! ```

use pretty_assertions::assert_eq;

use serde_json::json;

use meshgate_cli::commands::check::{check_loaded, exit_status};
use meshgate_lint::{
    FindingKind, FixKind, FixRecord, FixTarget, LoadedAsset, Severity, ValidatorConfig,
};
use meshgate_tests::fixtures::{GltfFixture, BIN_NAME};
use meshgate_tests::harness::{expect_report, read_bytes, reload_json, rule_ids, TestHarness};

// ============================================================================
// Clean document
// ============================================================================

#[test]
fn test_clean_document_passes_every_pass() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::clean(), "triangle");

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert!(output.passed);
    assert!(report.ok);
    assert!(report.errors.is_empty(), "errors: {:?}", report.errors);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    assert_eq!(
        report.passes_run,
        vec!["reference", "layout", "policy", "buffer-size"]
    );
    assert!(!output.saved);

    let protections = output.protections.expect("protections for loaded file");
    assert!(protections.uv_coverage_complete);
    assert!(protections.layout_clean);
    assert!(protections.structure_intact);
}

#[test]
fn test_clean_document_stats() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::clean(), "triangle");

    let output = harness.check(&path);
    let stats = &expect_report(&output).stats;
    assert_eq!(stats.accessors, 2);
    assert_eq!(stats.buffer_views, 2);
    assert_eq!(stats.buffers, 1);
    assert_eq!(stats.meshes, 1);
    assert_eq!(stats.materials, 1);
    assert_eq!(stats.textures, 1);
    assert_eq!(stats.images, 1);
}

// ============================================================================
// UV policy
// ============================================================================

#[test]
fn test_missing_texcoord_is_single_policy_error() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::without_texcoord(), "no_uv");

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert!(!output.passed);
    assert_eq!(rule_ids(&report.errors), vec!["policy/texcoord-missing"]);
    let error = &report.errors[0];
    assert_eq!(error.kind, FindingKind::Policy);
    assert!(error.message.contains("TEXCOORD_0"));
    assert_eq!(report.uv_errors().count(), 1);
    assert!(!report.protections().uv_coverage_complete);
}

#[test]
fn test_missing_texcoord_fix_mode_leaves_file_untouched() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::without_texcoord(), "no_uv");
    let before = read_bytes(&path);

    let output = harness.check_and_fix(&path);
    let report = expect_report(&output);

    assert!(!output.passed);
    assert_eq!(report.fixes.len(), 1);
    assert_eq!(report.fixes[0].kind, FixKind::MissingTexcoord);
    assert_eq!(
        report.fixes[0].target,
        FixTarget::Primitive { mesh: 0, primitive: 0 }
    );
    assert!(!output.saved);
    assert_eq!(read_bytes(&path), before);

    let summary = output.fix_summary.as_ref().expect("manual fixes listed in fix mode");
    assert!(summary.applied.is_empty());
    assert_eq!(summary.manual.len(), 1);
    assert_eq!(summary.manual[0].kind, FixKind::MissingTexcoord);
}

#[test]
fn test_uv_policy_can_be_disabled() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::without_texcoord(), "no_uv");

    let config = ValidatorConfig {
        require_texcoord0: false,
        ..Default::default()
    };
    let output = meshgate_cli::commands::check::check_file(&path, &config);
    let report = expect_report(&output);

    assert!(output.passed);
    assert!(!report.uv_policy_enforced);
}

// ============================================================================
// Byte layout
// ============================================================================

#[test]
fn test_short_buffer_view_is_single_layout_error() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::short_position_view(), "short");

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert!(!output.passed);
    assert_eq!(rule_ids(&report.errors), vec!["layout/footprint"]);
    let error = &report.errors[0];
    assert_eq!(error.kind, FindingKind::Layout);
    assert!(error.message.contains("needs 1200 bytes (100 x 12)"));
    assert!(error.message.contains("byteLength is 800"));
    assert!(error.message.contains("400 bytes short"));
    assert!(report.warnings.is_empty());
    assert!(!report.protections().layout_clean);
}

#[test]
fn test_out_of_range_view_reported_once() {
    let harness = TestHarness::new();
    let mut fixture = GltfFixture::clean();
    fixture.document["accessors"][1]["bufferView"] = json!(7);
    let path = harness.write_gltf(&fixture, "dangling");

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert_eq!(rule_ids(&report.errors), vec!["reference/out-of-range"]);
    assert_eq!(
        report.errors[0].message,
        "Accessor 1: Invalid bufferView reference 7"
    );
    assert!(!report.protections().structure_intact);
}

// ============================================================================
// Buffer size reconciliation
// ============================================================================

#[test]
fn test_stale_buffer_length_warns_without_fix() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::stale_buffer_length(), "stale");
    let before = read_bytes(&path);

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert!(output.passed);
    assert!(report.errors.is_empty());
    assert_eq!(rule_ids(&report.warnings), vec!["buffer-size/mismatch"]);
    assert_eq!(report.warnings[0].severity, Severity::Warning);
    assert_eq!(
        report.warnings[0].message,
        "Buffer 0: Size mismatch - declared: 500, actual: 512"
    );
    assert!(report.fixes.is_empty());
    assert!(!output.saved);
    assert_eq!(read_bytes(&path), before);
}

#[test]
fn test_stale_buffer_length_fixed_and_saved() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::stale_buffer_length(), "stale");

    let output = harness.check_and_fix(&path);
    let report = expect_report(&output);

    assert!(output.passed);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(
        report.fixes,
        vec![FixRecord::buffer_byte_length(0, Some(500), 512)]
    );
    assert_eq!(report.fixes[0].old_value, Some(500));
    assert_eq!(report.fixes[0].new_value, Some(512));

    let summary = output.fix_summary.as_ref().expect("fix summary");
    assert_eq!(summary.applied.len(), 1);
    assert!(output.saved);
    assert!(output.save_error.is_none());

    let reloaded = reload_json(&path);
    assert_eq!(reloaded["buffers"][0]["byteLength"], 512);
    assert_eq!(reloaded["buffers"][0]["uri"], BIN_NAME);
    assert_eq!(reloaded["asset"]["generator"], "meshgate-tests");
}

#[test]
fn test_fixed_document_rechecks_clean() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::stale_buffer_length(), "stale");

    harness.check_and_fix(&path);
    let second = harness.check_and_fix(&path);
    let report = expect_report(&second);

    assert!(second.passed);
    assert!(report.warnings.is_empty());
    assert!(report.fixes.is_empty());
    assert!(!second.saved);
}

#[test]
fn test_missing_payload_is_error() {
    let harness = TestHarness::new();
    let mut fixture = GltfFixture::clean();
    fixture.payloads.clear();
    let path = harness.write_gltf(&fixture, "orphan");

    let output = harness.check(&path);
    let report = expect_report(&output);

    assert!(!output.passed);
    assert_eq!(rule_ids(&report.errors), vec!["buffer-size/not-found"]);
    assert_eq!(
        report.errors[0].message,
        format!("Buffer 0: Referenced file not found: {}", BIN_NAME)
    );
}

#[test]
fn test_unwritable_target_keeps_verdict() {
    let harness = TestHarness::new();
    let path = harness.write_gltf(&GltfFixture::stale_buffer_length(), "stale");
    let (mut source, document) = LoadedAsset::load(&path).unwrap().into_parts();

    // A directory in the document's place cannot be overwritten.
    let blocked = harness.path().join("blocked.gltf");
    std::fs::create_dir(&blocked).unwrap();
    source.path = blocked;

    let config = ValidatorConfig::default().with_fix(true);
    let output = check_loaded(&source, document, &config);
    let report = expect_report(&output);

    assert!(output.passed);
    assert!(!output.saved);
    assert!(output.save_error.is_some());
    assert!(output.fix_error.is_none());
    assert_eq!(rule_ids(&report.warnings), vec!["buffer-size/mismatch"]);
    assert_eq!(output.fix_summary.as_ref().map(|s| s.applied.len()), Some(1));
    assert_eq!(exit_status(&[output]), 0);

    // The original file is untouched.
    assert_eq!(reload_json(&path)["buffers"][0]["byteLength"], 500);
}

// ============================================================================
// Malformed sub-fields
// ============================================================================

#[test]
fn test_non_integer_accessor_offset_fails() {
    for offset in [json!("abc"), json!(4.5), json!(-1e30)] {
        let harness = TestHarness::new();
        let mut fixture = GltfFixture::clean();
        fixture.document["accessors"][0]["byteOffset"] = offset.clone();
        let path = harness.write_gltf(&fixture, "offset");

        let output = harness.check(&path);
        let report = expect_report(&output);
        assert!(!output.passed, "byteOffset {} accepted", offset);
        assert_eq!(rule_ids(&report.errors), vec!["policy/invalid-byte-offset"]);
    }
}

#[test]
fn test_negative_accessor_offset_fails() {
    let harness = TestHarness::new();
    let mut fixture = GltfFixture::clean();
    fixture.document["accessors"][0]["byteOffset"] = json!(-4);
    let path = harness.write_gltf(&fixture, "offset");

    let output = harness.check(&path);
    assert_eq!(rule_ids(&expect_report(&output).errors), vec!["layout/offset"]);
}

#[test]
fn test_malformed_material_and_image_uri_fail() {
    let harness = TestHarness::new();
    let mut fixture = GltfFixture::clean();
    fixture.document["materials"] = json!([{ "pbrMetallicRoughness": 7 }]);
    fixture.document["images"] = json!([{ "uri": 42 }]);
    let path = harness.write_gltf(&fixture, "malformed");

    let output = harness.check(&path);
    let report = expect_report(&output);
    assert!(!output.passed);
    assert_eq!(
        rule_ids(&report.errors),
        vec!["reference/malformed", "policy/invalid-uri"]
    );
    assert!(!report.protections().structure_intact);
}

// ============================================================================
// Load failures
// ============================================================================

#[test]
fn test_invalid_json_is_load_failure() {
    let harness = TestHarness::new();
    let path = harness.path().join("broken.gltf");
    std::fs::write(&path, b"{ \"asset\": ").unwrap();

    let output = harness.check(&path);
    assert!(!output.passed);
    assert!(output.load_error.is_some());
    assert!(output.report.is_none());
}

#[test]
fn test_non_object_root_is_load_failure() {
    let harness = TestHarness::new();
    let path = harness.path().join("array.gltf");
    std::fs::write(&path, b"[1, 2, 3]").unwrap();

    let output = harness.check(&path);
    assert!(output.load_error.is_some());
}
