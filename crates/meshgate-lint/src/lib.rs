//! Structural, referential and binary-layout integrity checks for glTF
//! documents, with buffer-size reconciliation and a narrow fixer.
//!
//! Four independent passes run over one [`Document`](meshgate_model::Document):
//!
//! - **reference**: every cross-index is defined and in bounds
//! - **layout**: accessor byte footprints, offsets and strides fit
//! - **policy**: required fields, enum values, POSITION and a VEC2 TEXCOORD_0
//! - **buffer-size**: declared buffer `byteLength` against the real payload
//!
//! # Example
//!
//! ```no_run
//! use meshgate_lint::{run, LoadedAsset, ValidatorConfig};
//! use std::path::Path;
//!
//! let (source, document) = LoadedAsset::load(Path::new("scene.gltf")).unwrap().into_parts();
//! let outcome = run(document, Box::new(source.resolver()), ValidatorConfig::default()).unwrap();
//!
//! if !outcome.passed() {
//!     for finding in &outcome.report.errors {
//!         eprintln!("ERROR: {} - {}", finding.rule_id, finding.message);
//!     }
//! }
//! ```

pub mod config;
pub mod fixer;
pub mod loader;
pub mod passes;
pub mod payload;
pub mod registry;
pub mod report;
pub mod session;

pub use config::{ConfigError, ValidatorConfig};
pub use fixer::{apply_fixes, FixError, FixSummary};
pub use loader::{build_glb, is_supported, AssetSource, Container, LoadError, LoadedAsset};
pub use passes::{PassContext, PassOutput, ValidationPass};
pub use payload::{FsPayloadResolver, MemoryPayloadResolver, PayloadError, PayloadResolver};
pub use registry::{PassMetadata, PassRegistry};
pub use report::{
    Finding, FindingKind, FixKind, FixRecord, FixTarget, Protections, ReportSummary, Severity,
    ValidationReport,
};
pub use session::{run, run_with_registry, RunOutcome, RunStage, Session, SessionError};
