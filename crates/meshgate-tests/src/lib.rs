//! meshgate End-to-End Test Infrastructure
//!
//! Integration tests for the full check flow: load a `.gltf`/`.glb` from
//! disk, run every validation pass, apply fixes and write the result back.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p meshgate-tests
//! ```
//!
//! Fixtures are built in code and written to a temporary directory per test,
//! so no asset files are checked in.

pub mod fixtures;
pub mod harness;
