//! Pass registry for managing and running validation passes.

use std::collections::HashSet;

use meshgate_model::Document;
use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::config::ValidatorConfig;
use crate::passes::{all_passes, PassContext, PassOutput, ValidationPass};
use crate::payload::PayloadResolver;
use crate::report::{FindingKind, ValidationReport};

/// Registry of validation passes.
pub struct PassRegistry {
    passes: Vec<Box<dyn ValidationPass>>,
    disabled_passes: HashSet<String>,
    enabled_only: Option<HashSet<String>>,
}

impl PassRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            disabled_passes: HashSet::new(),
            enabled_only: None,
        }
    }

    /// Creates a registry with the built-in passes registered.
    pub fn default_passes() -> Self {
        let mut registry = Self::new();
        for pass in all_passes() {
            registry.register(pass);
        }
        registry
    }

    /// Creates the built-in registry filtered by a config.
    pub fn from_config(config: &ValidatorConfig) -> Self {
        let mut registry = Self::default_passes();
        for id in &config.disabled_passes {
            registry.disable_pass(id);
        }
        if let Some(only) = &config.only_passes {
            let ids: Vec<&str> = only.iter().map(String::as_str).collect();
            registry.enable_only(&ids);
        }
        registry
    }

    /// Registers a new pass. Merge order is registration order.
    pub fn register(&mut self, pass: Box<dyn ValidationPass>) {
        self.passes.push(pass);
    }

    /// Disables a pass by ID.
    pub fn disable_pass(&mut self, pass_id: &str) {
        self.disabled_passes.insert(pass_id.to_string());
    }

    /// Enables only the named passes (disables all others).
    pub fn enable_only(&mut self, pass_ids: &[&str]) {
        self.enabled_only = Some(pass_ids.iter().map(|s| s.to_string()).collect());
    }

    /// Returns all registered passes.
    pub fn passes(&self) -> &[Box<dyn ValidationPass>] {
        &self.passes
    }

    /// Returns pass metadata for documentation/introspection.
    pub fn metadata(&self) -> Vec<PassMetadata> {
        self.passes
            .iter()
            .map(|p| PassMetadata {
                id: p.id().to_string(),
                description: p.description().to_string(),
                kind: p.kind(),
                enabled: self.is_pass_enabled(p.id()),
            })
            .collect()
    }

    /// Returns the number of registered passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Returns true if no passes are registered.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Checks if a pass is enabled.
    fn is_pass_enabled(&self, pass_id: &str) -> bool {
        if self.disabled_passes.contains(pass_id) {
            return false;
        }
        if let Some(ref enabled) = self.enabled_only {
            return enabled.contains(pass_id);
        }
        true
    }

    /// Runs every enabled pass and merges the outputs in registration order.
    ///
    /// With `config.parallel` the passes run on the rayon pool. The merged
    /// report is identical either way.
    pub fn validate(
        &self,
        document: &Document,
        config: &ValidatorConfig,
        resolver: &dyn PayloadResolver,
    ) -> ValidationReport {
        let ctx = PassContext { config, resolver };
        let enabled: Vec<&dyn ValidationPass> = self
            .passes
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| self.is_pass_enabled(p.id()))
            .collect();

        let run = |pass: &&dyn ValidationPass| -> (&'static str, PassOutput) {
            let _span = info_span!("pass", id = pass.id()).entered();
            let output = pass.run(document, &ctx);
            debug!(
                findings = output.findings.len(),
                fixes = output.fixes.len(),
                "pass complete"
            );
            (pass.id(), output)
        };
        let outputs: Vec<(&'static str, PassOutput)> = if config.parallel {
            enabled.par_iter().map(run).collect()
        } else {
            enabled.iter().map(run).collect()
        };

        let mut report = ValidationReport::new(document.stats());
        report.uv_policy_enforced = config.require_texcoord0;
        for (id, output) in outputs {
            report.absorb(id, output);
        }
        report
    }
}

impl Default for PassRegistry {
    fn default() -> Self {
        Self::default_passes()
    }
}

/// Metadata about a pass for documentation/introspection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PassMetadata {
    /// Pass identifier.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Invariant class of the pass's findings.
    pub kind: FindingKind,
    /// Whether the pass runs under the current filters.
    pub enabled: bool,
}
