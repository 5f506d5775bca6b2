//! YAML project manifest
//!
//! ```yaml
//! libraries:
//!   - id: lib-1
//!     name: Helpers
//!     import_name: helpers
//!     file: libs/helpers.js
//! transformations:
//!   - id: t1
//!     name: Enrich
//!     code: "export function transformEvent(e) { return e; }"
//!     imports: [helpers]
//!     tests:
//!       - name: smoke
//!         input: fixtures/in
//!         output: fixtures/out
//! ```
//!
//! Relative `file` and test paths resolve against the manifest's directory.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tfsync_graph::{
    ImportMetadata, LibraryResource, Resource, ResourceGraph, TestSuite, TransformationResource,
    Urn,
};

pub const DEFAULT_PROJECT_FILE: &str = "tfsync.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
    #[serde(default)]
    pub transformations: Vec<TransformationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub language: Option<String>,
    pub code: Option<String>,
    pub file: Option<PathBuf>,
    pub import_name: String,
    /// Import names of other libraries this one uses
    #[serde(default)]
    pub imports: Vec<String>,
    pub import: Option<ImportEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformationEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub language: Option<String>,
    pub code: Option<String>,
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub tests: Vec<SuiteEntry>,
    pub import: Option<ImportEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteEntry {
    pub name: String,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

/// Claim on an existing remote resource
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportEntry {
    pub remote_id: String,
    #[serde(default)]
    pub workspace_id: String,
}

impl From<&ImportEntry> for ImportMetadata {
    fn from(entry: &ImportEntry) -> Self {
        ImportMetadata::new(&entry.remote_id, &entry.workspace_id)
    }
}

/// Read a manifest file and build the local graph
///
/// # Errors
///
/// Fails on unreadable or malformed manifests and on invalid declarations.
pub fn load_project(path: &Path) -> Result<ResourceGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading project manifest {}", path.display()))?;
    let manifest: Manifest = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing project manifest {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    build_graph(&manifest, base)
}

/// Build the local graph from a parsed manifest
///
/// # Errors
///
/// Fails on duplicate IDs or import names, `code`/`file` misuse, unreadable
/// code files and imports naming no declared library.
pub fn build_graph(manifest: &Manifest, base: &Path) -> Result<ResourceGraph> {
    let mut graph = ResourceGraph::new();
    let mut by_import_name: BTreeMap<&str, Urn> = BTreeMap::new();
    let mut ids = BTreeSet::new();

    for lib in &manifest.libraries {
        if !ids.insert(("library", lib.id.as_str())) {
            bail!("duplicate library id '{}'", lib.id);
        }
        if lib.import_name.is_empty() {
            bail!("library {} has no import_name", lib.id);
        }
        let urn = Urn::library(&lib.id);
        if by_import_name.insert(&lib.import_name, urn.clone()).is_some() {
            bail!("import name '{}' is declared twice", lib.import_name);
        }

        let code = read_code(&lib.id, lib.code.as_deref(), lib.file.as_deref(), base)?;
        let mut payload = LibraryResource::new(&lib.id, &lib.name, code, &lib.import_name)
            .with_description(&lib.description);
        if let Some(language) = &lib.language {
            payload = payload.with_language(language);
        }
        let mut resource = Resource::library(payload);
        if let Some(import) = &lib.import {
            resource = resource.with_import(import.into());
        }
        graph.add_resource(resource);
    }

    for t in &manifest.transformations {
        if !ids.insert(("transformation", t.id.as_str())) {
            bail!("duplicate transformation id '{}'", t.id);
        }
        let code = read_code(&t.id, t.code.as_deref(), t.file.as_deref(), base)?;
        let mut payload =
            TransformationResource::new(&t.id, &t.name, code).with_description(&t.description);
        if let Some(language) = &t.language {
            payload = payload.with_language(language);
        }
        for suite in &t.tests {
            let mut test = TestSuite::new(&suite.name, &suite.input).with_spec_dir(base);
            if let Some(output) = &suite.output {
                test = test.with_output(output);
            }
            payload = payload.with_test(test);
        }
        let mut resource = Resource::transformation(payload);
        if let Some(import) = &t.import {
            resource = resource.with_import(import.into());
        }
        graph.add_resource(resource);
    }

    let edges = manifest
        .libraries
        .iter()
        .map(|l| (Urn::library(&l.id), &l.imports))
        .chain(
            manifest
                .transformations
                .iter()
                .map(|t| (Urn::transformation(&t.id), &t.imports)),
        );
    for (from, imports) in edges {
        for import in imports {
            let Some(to) = by_import_name.get(import.as_str()) else {
                bail!("{from} imports unknown library '{import}'");
            };
            graph.add_dependency(&from, to);
        }
    }

    tracing::debug!(
        resources = graph.len(),
        dependencies = graph.edge_count(),
        "project loaded"
    );
    Ok(graph)
}

fn read_code(id: &str, code: Option<&str>, file: Option<&Path>, base: &Path) -> Result<String> {
    match (code, file) {
        (Some(code), None) => Ok(code.to_string()),
        (None, Some(file)) => {
            let path = if file.is_absolute() {
                file.to_path_buf()
            } else {
                base.join(file)
            };
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading code for {id} from {}", path.display()))
        }
        (Some(_), Some(_)) => bail!("{id}: set either code or file, not both"),
        (None, None) => bail!("{id}: one of code or file is required"),
    }
}
