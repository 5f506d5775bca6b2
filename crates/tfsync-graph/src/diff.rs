//! Drift detection between a remote-derived graph and the local graph

use crate::graph::ResourceGraph;
use crate::urn::Urn;
use std::collections::BTreeSet;

/// Options controlling how imports are matched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Workspace the local project targets
    pub workspace_id: String,
}

impl DiffOptions {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
        }
    }
}

/// URN sets produced by [`compute_diff`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Declared locally, absent remotely, no usable import claim
    pub new_resources: BTreeSet<Urn>,
    /// Present on both sides with differing payloads
    pub updated_resources: BTreeSet<Urn>,
    /// Declared locally with import metadata for this workspace, absent from managed remote state
    pub importable_resources: BTreeSet<Urn>,
    /// Present remotely, no longer declared locally
    pub removed_resources: BTreeSet<Urn>,
}

impl Diff {
    /// Whether nothing drifted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_resources.is_empty()
            && self.updated_resources.is_empty()
            && self.importable_resources.is_empty()
            && self.removed_resources.is_empty()
    }
}

/// Compare `local` against the `remote` baseline
#[must_use]
pub fn compute_diff(remote: &ResourceGraph, local: &ResourceGraph, opts: &DiffOptions) -> Diff {
    let mut diff = Diff::default();

    for resource in local.resources() {
        let urn = &resource.urn;
        match remote.get_resource(urn) {
            Some(existing) => {
                if existing.payload != resource.payload {
                    diff.updated_resources.insert(urn.clone());
                }
            }
            None => {
                let importable = resource
                    .import
                    .as_ref()
                    .is_some_and(|i| !i.remote_id.is_empty() && i.matches_workspace(&opts.workspace_id));
                if importable {
                    diff.importable_resources.insert(urn.clone());
                } else {
                    diff.new_resources.insert(urn.clone());
                }
            }
        }
    }

    for resource in remote.resources() {
        if !local.contains(&resource.urn) {
            diff.removed_resources.insert(resource.urn.clone());
        }
    }

    diff
}
