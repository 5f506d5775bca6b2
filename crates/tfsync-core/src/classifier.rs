//! Modification classification
//!
//! Labels transformation and library URNs as modified when their name or
//! code differs from the remote counterpart, or when no counterpart exists.

use crate::error::PlanError;
use std::collections::BTreeSet;
use tfsync_graph::{Diff, RemoteState, Resource, ResourceGraph, ResourceKind, ResourcePayload, Urn};

/// Modified URNs, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Modified transformation URNs
    pub transformations: BTreeSet<Urn>,
    /// Modified library URNs
    pub libraries: BTreeSet<Urn>,
}

impl Classification {
    #[must_use]
    pub fn is_modified(&self, urn: &Urn) -> bool {
        self.transformations.contains(urn) || self.libraries.contains(urn)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty() && self.libraries.is_empty()
    }

    fn insert(&mut self, urn: &Urn, kind: ResourceKind) {
        match kind {
            ResourceKind::Transformation => self.transformations.insert(urn.clone()),
            ResourceKind::Library => self.libraries.insert(urn.clone()),
        };
    }
}

/// Classify every transformation and library named by `diff`.
///
/// # Errors
///
/// Returns [`PlanError::PayloadMismatch`] when a local node's payload does
/// not match its URN kind, and [`PlanError::KindMismatch`] when local and
/// remote payloads of one URN are of different kinds.
pub fn classify(
    diff: &Diff,
    remote: &ResourceGraph,
    local: &ResourceGraph,
    remote_state: &RemoteState,
) -> Result<Classification, PlanError> {
    let mut out = Classification::default();

    for urn in &diff.new_resources {
        if let Some(kind) = tracked_kind(local, urn)? {
            out.insert(urn, kind);
        }
    }

    for urn in &diff.updated_resources {
        let Some(kind) = tracked_kind(local, urn)? else {
            continue;
        };
        let counterpart = remote.get_resource(urn).map(|r| &r.payload);
        if content_differs(local, urn, counterpart)? {
            out.insert(urn, kind);
        }
    }

    for urn in &diff.importable_resources {
        let Some(kind) = tracked_kind(local, urn)? else {
            continue;
        };
        let counterpart = local
            .get_resource(urn)
            .and_then(Resource::import_remote_id)
            .and_then(|id| remote_state.get_unmanaged(id))
            .map(|s| &s.payload);
        if content_differs(local, urn, counterpart)? {
            out.insert(urn, kind);
        }
    }

    tracing::debug!(
        transformations = out.transformations.len(),
        libraries = out.libraries.len(),
        "classified modified resources"
    );
    Ok(out)
}

/// Kind of a local transformation/library node, checking its payload agrees
fn tracked_kind(local: &ResourceGraph, urn: &Urn) -> Result<Option<ResourceKind>, PlanError> {
    let Some(expected) = urn.kind() else {
        return Ok(None);
    };
    let Some(resource) = local.get_resource(urn) else {
        return Ok(None);
    };
    if resource.payload.kind() != Some(expected) {
        return Err(PlanError::PayloadMismatch {
            urn: urn.clone(),
            expected,
        });
    }
    Ok(Some(expected))
}

/// No counterpart counts as differing
fn content_differs(
    local: &ResourceGraph,
    urn: &Urn,
    remote: Option<&ResourcePayload>,
) -> Result<bool, PlanError> {
    let (Some(local), Some(remote)) = (local.get_resource(urn), remote) else {
        return Ok(true);
    };
    local
        .payload
        .same_content(remote)
        .map(|same| !same)
        .ok_or_else(|| PlanError::KindMismatch(urn.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tfsync_graph::{
        compute_diff, DiffOptions, ImportMetadata, LibraryResource, ResourceOutput, ResourceState,
        TransformationResource,
    };

    fn lib(code: &str) -> Resource {
        Resource::library(LibraryResource::new("lib-1", "Lib", code, "lib1"))
    }

    fn run(remote: &ResourceGraph, local: &ResourceGraph, state: &RemoteState) -> Classification {
        let diff = compute_diff(remote, local, &DiffOptions::default());
        classify(&diff, remote, local, state).unwrap()
    }

    #[test]
    fn new_resources_are_modified() {
        let mut local = ResourceGraph::new();
        local.add_resource(lib("v1"));
        let out = run(&ResourceGraph::new(), &local, &RemoteState::new());
        assert!(out.libraries.contains(&Urn::library("lib-1")));
        assert!(out.transformations.is_empty());
    }

    #[test]
    fn cosmetic_updates_are_not_modified() {
        let mut remote = ResourceGraph::new();
        remote.add_resource(lib("v1"));
        let mut local = ResourceGraph::new();
        local.add_resource(Resource::library(
            LibraryResource::new("lib-1", "Lib", "v1", "renamed").with_description("new"),
        ));

        let out = run(&remote, &local, &RemoteState::new());
        assert!(out.is_empty());
    }

    #[test]
    fn code_updates_are_modified() {
        let mut remote = ResourceGraph::new();
        remote.add_resource(lib("v1"));
        let mut local = ResourceGraph::new();
        local.add_resource(lib("v2"));

        let out = run(&remote, &local, &RemoteState::new());
        assert_eq!(out.libraries.into_iter().collect::<Vec<_>>(), vec![Urn::library("lib-1")]);
    }

    #[test]
    fn importable_compares_against_unmanaged_counterpart() {
        let t = TransformationResource::new("t1", "T1", "code");
        let mut local = ResourceGraph::new();
        local.add_resource(Resource::transformation(t.clone()).with_import(ImportMetadata::new("rem-1", "")));

        let mut state = RemoteState::new();
        let mut remote_payload = t.clone();
        remote_payload.id = "rem-1".to_string();
        state.add_unmanaged(
            "rem-1",
            ResourceState::new(ResourcePayload::Transformation(remote_payload), ResourceOutput::new("rem-1", "ver-1")),
        );
        let out = run(&ResourceGraph::new(), &local, &state);
        assert!(out.is_empty());

        let mut changed = RemoteState::new();
        changed.add_unmanaged(
            "rem-1",
            ResourceState::new(
                ResourcePayload::Transformation(TransformationResource::new("rem-1", "T1", "old")),
                ResourceOutput::new("rem-1", "ver-1"),
            ),
        );
        let out = run(&ResourceGraph::new(), &local, &changed);
        assert!(out.transformations.contains(&Urn::transformation("t1")));

        let out = run(&ResourceGraph::new(), &local, &RemoteState::new());
        assert!(out.transformations.contains(&Urn::transformation("t1")));
    }

    #[test]
    fn mismatched_payload_fails_loudly() {
        let mut local = ResourceGraph::new();
        local.add_resource(Resource::new(
            Urn::transformation("t1"),
            ResourcePayload::Library(LibraryResource::new("t1", "x", "y", "z")),
        ));
        let diff = compute_diff(&ResourceGraph::new(), &local, &DiffOptions::default());
        let err = classify(&diff, &ResourceGraph::new(), &local, &RemoteState::new()).unwrap_err();
        assert!(matches!(err, PlanError::PayloadMismatch { .. }));
    }

    #[test]
    fn other_resource_types_are_ignored() {
        let mut local = ResourceGraph::new();
        local.add_resource(Resource::new(
            Urn::new("destination", "d1"),
            ResourcePayload::Other(serde_json::json!({ "name": "d" })),
        ));
        let out = run(&ResourceGraph::new(), &local, &RemoteState::new());
        assert!(out.is_empty());
    }
}
