//! Last synced remote state
//!
//! Managed entries are keyed by URN. Unmanaged entries (remote resources no
//! local spec has claimed yet) are keyed by their remote ID.

use crate::graph::ResourceGraph;
use crate::resource::{Resource, ResourcePayload};
use crate::urn::Urn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifiers returned by the remote for a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOutput {
    pub remote_id: String,
    #[serde(default)]
    pub version_id: String,
}

impl ResourceOutput {
    pub fn new(remote_id: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            version_id: version_id.into(),
        }
    }
}

/// One entry of the remote state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub payload: ResourcePayload,
    pub output: ResourceOutput,
    #[serde(default)]
    pub dependencies: Vec<Urn>,
}

impl ResourceState {
    #[must_use]
    pub fn new(payload: ResourcePayload, output: ResourceOutput) -> Self {
        Self {
            payload,
            output,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Urn>) -> Self {
        self.dependencies = dependencies;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteState {
    pub resources: BTreeMap<Urn, ResourceState>,
    #[serde(default)]
    pub unmanaged: BTreeMap<String, ResourceState>,
}

impl RemoteState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, urn: Urn, state: ResourceState) {
        self.resources.insert(urn, state);
    }

    pub fn add_unmanaged(&mut self, remote_id: impl Into<String>, state: ResourceState) {
        self.unmanaged.insert(remote_id.into(), state);
    }

    #[must_use]
    pub fn get(&self, urn: &Urn) -> Option<&ResourceState> {
        self.resources.get(urn)
    }

    #[must_use]
    pub fn get_unmanaged(&self, remote_id: &str) -> Option<&ResourceState> {
        self.unmanaged.get(remote_id)
    }

    /// Remote-derived graph of the managed entries
    #[must_use]
    pub fn to_graph(&self) -> ResourceGraph {
        let mut graph = ResourceGraph::new();
        for (urn, state) in &self.resources {
            graph.add_resource(Resource::new(urn.clone(), state.payload.clone()));
        }
        for (urn, state) in &self.resources {
            for dep in &state.dependencies {
                graph.add_dependency(urn, dep);
            }
        }
        graph
    }
}
