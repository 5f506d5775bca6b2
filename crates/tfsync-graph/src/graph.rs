//! URN-keyed resource graph
//!
//! Edges point from a dependent to its dependency, so
//! `transformation:t1 -> transformation-library:lib-1` reads
//! "t1 imports lib-1". Every query returns URNs in sorted order.

use crate::resource::Resource;
use crate::urn::{ResourceKind, Urn};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    inner: DiGraph<Urn, ()>,
    nodes: HashMap<Urn, NodeIndex>,
    resources: BTreeMap<Urn, Resource>,
}

impl ResourceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, urn: &Urn) -> NodeIndex {
        if let Some(idx) = self.nodes.get(urn) {
            return *idx;
        }
        let idx = self.inner.add_node(urn.clone());
        self.nodes.insert(urn.clone(), idx);
        idx
    }

    /// Insert or replace a resource
    pub fn add_resource(&mut self, resource: Resource) {
        self.node(&resource.urn);
        self.resources.insert(resource.urn.clone(), resource);
    }

    /// Record that `from` depends on `to`.
    ///
    /// Either end may be added before its resource; repeated edges collapse.
    pub fn add_dependency(&mut self, from: &Urn, to: &Urn) {
        let a = self.node(from);
        let b = self.node(to);
        self.inner.update_edge(a, b, ());
    }

    /// All resources, sorted by URN
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources of one kind, sorted by URN
    pub fn resources_by_type(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources
            .values()
            .filter(move |r| r.urn.kind() == Some(kind))
    }

    #[must_use]
    pub fn get_resource(&self, urn: &Urn) -> Option<&Resource> {
        self.resources.get(urn)
    }

    #[must_use]
    pub fn contains(&self, urn: &Urn) -> bool {
        self.resources.contains_key(urn)
    }

    /// Direct dependencies of `urn`, sorted
    #[must_use]
    pub fn dependencies(&self, urn: &Urn) -> Vec<Urn> {
        self.neighbors(urn, Direction::Outgoing)
    }

    /// Direct dependents of `urn`, sorted
    #[must_use]
    pub fn dependents(&self, urn: &Urn) -> Vec<Urn> {
        self.neighbors(urn, Direction::Incoming)
    }

    fn neighbors(&self, urn: &Urn, dir: Direction) -> Vec<Urn> {
        let Some(idx) = self.nodes.get(urn) else {
            return Vec::new();
        };
        let mut out: Vec<Urn> = self
            .inner
            .neighbors_directed(*idx, dir)
            .map(|n| self.inner[n].clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Find a transformation or library by declared ID.
    ///
    /// Transformations are checked first.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Resource> {
        self.resources
            .get(&Urn::transformation(id))
            .or_else(|| self.resources.get(&Urn::library(id)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }
}
