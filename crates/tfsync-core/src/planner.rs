//! Test planning
//!
//! Turns a mode, the local graph and the remote baseline into a
//! [`TestPlan`]: transformations to test (each bundled with the libraries it
//! needs) plus libraries no in-scope transformation needs.
//!
//! Every in-scope library lands either inside test units or in
//! `standalone_libraries`, never both.

use crate::classifier::{classify, Classification};
use crate::error::PlanError;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use tfsync_graph::{
    compute_diff, DiffOptions, LibraryResource, RemoteState, ResourceGraph, ResourceKind,
    TransformationResource, Urn,
};

/// Which resources a run tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Every transformation
    All,
    /// Modified transformations and consumers of modified libraries
    Modified,
    /// One transformation or library, by declared ID
    Single(String),
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Modified => f.write_str("modified"),
            Self::Single(id) => write!(f, "single({id})"),
        }
    }
}

/// A library selected by the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLibrary {
    /// Library URN
    pub urn: Urn,
    /// Local library definition
    pub library: LibraryResource,
}

/// One transformation and every library it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    /// Transformation URN
    pub urn: Urn,
    /// Local transformation definition
    pub transformation: TransformationResource,
    /// Sorted by URN
    pub libraries: Vec<PlannedLibrary>,
}

/// What a run tests, and which of it changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestPlan {
    /// Sorted by transformation URN
    pub test_units: Vec<TestUnit>,
    /// Sorted by URN
    pub standalone_libraries: Vec<PlannedLibrary>,
    /// Libraries classified as modified
    pub modified_library_urns: BTreeSet<Urn>,
    /// Transformations classified as modified
    pub modified_transformation_urns: BTreeSet<Urn>,
}

impl TestPlan {
    /// Whether the plan has nothing to run
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.test_units.is_empty() && self.standalone_libraries.is_empty()
    }

    #[must_use]
    pub fn is_modified(&self, urn: &Urn) -> bool {
        self.modified_library_urns.contains(urn) || self.modified_transformation_urns.contains(urn)
    }
}

/// Builds test plans against one local graph
#[derive(Debug)]
pub struct Planner<'a> {
    graph: &'a ResourceGraph,
}

impl<'a> Planner<'a> {
    #[inline]
    #[must_use]
    pub fn new(graph: &'a ResourceGraph) -> Self {
        Self { graph }
    }

    /// Build a plan, diffing the local graph against `remote_graph`.
    ///
    /// # Errors
    ///
    /// - [`PlanError::UnknownTarget`] if a single-mode ID names nothing
    /// - [`PlanError::PayloadMismatch`] if a transformation or library node
    ///   carries the wrong payload
    pub fn build_plan(
        &self,
        remote_graph: &ResourceGraph,
        remote_state: &RemoteState,
        mode: &Mode,
        workspace_id: &str,
    ) -> Result<TestPlan, PlanError> {
        let diff = compute_diff(remote_graph, self.graph, &DiffOptions::new(workspace_id));
        let classification = classify(&diff, remote_graph, self.graph, remote_state)?;
        self.plan(mode, &classification)
    }

    /// Build a plan from an existing classification
    ///
    /// # Errors
    ///
    /// See [`Planner::build_plan`].
    pub fn plan(&self, mode: &Mode, classification: &Classification) -> Result<TestPlan, PlanError> {
        let libraries = self.library_lookup()?;
        let transformations = self.transformation_lookup()?;

        let needs: BTreeMap<&Urn, BTreeSet<Urn>> = transformations
            .keys()
            .map(|urn| (*urn, self.library_closure(urn, &libraries)))
            .collect();
        let dependents_of = |lib: &Urn| -> Vec<&Urn> {
            needs
                .iter()
                .filter(|(_, libs)| libs.contains(lib))
                .map(|(t, _)| *t)
                .collect()
        };

        let mut selected: BTreeSet<&Urn> = BTreeSet::new();
        let mut standalone: BTreeSet<&Urn> = BTreeSet::new();

        match mode {
            Mode::All => {
                selected.extend(transformations.keys().copied());
                let reachable: BTreeSet<&Urn> = needs.values().flatten().collect();
                standalone.extend(libraries.keys().copied().filter(|l| !reachable.contains(l)));
            }
            Mode::Modified => {
                selected.extend(
                    transformations
                        .keys()
                        .copied()
                        .filter(|t| classification.transformations.contains(*t)),
                );
                for lib in libraries.keys().copied().filter(|l| classification.libraries.contains(*l)) {
                    let dependents = dependents_of(lib);
                    if dependents.is_empty() {
                        standalone.insert(lib);
                    } else {
                        selected.extend(dependents);
                    }
                }
            }
            Mode::Single(id) => {
                let target = self
                    .graph
                    .find_by_id(id)
                    .ok_or_else(|| PlanError::UnknownTarget(id.clone()))?;
                match target.urn.kind() {
                    Some(ResourceKind::Transformation) => {
                        if let Some((urn, _)) = transformations.get_key_value(&target.urn) {
                            selected.insert(*urn);
                        }
                    }
                    Some(ResourceKind::Library) => {
                        if let Some((lib, _)) = libraries.get_key_value(&target.urn) {
                            let dependents = dependents_of(lib);
                            if dependents.is_empty() {
                                standalone.insert(*lib);
                            } else {
                                selected.extend(dependents);
                            }
                        }
                    }
                    None => return Err(PlanError::UnknownTarget(id.clone())),
                }
            }
        }

        let planned = |urn: &Urn| -> Option<PlannedLibrary> {
            libraries.get(urn).map(|lib| PlannedLibrary {
                urn: urn.clone(),
                library: (*lib).clone(),
            })
        };

        let test_units: Vec<TestUnit> = selected
            .into_iter()
            .filter_map(|urn| {
                let transformation = transformations.get(urn)?;
                Some(TestUnit {
                    urn: urn.clone(),
                    transformation: (*transformation).clone(),
                    libraries: needs
                        .get(urn)
                        .map(|libs| libs.iter().filter_map(planned).collect())
                        .unwrap_or_default(),
                })
            })
            .collect();

        let plan = TestPlan {
            test_units,
            standalone_libraries: standalone.into_iter().filter_map(planned).collect(),
            modified_library_urns: classification.libraries.clone(),
            modified_transformation_urns: classification.transformations.clone(),
        };

        tracing::info!(
            %mode,
            test_units = plan.test_units.len(),
            standalone_libraries = plan.standalone_libraries.len(),
            "test plan built"
        );
        Ok(plan)
    }

    /// Every library node, failing on any payload that is not a library
    fn library_lookup(&self) -> Result<BTreeMap<&'a Urn, &'a LibraryResource>, PlanError> {
        self.graph
            .resources_by_type(ResourceKind::Library)
            .map(|r| {
                r.payload
                    .as_library()
                    .map(|lib| (&r.urn, lib))
                    .ok_or_else(|| PlanError::PayloadMismatch {
                        urn: r.urn.clone(),
                        expected: ResourceKind::Library,
                    })
            })
            .collect()
    }

    fn transformation_lookup(
        &self,
    ) -> Result<BTreeMap<&'a Urn, &'a TransformationResource>, PlanError> {
        self.graph
            .resources_by_type(ResourceKind::Transformation)
            .map(|r| {
                r.payload
                    .as_transformation()
                    .map(|t| (&r.urn, t))
                    .ok_or_else(|| PlanError::PayloadMismatch {
                        urn: r.urn.clone(),
                        expected: ResourceKind::Transformation,
                    })
            })
            .collect()
    }

    /// Libraries reachable from `urn` through library nodes; unknown targets are dropped
    fn library_closure(
        &self,
        urn: &Urn,
        libraries: &BTreeMap<&Urn, &LibraryResource>,
    ) -> BTreeSet<Urn> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<Urn> = self.graph.dependencies(urn).into();
        while let Some(dep) = queue.pop_front() {
            if !libraries.contains_key(&dep) || seen.contains(&dep) {
                continue;
            }
            queue.extend(self.graph.dependencies(&dep));
            seen.insert(dep);
        }
        seen
    }
}
