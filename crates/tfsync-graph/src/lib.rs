//! tfsync Graph - resource identity, dependency graph and drift detection
//!
//! Provides the read model the test engine works against:
//! - [`Urn`] identities of the form `type:id`
//! - Typed resource payloads ([`ResourcePayload`]) for transformations and libraries
//! - [`ResourceGraph`] with dependency edges (dependent → dependency)
//! - [`compute_diff`] comparing a remote-derived graph against the local one
//! - [`RemoteState`], the last synced state keyed by URN
//!
//! # Example
//!
//! ```rust
//! use tfsync_graph::{LibraryResource, Resource, ResourceGraph, TransformationResource, Urn};
//!
//! let mut graph = ResourceGraph::new();
//! graph.add_resource(Resource::library(LibraryResource::new("lib-1", "Lib", "v1", "lib1")));
//! graph.add_resource(Resource::transformation(TransformationResource::new("t1", "T1", "code")));
//! graph.add_dependency(&Urn::transformation("t1"), &Urn::library("lib-1"));
//!
//! assert_eq!(graph.dependencies(&Urn::transformation("t1")), vec![Urn::library("lib-1")]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod diff;
pub mod error;
pub mod graph;
pub mod resource;
pub mod state;
pub mod urn;

pub use diff::{compute_diff, Diff, DiffOptions};
pub use error::GraphError;
pub use graph::ResourceGraph;
pub use resource::{
    ImportMetadata, LibraryResource, Resource, ResourcePayload, TestSuite,
    TransformationResource,
};
pub use state::{RemoteState, ResourceOutput, ResourceState};
pub use urn::{ResourceKind, Urn, LIBRARY_TYPE, TRANSFORMATION_TYPE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
