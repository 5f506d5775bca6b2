//! tfsync Core - test orchestration for transformations and libraries
//!
//! Decides what must be retested after local edits, stages unpublished
//! versions of changed code and runs them against the remote batch-test
//! endpoint:
//! - Modification classification (name/code drift)
//! - Test planning with propagation to consumers of changed libraries
//! - Bounded-concurrency staging with full error aggregation
//! - File-based fixture resolution with built-in sample events
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfsync_core::prelude::*;
//! use tfsync_graph::ResourceGraph;
//! use tfsync_remote::{HttpStoreConfig, HttpTransformationStore};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HttpTransformationStore::new(HttpStoreConfig::new("https://api.example.com"))?;
//! let orchestrator = TestOrchestrator::new(Arc::new(store), OrchestratorConfig::new());
//!
//! let local = ResourceGraph::new();
//! let results = orchestrator
//!     .run(&local, &Mode::Modified, &CancellationToken::new())
//!     .await?;
//! println!("failures: {}", results.has_failures());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classifier;
pub mod config;
pub mod default_events;
pub mod error;
pub mod inputs;
pub mod loader;
pub mod planner;
pub mod results;
pub mod runner;
pub mod staging;
pub mod tasker;
pub mod versions;

pub use classifier::{classify, Classification};
pub use config::OrchestratorConfig;
pub use default_events::default_events;
pub use error::{
    FixtureError, LoadError, OrchestratorError, PlanError, StagingError, TaskError, UnitError,
    VersionError,
};
pub use inputs::{resolve_test_definitions, DEFAULT_EVENTS_TEST};
pub use loader::{map_remote_to_state, RemoteLoader, RemoteResources, StoreLoader};
pub use planner::{Mode, PlannedLibrary, Planner, TestPlan, TestUnit};
pub use results::{Summary, TestResults, TransformationTestWithDefinitions};
pub use runner::TestOrchestrator;
pub use staging::Stager;
pub use tasker::{run_tasks, Results, Task};
pub use versions::{build_remote_id_by_urn, VersionResolver};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::OrchestratorConfig;
    pub use crate::error::OrchestratorError;
    pub use crate::planner::{Mode, TestPlan};
    pub use crate::results::TestResults;
    pub use crate::runner::TestOrchestrator;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
