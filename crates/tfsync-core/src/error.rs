//! Error types for tfsync core
//!
//! Each run phase has its own error type; [`OrchestratorError`] wraps them
//! and names the phase that failed.

use std::fmt::Display;
use std::path::PathBuf;
use tfsync_graph::{ResourceKind, Urn};
use tfsync_remote::StoreError;

/// Top-level error of a test run
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Listing remote resources failed
    #[error("loading remote resources: {0}")]
    Load(#[from] LoadError),

    /// Plan construction failed
    #[error("building test plan: {0}")]
    Plan(#[from] PlanError),

    /// Staging or version resolution failed
    #[error("resolving versions: {0}")]
    Staging(#[from] StagingError),

    /// A transformation's fixtures could not be resolved
    #[error("resolving test inputs for {transformation}: {source}")]
    Fixtures {
        transformation: String,
        #[source]
        source: FixtureError,
    },

    /// The standalone library check failed
    #[error("running standalone library tests: {0}")]
    StandaloneLibraries(#[source] StoreError),

    /// One or more test units failed to execute
    #[error("{}", unit_failures(.0))]
    Execution(Vec<TaskError<UnitError>>),

    /// The caller cancelled the run
    #[error("operation cancelled")]
    Cancelled,
}

fn unit_failures(errors: &[TaskError<UnitError>]) -> String {
    errors
        .iter()
        .map(|e| match e {
            TaskError::Failed { id, source } => format!("running tests for {id}: {source}"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render errors one per line
pub(crate) fn join_errors<E: Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Planning and classification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Single-mode target does not exist locally
    #[error("resource with ID '{0}' not found")]
    UnknownTarget(String),

    /// A node's payload does not match the kind its URN names
    #[error("resource {urn} does not carry a {expected} payload")]
    PayloadMismatch { urn: Urn, expected: ResourceKind },

    /// Local and remote payloads for one URN are of different kinds
    #[error("local and remote payloads for {0} are of different kinds")]
    KindMismatch(Urn),
}

/// Errors from a single bounded-pool task
#[derive(Debug, thiserror::Error)]
pub enum TaskError<E> {
    #[error("{id}: {source}")]
    Failed {
        id: String,
        #[source]
        source: E,
    },

    /// Not run because the run was cancelled
    #[error("{0}: cancelled before completion")]
    Cancelled(String),

    /// Two tasks shared one ID; the later one was not run
    #[error("duplicate task id: {0}")]
    DuplicateId(String),
}

impl<E> TaskError<E> {
    /// ID of the task this error belongs to
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Failed { id, .. } | Self::Cancelled(id) | Self::DuplicateId(id) => id,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Resolving one resource's version failed
#[derive(Debug, thiserror::Error)]
pub enum VersionError {
    #[error("creating {kind} {id}: {source}")]
    Create {
        kind: ResourceKind,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("updating {kind} {id}: {source}")]
    Update {
        kind: ResourceKind,
        id: String,
        #[source]
        source: StoreError,
    },

    /// The remote accepted the write but returned no version
    #[error("{kind} {id} was staged without a versionId")]
    EmptyVersion { kind: ResourceKind, id: String },

    #[error("unmodified {kind} {id} not found in remote state")]
    NotInRemoteState { kind: ResourceKind, id: String },

    #[error("{kind} {id} in remote state has no valid versionId")]
    NoVersionId { kind: ResourceKind, id: String },
}

/// Staging phase failure: every failed task, joined
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("{}", join_errors(.0))]
    Joined(Vec<TaskError<VersionError>>),

    #[error("{0} version not found in task results")]
    MissingResult(String),
}

impl StagingError {
    /// Number of individual failures
    #[must_use]
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Joined(errors) => errors.len(),
            Self::MissingResult(_) => 1,
        }
    }
}

/// Fixture resolution errors; each names the offending path
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("listing {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in file {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("building test cases for suite {suite}: {source}")]
    Suite {
        suite: String,
        #[source]
        source: Box<FixtureError>,
    },
}

/// Executing one test unit failed
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no versionId resolved for {0}")]
    MissingVersion(Urn),
}

/// Loading remote resources failed
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("listing transformations: {0}")]
    Transformations(#[source] StoreError),

    #[error("listing libraries: {0}")]
    Libraries(#[source] StoreError),
}
