//! Typed resource payloads
//!
//! Graph nodes carry a [`ResourcePayload`], a tagged union over the resource
//! kinds. Callers match on the variant instead of downcasting.

use crate::urn::{ResourceKind, Urn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A declared test suite for a transformation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name, used as the prefix of generated test names
    pub name: String,
    /// Directory of the spec file declaring the suite; relative paths resolve against it
    #[serde(default)]
    pub spec_dir: PathBuf,
    /// Input fixture directory
    #[serde(default)]
    pub input: PathBuf,
    /// Expected-output fixture directory
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl TestSuite {
    /// Create a suite reading inputs from `input`
    pub fn new(name: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            ..Self::default()
        }
    }

    /// Set the expected-output directory
    #[must_use]
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Set the directory relative paths resolve against
    #[must_use]
    pub fn with_spec_dir(mut self, spec_dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = spec_dir.into();
        self
    }
}

/// A transformation: user code run against events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub tests: Vec<TestSuite>,
}

impl TransformationResource {
    /// Create a javascript transformation with no test suites
    pub fn new(id: impl Into<String>, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: "javascript".to_string(),
            code: code.into(),
            ..Self::default()
        }
    }

    /// Add a test suite
    #[must_use]
    pub fn with_test(mut self, suite: TestSuite) -> Self {
        self.tests.push(suite);
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Whether name and code match; description, language and tests are ignored
    #[inline]
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name && self.code == other.code
    }
}

/// A transformation library: shared code imported by transformations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    pub code: String,
    pub import_name: String,
}

impl LibraryResource {
    /// Create a javascript library
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        import_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language: "javascript".to_string(),
            code: code.into(),
            import_name: import_name.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Whether name and code match; description, language and import name are ignored
    #[inline]
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name && self.code == other.code
    }
}

/// Payload carried by a graph node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ResourcePayload {
    Transformation(TransformationResource),
    Library(LibraryResource),
    /// Any other resource type; opaque to the test engine
    Other(serde_json::Value),
}

impl ResourcePayload {
    /// Kind of the payload, `None` for opaque resources
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Transformation(_) => Some(ResourceKind::Transformation),
            Self::Library(_) => Some(ResourceKind::Library),
            Self::Other(_) => None,
        }
    }

    #[must_use]
    pub fn as_transformation(&self) -> Option<&TransformationResource> {
        match self {
            Self::Transformation(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_library(&self) -> Option<&LibraryResource> {
        match self {
            Self::Library(l) => Some(l),
            _ => None,
        }
    }

    /// Compare name and code against another payload of the same kind.
    ///
    /// Returns `None` when the two payloads are of different kinds.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::Transformation(a), Self::Transformation(b)) => Some(a.same_content(b)),
            (Self::Library(a), Self::Library(b)) => Some(a.same_content(b)),
            (Self::Other(a), Self::Other(b)) => Some(a == b),
            _ => None,
        }
    }
}

/// Claim on an existing remote resource not yet managed locally
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMetadata {
    /// Remote identifier of the resource being imported
    pub remote_id: String,
    /// Workspace the remote resource lives in; empty matches any workspace
    #[serde(default)]
    pub workspace_id: String,
}

impl ImportMetadata {
    pub fn new(remote_id: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            workspace_id: workspace_id.into(),
        }
    }

    /// Whether this import targets `workspace_id`
    #[must_use]
    pub fn matches_workspace(&self, workspace_id: &str) -> bool {
        self.workspace_id.is_empty() || self.workspace_id == workspace_id
    }
}

/// A graph node: identity, typed payload and optional import claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub urn: Urn,
    pub payload: ResourcePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportMetadata>,
}

impl Resource {
    /// Create a resource with an explicit URN
    #[must_use]
    pub fn new(urn: Urn, payload: ResourcePayload) -> Self {
        Self {
            urn,
            payload,
            import: None,
        }
    }

    /// Wrap a transformation, deriving its URN from the declared ID
    #[must_use]
    pub fn transformation(t: TransformationResource) -> Self {
        Self::new(Urn::transformation(&t.id), ResourcePayload::Transformation(t))
    }

    /// Wrap a library, deriving its URN from the declared ID
    #[must_use]
    pub fn library(l: LibraryResource) -> Self {
        Self::new(Urn::library(&l.id), ResourcePayload::Library(l))
    }

    /// Attach import metadata
    #[must_use]
    pub fn with_import(mut self, import: ImportMetadata) -> Self {
        self.import = Some(import);
        self
    }

    /// Declared ID, taken from the URN
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        self.urn.id()
    }

    /// Remote ID claimed through import metadata, if non-empty
    #[must_use]
    pub fn import_remote_id(&self) -> Option<&str> {
        self.import
            .as_ref()
            .map(|i| i.remote_id.as_str())
            .filter(|id| !id.is_empty())
    }
}
