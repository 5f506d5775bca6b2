//! Resource identity
//!
//! A URN names a graph node as `type:id`, for example
//! `transformation-library:lib-1`.

use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource type string for transformations
pub const TRANSFORMATION_TYPE: &str = "transformation";

/// Resource type string for transformation libraries
pub const LIBRARY_TYPE: &str = "transformation-library";

/// Stable `type:id` identity of a graph node
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn(String);

impl Urn {
    /// Build a URN from a resource type and a declared ID
    #[inline]
    #[must_use]
    pub fn new(resource_type: &str, id: &str) -> Self {
        Self(format!("{resource_type}:{id}"))
    }

    /// URN of a transformation
    #[inline]
    #[must_use]
    pub fn transformation(id: &str) -> Self {
        Self::new(TRANSFORMATION_TYPE, id)
    }

    /// URN of a transformation library
    #[inline]
    #[must_use]
    pub fn library(id: &str) -> Self {
        Self::new(LIBRARY_TYPE, id)
    }

    /// Resource type part
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.0.split_once(':').map_or("", |(t, _)| t)
    }

    /// Declared ID part
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, id)| id)
    }

    /// Resource kind, if this URN names a transformation or a library
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        ResourceKind::from_type(self.resource_type())
    }

    /// Borrow the raw string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Urn {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((t, id)) if !t.is_empty() && !id.is_empty() => Ok(Self(s.to_string())),
            _ => Err(GraphError::InvalidUrn(s.to_string())),
        }
    }
}

impl TryFrom<String> for Urn {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.0
    }
}

/// The two resource kinds the test engine cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A transformation
    Transformation,
    /// A transformation library
    Library,
}

impl ResourceKind {
    /// Resource type string used in URNs
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transformation => TRANSFORMATION_TYPE,
            Self::Library => LIBRARY_TYPE,
        }
    }

    /// Parse a resource type string
    #[must_use]
    pub fn from_type(resource_type: &str) -> Option<Self> {
        match resource_type {
            TRANSFORMATION_TYPE => Some(Self::Transformation),
            LIBRARY_TYPE => Some(Self::Library),
            _ => None,
        }
    }
}

/// Human-readable: `transformation` or `library`
impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transformation => f.write_str("transformation"),
            Self::Library => f.write_str("library"),
        }
    }
}
