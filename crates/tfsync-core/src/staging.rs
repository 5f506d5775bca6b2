//! Staging: unpublished versions for test-only use
//!
//! A resource with no known remote ID is created; otherwise the existing
//! remote resource is updated. Both paths write with `publish = false` and
//! yield a fresh version ID.

use crate::error::VersionError;
use std::sync::Arc;
use tfsync_graph::{LibraryResource, ResourceKind, TransformationResource};
use tfsync_remote::{LibraryRequest, TransformationRequest, TransformationStore};

/// Creates or updates unpublished versions in the remote store
#[derive(Clone)]
pub struct Stager {
    store: Arc<dyn TransformationStore>,
}

impl Stager {
    #[must_use]
    pub fn new(store: Arc<dyn TransformationStore>) -> Self {
        Self { store }
    }

    /// Stage a transformation and return its new version ID.
    ///
    /// # Errors
    ///
    /// Fails when the store rejects the write or returns an empty version.
    pub async fn stage_transformation(
        &self,
        transformation: &TransformationResource,
        remote_id: Option<&str>,
    ) -> Result<String, VersionError> {
        let kind = ResourceKind::Transformation;
        let id = transformation.id.clone();
        let req = TransformationRequest {
            name: transformation.name.clone(),
            description: transformation.description.clone(),
            code: transformation.code.clone(),
            language: transformation.language.clone(),
            external_id: transformation.id.clone(),
        };

        let staged = match remote_id.filter(|r| !r.is_empty()) {
            None => {
                tracing::debug!(transformation = %id, "creating unpublished transformation");
                self.store
                    .create_transformation(&req, false)
                    .await
                    .map_err(|source| VersionError::Create { kind, id: id.clone(), source })?
            }
            Some(remote_id) => {
                tracing::debug!(transformation = %id, %remote_id, "updating unpublished transformation");
                self.store
                    .update_transformation(remote_id, &req, false)
                    .await
                    .map_err(|source| VersionError::Update { kind, id: id.clone(), source })?
            }
        };

        non_empty(staged.version_id, kind, id)
    }

    /// Stage a library and return its new version ID.
    ///
    /// # Errors
    ///
    /// Fails when the store rejects the write or returns an empty version.
    pub async fn stage_library(
        &self,
        library: &LibraryResource,
        remote_id: Option<&str>,
    ) -> Result<String, VersionError> {
        let kind = ResourceKind::Library;
        let id = library.id.clone();
        let req = LibraryRequest {
            name: library.name.clone(),
            description: library.description.clone(),
            code: library.code.clone(),
            language: library.language.clone(),
            external_id: library.id.clone(),
        };

        let staged = match remote_id.filter(|r| !r.is_empty()) {
            None => {
                tracing::debug!(library = %id, "creating unpublished library");
                self.store
                    .create_library(&req, false)
                    .await
                    .map_err(|source| VersionError::Create { kind, id: id.clone(), source })?
            }
            Some(remote_id) => {
                tracing::debug!(library = %id, %remote_id, "updating unpublished library");
                self.store
                    .update_library(remote_id, &req, false)
                    .await
                    .map_err(|source| VersionError::Update { kind, id: id.clone(), source })?
            }
        };

        non_empty(staged.version_id, kind, id)
    }
}

fn non_empty(version_id: String, kind: ResourceKind, id: String) -> Result<String, VersionError> {
    if version_id.is_empty() {
        Err(VersionError::EmptyVersion { kind, id })
    } else {
        Ok(version_id)
    }
}
