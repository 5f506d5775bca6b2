//! Remote store abstraction

use crate::error::StoreError;
use crate::types::{
    BatchPublishRequest, BatchPublishResponse, BatchTestRequest, BatchTestResponse,
    LibraryRequest, Transformation, TransformationLibrary, TransformationRequest,
};
use async_trait::async_trait;

/// Access to remotely hosted transformations and libraries.
///
/// `publish = false` creates or updates an unpublished version usable only
/// for testing.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TransformationStore: Send + Sync {
    async fn create_transformation(
        &self,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError>;

    async fn update_transformation(
        &self,
        id: &str,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError>;

    async fn list_transformations(&self) -> Result<Vec<Transformation>, StoreError>;

    async fn create_library(
        &self,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError>;

    async fn update_library(
        &self,
        id: &str,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError>;

    async fn list_libraries(&self) -> Result<Vec<TransformationLibrary>, StoreError>;

    /// Mark versions live
    async fn batch_publish(
        &self,
        req: &BatchPublishRequest,
    ) -> Result<BatchPublishResponse, StoreError>;

    /// Run tests against unpublished versions
    async fn batch_test(&self, req: &BatchTestRequest) -> Result<BatchTestResponse, StoreError>;
}
