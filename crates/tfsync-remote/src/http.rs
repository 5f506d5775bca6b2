//! HTTP-backed store

use crate::error::StoreError;
use crate::store::TransformationStore;
use crate::types::{
    BatchPublishRequest, BatchPublishResponse, BatchTestRequest, BatchTestResponse, LibraryList,
    LibraryRequest, Transformation, TransformationLibrary, TransformationList,
    TransformationRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const TRANSFORMATIONS_PREFIX: &str = "/transformations";
const LIBRARIES_PREFIX: &str = "/libraries";
const BATCH_PUBLISH_PATH: &str = "/transformations/libraries/publish";
const BATCH_TEST_PATH: &str = "/transformations/libraries/test";

/// Connection settings for [`HttpTransformationStore`]
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl HttpStoreConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Transformation store talking to the REST API
pub struct HttpTransformationStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTransformationStore {
    /// Build a store from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    async fn send<B, R>(&self, method: Method, path: &str, body: Option<&B>) -> Result<R, StoreError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "transformations api request");

        let mut req = self.client.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, StoreError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, StoreError> {
        self.send::<(), R>(Method::GET, path, None).await
    }
}

#[async_trait]
impl TransformationStore for HttpTransformationStore {
    async fn create_transformation(
        &self,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError> {
        self.post(&format!("{TRANSFORMATIONS_PREFIX}?publish={publish}"), req)
            .await
    }

    async fn update_transformation(
        &self,
        id: &str,
        req: &TransformationRequest,
        publish: bool,
    ) -> Result<Transformation, StoreError> {
        self.post(&format!("{TRANSFORMATIONS_PREFIX}/{id}?publish={publish}"), req)
            .await
    }

    async fn list_transformations(&self) -> Result<Vec<Transformation>, StoreError> {
        let list: TransformationList = self.get(TRANSFORMATIONS_PREFIX).await?;
        Ok(list.transformations)
    }

    async fn create_library(
        &self,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError> {
        self.post(&format!("{LIBRARIES_PREFIX}?publish={publish}"), req)
            .await
    }

    async fn update_library(
        &self,
        id: &str,
        req: &LibraryRequest,
        publish: bool,
    ) -> Result<TransformationLibrary, StoreError> {
        self.post(&format!("{LIBRARIES_PREFIX}/{id}?publish={publish}"), req)
            .await
    }

    async fn list_libraries(&self) -> Result<Vec<TransformationLibrary>, StoreError> {
        let list: LibraryList = self.get(LIBRARIES_PREFIX).await?;
        Ok(list.libraries)
    }

    async fn batch_publish(
        &self,
        req: &BatchPublishRequest,
    ) -> Result<BatchPublishResponse, StoreError> {
        let resp: BatchPublishResponse = self.post(BATCH_PUBLISH_PATH, req).await?;
        if !resp.published {
            return Err(StoreError::PublishRejected(resp.message));
        }
        Ok(resp)
    }

    async fn batch_test(&self, req: &BatchTestRequest) -> Result<BatchTestResponse, StoreError> {
        self.post(BATCH_TEST_PATH, req).await
    }
}
