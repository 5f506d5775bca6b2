//! Remote loading: list hosted resources and map them to [`RemoteState`]

use crate::error::LoadError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfsync_graph::{
    LibraryResource, RemoteState, ResourceOutput, ResourcePayload, ResourceState,
    TransformationResource, Urn,
};
use tfsync_remote::{Transformation, TransformationLibrary, TransformationStore};

/// Everything listed from the remote, managed and unmanaged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteResources {
    /// Every listed transformation, managed or not
    pub transformations: Vec<Transformation>,
    /// Every listed library, managed or not
    pub libraries: Vec<TransformationLibrary>,
}

/// Source of the remote baseline for a run
#[async_trait]
pub trait RemoteLoader: Send + Sync {
    /// List every remote transformation and library
    async fn load_resources_from_remote(&self) -> Result<RemoteResources, LoadError>;

    /// Build remote state from a listing.
    ///
    /// Resources with an external ID are managed and keyed by URN; the rest
    /// are keyed by remote ID.
    fn map_remote_to_state(&self, remote: &RemoteResources) -> RemoteState {
        map_remote_to_state(remote)
    }
}

/// Loader backed by a [`TransformationStore`]
#[derive(Clone)]
pub struct StoreLoader {
    store: Arc<dyn TransformationStore>,
}

impl StoreLoader {
    #[must_use]
    pub fn new(store: Arc<dyn TransformationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RemoteLoader for StoreLoader {
    async fn load_resources_from_remote(&self) -> Result<RemoteResources, LoadError> {
        let (transformations, libraries) = tokio::try_join!(
            async {
                self.store
                    .list_transformations()
                    .await
                    .map_err(LoadError::Transformations)
            },
            async { self.store.list_libraries().await.map_err(LoadError::Libraries) },
        )?;
        tracing::debug!(
            transformations = transformations.len(),
            libraries = libraries.len(),
            "listed remote resources"
        );
        Ok(RemoteResources {
            transformations,
            libraries,
        })
    }
}

/// Map a remote listing to state
#[must_use]
pub fn map_remote_to_state(remote: &RemoteResources) -> RemoteState {
    let mut state = RemoteState::new();
    let mut by_import_name: HashMap<&str, Urn> = HashMap::new();

    for lib in &remote.libraries {
        let output = ResourceOutput::new(&lib.id, &lib.version_id);
        if lib.external_id.is_empty() {
            let payload = ResourcePayload::Library(library_payload(lib, &lib.id));
            state.add_unmanaged(&lib.id, ResourceState::new(payload, output));
            continue;
        }
        let urn = Urn::library(&lib.external_id);
        if !lib.import_name.is_empty() {
            by_import_name.insert(&lib.import_name, urn.clone());
        }
        let payload = ResourcePayload::Library(library_payload(lib, &lib.external_id));
        state.add(urn, ResourceState::new(payload, output));
    }

    for t in &remote.transformations {
        let output = ResourceOutput::new(&t.id, &t.version_id);
        if t.external_id.is_empty() {
            let payload = ResourcePayload::Transformation(transformation_payload(t, &t.id));
            state.add_unmanaged(&t.id, ResourceState::new(payload, output));
            continue;
        }

        let mut dependencies = Vec::with_capacity(t.imports.len());
        for import in &t.imports {
            match by_import_name.get(import.as_str()) {
                Some(urn) => dependencies.push(urn.clone()),
                None => tracing::warn!(
                    transformation = %t.external_id,
                    import = %import,
                    "import does not match any managed library, skipping"
                ),
            }
        }
        dependencies.sort();
        dependencies.dedup();

        let payload = ResourcePayload::Transformation(transformation_payload(t, &t.external_id));
        state.add(
            Urn::transformation(&t.external_id),
            ResourceState::new(payload, output).with_dependencies(dependencies),
        );
    }

    state
}

fn transformation_payload(t: &Transformation, id: &str) -> TransformationResource {
    TransformationResource {
        id: id.to_string(),
        name: t.name.clone(),
        description: t.description.clone(),
        language: t.language.clone(),
        code: t.code.clone(),
        tests: Vec::new(),
    }
}

fn library_payload(lib: &TransformationLibrary, id: &str) -> LibraryResource {
    LibraryResource {
        id: id.to_string(),
        name: lib.name.clone(),
        description: lib.description.clone(),
        language: lib.language.clone(),
        code: lib.code.clone(),
        import_name: lib.import_name.clone(),
    }
}
