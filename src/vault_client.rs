use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::import::types::ImportedResource;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Folder creation failed: {0}")]
    FolderCreate(String),
    #[error("Resource creation failed: {0}")]
    ResourceCreate(String),
    #[error("Vault unreachable: {0}")]
    Transport(String),
}

/// Persisted folder as returned by the vault API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderEntity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
}

/// Persisted resource as returned by the vault API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
}

/// New-folder payload sent to the vault
#[derive(Debug, Clone, Serialize)]
pub struct NewFolder {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
}

/// Trait for vault persistence operations (allows mocking for tests)
#[async_trait::async_trait]
pub trait VaultApi: Send + Sync {
    async fn create_folder(&self, folder: &NewFolder) -> Result<FolderEntity, VaultError>;
    async fn create_resource(
        &self,
        resource: &ImportedResource,
    ) -> Result<ResourceEntity, VaultError>;
}

/// Vault client that owns the API implementation
#[derive(Clone)]
pub struct VaultClient {
    api: Arc<dyn VaultApi>,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("api", &"<dyn VaultApi>")
            .finish()
    }
}

impl VaultClient {
    pub fn new(api: Arc<dyn VaultApi>) -> Self {
        VaultClient { api }
    }

    /// Create a folder in the vault
    pub async fn create_folder(&self, folder: &NewFolder) -> Result<FolderEntity, VaultError> {
        self.api.create_folder(folder).await
    }

    /// Create a resource in the vault
    pub async fn create_resource(
        &self,
        resource: &ImportedResource,
    ) -> Result<ResourceEntity, VaultError> {
        self.api.create_resource(resource).await
    }
}

pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// In-memory vault for tests.
    ///
    /// Creation fails for any folder or resource whose name was registered
    /// with `fail_on`, which is how tests script per-item failures.
    #[derive(Default)]
    pub struct MockVault {
        folders: Mutex<Vec<FolderEntity>>,
        resources: Mutex<Vec<ResourceEntity>>,
        fail_names: Mutex<HashSet<String>>,
    }

    impl MockVault {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every creation with this name fail
        pub fn fail_on(&self, name: &str) {
            self.fail_names.lock().unwrap().insert(name.to_string());
        }

        pub fn created_folders(&self) -> Vec<FolderEntity> {
            self.folders.lock().unwrap().clone()
        }

        pub fn created_resources(&self) -> Vec<ResourceEntity> {
            self.resources.lock().unwrap().clone()
        }

        fn should_fail(&self, name: &str) -> bool {
            self.fail_names.lock().unwrap().contains(name)
        }
    }

    #[async_trait::async_trait]
    impl VaultApi for MockVault {
        async fn create_folder(&self, folder: &NewFolder) -> Result<FolderEntity, VaultError> {
            if self.should_fail(&folder.name) {
                return Err(VaultError::FolderCreate(format!(
                    "folder '{}' rejected by vault",
                    folder.name
                )));
            }

            let entity = FolderEntity {
                id: Uuid::new_v4().to_string(),
                name: folder.name.clone(),
                folder_parent_id: folder.folder_parent_id.clone(),
            };
            self.folders.lock().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn create_resource(
            &self,
            resource: &ImportedResource,
        ) -> Result<ResourceEntity, VaultError> {
            if self.should_fail(&resource.name) {
                return Err(VaultError::ResourceCreate(format!(
                    "resource '{}' rejected by vault",
                    resource.name
                )));
            }

            let entity = ResourceEntity {
                id: Uuid::new_v4().to_string(),
                name: resource.name.clone(),
                folder_parent_id: resource.folder_parent_id.clone(),
            };
            self.resources.lock().unwrap().push(entity.clone());
            Ok(entity)
        }
    }
}
