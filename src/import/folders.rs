use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::import::paths::split_path;
use crate::vault_client::{FolderEntity, NewFolder, VaultClient, VaultError};

/// Lookup table of consolidated path -> created folder, populated as the run
/// progresses. A path absent from the registry means its folder was never
/// created (failed or skipped), so nothing depending on it can link to it.
#[derive(Debug, Default)]
pub struct FolderRegistry {
    entries: Mutex<HashMap<String, FolderEntity>>,
}

impl FolderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folder id for a consolidated path, when that folder exists in this run
    pub fn folder_id(&self, path: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(path)
            .map(|folder| folder.id.clone())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    pub fn insert(&self, path: String, folder: FolderEntity) {
        self.entries.lock().unwrap().insert(path, folder);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Create one folder from its consolidated path and register it.
///
/// Returns `Ok(None)` when the path has a parent that was never registered:
/// the parent's own creation failed earlier in the run, and a child without
/// its parent is skipped rather than surfaced as an error.
pub async fn create_folder(
    path: String,
    vault: &VaultClient,
    registry: &FolderRegistry,
) -> Result<Option<FolderEntity>, VaultError> {
    let (parent_path, name) = split_path(&path);

    let folder_parent_id = if parent_path.is_empty() {
        None
    } else {
        match registry.folder_id(parent_path) {
            Some(id) => Some(id),
            None => {
                debug!(path = %path, "skipping folder, parent was never created");
                return Ok(None);
            }
        }
    };

    let folder = vault
        .create_folder(&NewFolder {
            name: name.to_string(),
            folder_parent_id,
        })
        .await?;
    registry.insert(path, folder.clone());
    Ok(Some(folder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault_client::mock::MockVault;
    use std::sync::Arc;

    fn vault() -> (Arc<MockVault>, VaultClient) {
        let mock = Arc::new(MockVault::new());
        let client = VaultClient::new(mock.clone());
        (mock, client)
    }

    #[tokio::test]
    async fn test_create_root_folder_has_no_parent() {
        let (_, client) = vault();
        let registry = FolderRegistry::new();

        let folder = create_folder("/tag".to_string(), &client, &registry)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(folder.name, "tag");
        assert!(folder.folder_parent_id.is_none());
        assert!(registry.contains("/tag"));
    }

    #[tokio::test]
    async fn test_create_child_links_registered_parent() {
        let (_, client) = vault();
        let registry = FolderRegistry::new();

        let root = create_folder("/tag".to_string(), &client, &registry)
            .await
            .unwrap()
            .unwrap();
        let child = create_folder("/tag/Work".to_string(), &client, &registry)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(child.folder_parent_id.as_deref(), Some(root.id.as_str()));
    }

    #[tokio::test]
    async fn test_missing_parent_is_a_silent_skip() {
        let (mock, client) = vault();
        let registry = FolderRegistry::new();

        // out-of-order injection: child before its parent exists
        let result = create_folder("/tag/A/B".to_string(), &client, &registry)
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(!registry.contains("/tag/A/B"));
        assert!(mock.created_folders().is_empty());
    }
}
