use crate::import::folders::FolderRegistry;
use crate::import::paths::ImportTag;
use crate::import::types::ImportedResource;
use crate::vault_client::{ResourceEntity, VaultClient, VaultError};

/// Persist one resource, linking it to its run folder when that folder exists.
///
/// With folder integration off the registry is absent and no link is
/// attempted. A folder path that never registered (creation failed or was
/// skipped) leaves the resource without a parent link; persistence failures
/// propagate so the scheduler records them per item.
pub async fn create_resource(
    mut resource: ImportedResource,
    vault: &VaultClient,
    registry: Option<&FolderRegistry>,
    tag: &ImportTag,
) -> Result<Option<ResourceEntity>, VaultError> {
    if let Some(registry) = registry {
        let path = tag.consolidate(&resource.folder_parent_path);
        resource.folder_parent_id = registry.folder_id(&path);
    }

    let created = vault.create_resource(&resource).await?;
    Ok(Some(created))
}
