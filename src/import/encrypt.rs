use tracing::debug;

use crate::encryption::{EncryptRequest, EncryptionError, SecretEncryptor};
use crate::import::types::{EncryptedSecret, ImportedResource};

/// Encrypt every resource's clear secret for `user_id` and attach the result.
///
/// Clear secrets are moved out of the items into transient requests, so after
/// this stage no plaintext (and no recipient id) remains on any resource. A
/// resource whose clear secret was empty comes back with no secrets attached.
/// A payload count that differs from the resource count fails the whole run.
pub async fn encrypt_secrets(
    resources: &mut [ImportedResource],
    user_id: &str,
    encryptor: &dyn SecretEncryptor,
    on_item_start: &(dyn Fn(usize) + Send + Sync),
    on_item_complete: &(dyn Fn() + Send + Sync),
) -> Result<(), EncryptionError> {
    let requests: Vec<EncryptRequest> = resources
        .iter_mut()
        .map(|resource| EncryptRequest {
            user_id: user_id.to_string(),
            message: std::mem::take(&mut resource.secret_clear),
        })
        .collect();

    let payloads = encryptor
        .encrypt_all(&requests, on_item_start, on_item_complete)
        .await?;

    if payloads.len() != resources.len() {
        return Err(EncryptionError::SecretCountMismatch {
            expected: resources.len(),
            actual: payloads.len(),
        });
    }

    for ((resource, request), payload) in resources.iter_mut().zip(&requests).zip(payloads) {
        if !request.message.is_empty() {
            resource.secrets = Some(vec![EncryptedSecret { data: payload }]);
        }
    }

    debug!(count = resources.len(), "secrets encrypted");
    Ok(())
}
