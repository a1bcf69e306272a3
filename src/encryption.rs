use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncryptionError {
    #[error("Key directory sync failed: {0}")]
    KeySync(String),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Encrypted secret count mismatch: expected {expected}, got {actual}")]
    SecretCountMismatch { expected: usize, actual: usize },
}

/// One message to encrypt for one recipient key.
///
/// Built transiently by the encryption stage; the clear message lives here and
/// nowhere else once the stage has run.
#[derive(Debug, Clone)]
pub struct EncryptRequest {
    pub user_id: String,
    pub message: String,
}

/// Trait for the per-recipient encryption collaborator (allows mocking for tests)
#[async_trait::async_trait]
pub trait SecretEncryptor: Send + Sync {
    /// Synchronize the recipient key directory. Must complete before any
    /// call to `encrypt_all`.
    async fn sync_key_directory(&self) -> Result<(), EncryptionError>;

    /// Encrypt every request for its recipient key.
    ///
    /// The result must preserve the order and length of `requests`.
    /// `on_item_start(index)` fires before each item and `on_item_complete()`
    /// after it; both are fire-and-forget and must not be awaited on.
    async fn encrypt_all(
        &self,
        requests: &[EncryptRequest],
        on_item_start: &(dyn Fn(usize) + Send + Sync),
        on_item_complete: &(dyn Fn() + Send + Sync),
    ) -> Result<Vec<String>, EncryptionError>;
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Encryptor that wraps messages in a recognizable envelope instead of
    /// doing real cryptography.
    ///
    /// `force_result_count` truncates or pads the returned payload list, for
    /// exercising the engine's count-integrity check.
    #[derive(Default)]
    pub struct MockEncryptor {
        force_result_count: Mutex<Option<usize>>,
    }

    impl MockEncryptor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn force_result_count(&self, count: usize) {
            *self.force_result_count.lock().unwrap() = Some(count);
        }
    }

    #[async_trait::async_trait]
    impl SecretEncryptor for MockEncryptor {
        async fn sync_key_directory(&self) -> Result<(), EncryptionError> {
            Ok(())
        }

        async fn encrypt_all(
            &self,
            requests: &[EncryptRequest],
            on_item_start: &(dyn Fn(usize) + Send + Sync),
            on_item_complete: &(dyn Fn() + Send + Sync),
        ) -> Result<Vec<String>, EncryptionError> {
            let mut payloads = Vec::with_capacity(requests.len());
            for (index, request) in requests.iter().enumerate() {
                on_item_start(index);
                payloads.push(format!("enc[{}:{}]", request.user_id, request.message));
                on_item_complete();
            }

            if let Some(count) = *self.force_result_count.lock().unwrap() {
                payloads.resize(count, "enc[padding]".to_string());
            }
            Ok(payloads)
        }
    }
}
