use thiserror::Error;

use crate::import::types::{Credentials, ImportedResource};

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unreadable database file: {0}")]
    Database(String),
    #[error("Malformed delimited export: {0}")]
    Delimited(String),
    #[error("Invalid credentials: {0}")]
    Credentials(String),
}

/// Normalized output of a file decoder: the items to import plus the raw
/// folder paths the source file declared (empty for delimited exports).
#[derive(Debug, Clone, Default)]
pub struct DecodedImport {
    pub resources: Vec<ImportedResource>,
    pub folder_paths: Vec<String>,
}

/// Trait for file-format decoders (allows mocking for tests)
#[async_trait::async_trait]
pub trait ImportDecoder: Send + Sync {
    /// Decode a password-safe database. Credentials carry the master password
    /// and/or key file the database was protected with.
    async fn decode_database(
        &self,
        bytes: &[u8],
        credentials: &Credentials,
    ) -> Result<DecodedImport, DecodeError>;

    /// Decode a delimited text export. These carry no folder structure.
    async fn decode_delimited(&self, bytes: &[u8]) -> Result<DecodedImport, DecodeError>;
}

pub mod mock {
    use super::*;

    /// Decoder that returns a scripted item set regardless of input bytes
    pub struct MockDecoder {
        decoded: DecodedImport,
    }

    impl MockDecoder {
        pub fn new(resources: Vec<ImportedResource>, folder_paths: Vec<String>) -> Self {
            Self {
                decoded: DecodedImport {
                    resources,
                    folder_paths,
                },
            }
        }
    }

    #[async_trait::async_trait]
    impl ImportDecoder for MockDecoder {
        async fn decode_database(
            &self,
            _bytes: &[u8],
            _credentials: &Credentials,
        ) -> Result<DecodedImport, DecodeError> {
            Ok(self.decoded.clone())
        }

        async fn decode_delimited(&self, _bytes: &[u8]) -> Result<DecodedImport, DecodeError> {
            Ok(DecodedImport {
                resources: self.decoded.resources.clone(),
                folder_paths: Vec::new(),
            })
        }
    }
}
