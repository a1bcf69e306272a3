use serde::{Deserialize, Serialize};

use crate::vault_client::{FolderEntity, ResourceEntity};

/// File formats the import engine accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Password-safe database (encrypted, needs credentials to decode)
    Kdbx,
    /// Delimited text export (no folder structure)
    Csv,
}

impl FileType {
    pub fn extension(&self) -> &'static str {
        match self {
            FileType::Kdbx => "kdbx",
            FileType::Csv => "csv",
        }
    }
}

/// Raw file handed to the import engine
#[derive(Debug, Clone)]
pub struct ImportSource {
    pub file_name: String,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
}

/// Credentials protecting a password-safe database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub password: Option<String>,
    pub key_file: Option<String>,
}

/// Import run options.
///
/// Only the folder flags and credentials change engine behavior; the tag
/// flags are carried through for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Whether the vault supports folders at all
    pub folders_integration: bool,
    /// Whether the vault supports tags at all
    pub tags_integration: bool,
    /// Whether this run should recreate the source's folder structure
    pub import_folders: bool,
    /// Whether this run should apply tags
    pub import_tags: bool,
    pub credentials: Credentials,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            folders_integration: true,
            tags_integration: true,
            import_folders: false,
            import_tags: false,
            credentials: Credentials::default(),
        }
    }
}

impl ImportOptions {
    /// Folder work runs only when the vault supports folders and the run
    /// asked for them
    pub fn folders_enabled(&self) -> bool {
        self.folders_integration && self.import_folders
    }
}

/// Encrypted secret payload attached to a resource after the encryption stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedSecret {
    pub data: String,
}

/// One password entry as produced by a decoder.
///
/// `secret_clear` holds the plaintext secret until the encryption stage moves
/// it out; after that stage the field is empty and `secrets` carries the
/// encrypted payload (absent when the clear secret was empty).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportedResource {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing)]
    pub secret_clear: String,
    /// Raw folder path as decoded; empty when the source had none
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub folder_parent_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<EncryptedSecret>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_parent_id: Option<String>,
    /// Arbitrary decoder metadata passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// One item that could not be persisted, with the collaborator's message
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure<I> {
    pub error: String,
    pub item: I,
}

/// Per-stage result: every input item lands in exactly one of the two lists,
/// except folders skipped because their parent was never created, which land
/// in neither.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome<T, I> {
    pub created: Vec<T>,
    pub errors: Vec<ImportFailure<I>>,
}

impl<T, I> Default for ImportOutcome<T, I> {
    fn default() -> Self {
        ImportOutcome {
            created: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T, I> ImportOutcome<T, I> {
    pub fn total(&self) -> usize {
        self.created.len() + self.errors.len()
    }
}

/// Final report of one import run
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub resources: ImportOutcome<ResourceEntity, ImportedResource>,
    /// Present only when folder integration ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<ImportOutcome<FolderEntity, String>>,
    pub import_tag: String,
}
