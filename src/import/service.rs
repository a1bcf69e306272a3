use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::decoder::{DecodeError, ImportDecoder};
use crate::encryption::{EncryptionError, SecretEncryptor};
use crate::import::batch::{self, RunContext, BATCH_SIZE};
use crate::import::encrypt::encrypt_secrets;
use crate::import::folders::{create_folder, FolderRegistry};
use crate::import::paths::{consolidate_paths, ImportTag};
use crate::import::resources::create_resource;
use crate::import::types::{FileType, ImportOptions, ImportReport, ImportSource};
use crate::progress::ProgressSink;
use crate::vault_client::VaultClient;

/// Run-level import failure. Per-item persistence failures never surface
/// here; they are reported inside the run's [`ImportReport`].
#[derive(Error, Debug)]
pub enum ImportError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encryption(#[from] EncryptionError),
}

/// Configuration for one import run
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub options: ImportOptions,
    /// Recipient of the encrypted secrets
    pub user_id: String,
    pub batch_size: usize,
}

impl ImportConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        ImportConfig {
            options: ImportOptions::default(),
            user_id: user_id.into(),
            batch_size: BATCH_SIZE,
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Import orchestrator: decodes one file, encrypts its secrets, recreates its
/// folder structure and persists every entry, reporting progress throughout.
///
/// Stages run strictly in sequence. A failure before persistence begins
/// (decode, key sync, encryption integrity) aborts the run with nothing
/// created; once persistence batches start, failures are per item and the run
/// always completes all batches.
pub struct ImportService {
    source: ImportSource,
    config: ImportConfig,
    import_tag: ImportTag,
    decoder: Arc<dyn ImportDecoder>,
    encryptor: Arc<dyn SecretEncryptor>,
    vault: VaultClient,
    progress: Arc<dyn ProgressSink>,
}

impl ImportService {
    /// Create a service for one source file. The import tag is generated
    /// here, once, and namespaces everything the run creates.
    pub fn new(
        source: ImportSource,
        config: ImportConfig,
        decoder: Arc<dyn ImportDecoder>,
        encryptor: Arc<dyn SecretEncryptor>,
        vault: VaultClient,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        let import_tag = ImportTag::generate(source.file_type);
        ImportService {
            source,
            config,
            import_tag,
            decoder,
            encryptor,
            vault,
            progress,
        }
    }

    /// Override the generated import tag, for deterministic runs
    pub fn with_import_tag(mut self, import_tag: ImportTag) -> Self {
        self.import_tag = import_tag;
        self
    }

    pub fn import_tag(&self) -> &ImportTag {
        &self.import_tag
    }

    /// Execute the import run.
    ///
    /// On a fatal error the progress surface is closed before the error
    /// propagates, so the UI never hangs on an abandoned run.
    pub async fn exec(&self) -> Result<ImportReport, ImportError> {
        match self.run().await {
            Ok(report) => Ok(report),
            Err(error) => {
                warn!(error = %error, tag = %self.import_tag, "import run failed");
                self.progress.close();
                Err(error)
            }
        }
    }

    async fn run(&self) -> Result<ImportReport, ImportError> {
        info!(
            tag = %self.import_tag,
            file = %self.source.file_name,
            "starting import"
        );

        // 1. Decode the file into a normalized item set
        let decoded = match self.source.file_type {
            FileType::Kdbx => {
                self.decoder
                    .decode_database(&self.source.bytes, &self.config.options.credentials)
                    .await?
            }
            FileType::Csv => self.decoder.decode_delimited(&self.source.bytes).await?,
        };
        let mut resources = decoded.resources;

        // 2. Consolidate folder paths into the run's namespace
        let folders_enabled = self.config.options.folders_enabled();
        let folder_paths = if folders_enabled {
            consolidate_paths(&decoded.folder_paths, &self.import_tag)
        } else {
            Vec::new()
        };

        // 3. Open progress: encrypt + save per resource, one step per folder
        let ctx = RunContext::new();
        ctx.set_operations_count(resources.len() * 2 + folder_paths.len());
        self.progress.open(
            "Importing passwords",
            ctx.operations_count(),
            "Initializing",
        );
        let progress: &dyn ProgressSink = self.progress.as_ref();

        // 4. Key directory must be current before anything is encrypted
        self.encryptor.sync_key_directory().await?;

        // 5. Encrypt secrets
        let total = resources.len();
        let ctx_ref = &ctx;
        let on_item_start = move |index: usize| {
            let step = ctx_ref.advance();
            progress.update(
                step,
                &format!("Encrypting secrets {}/{}", index + 1, total),
            );
        };
        let on_item_complete = move || {};
        encrypt_secrets(
            &mut resources,
            &self.config.user_id,
            self.encryptor.as_ref(),
            &on_item_start,
            &on_item_complete,
        )
        .await?;

        // 6. Folders, parents strictly before children
        let registry = FolderRegistry::new();
        let folders = if folders_enabled {
            info!(count = folder_paths.len(), "creating folders");
            let vault = &self.vault;
            let registry_ref = &registry;
            let outcome = batch::run_batches(
                batch::partition_folder_paths(folder_paths, self.config.batch_size),
                &ctx,
                progress,
                "Importing folders",
                move |path: String| create_folder(path, vault, registry_ref),
            )
            .await;
            Some(outcome)
        } else {
            None
        };

        // 7. Resources
        info!(count = resources.len(), "creating resources");
        let vault = &self.vault;
        let registry_ref = folders_enabled.then_some(&registry);
        let tag = &self.import_tag;
        let resources_outcome = batch::run_batches(
            batch::partition(resources, self.config.batch_size),
            &ctx,
            progress,
            "Importing passwords",
            move |resource| create_resource(resource, vault, registry_ref, tag),
        )
        .await;

        self.progress.close();
        info!(
            tag = %self.import_tag,
            created = resources_outcome.created.len(),
            errors = resources_outcome.errors.len(),
            batches = ctx.batches_run(),
            "import finished"
        );

        Ok(ImportReport {
            resources: resources_outcome,
            folders,
            import_tag: self.import_tag.as_str().to_string(),
        })
    }
}
