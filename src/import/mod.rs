// # Import Module
//
// Import engine with focused, testable components:
//
// - **paths**: run-scoped import tag and folder-path consolidation
// - **batch**: sequential batches with bounded fan-out inside each batch
// - **encrypt**: per-recipient secret encryption with integrity checking
// - **folders**: folder creation in parent-before-child order
// - **resources**: resource persistence with folder linking
// - **ImportService**: orchestrates the run and assembles the report
//
// Public API:
// - `ImportService` / `ImportConfig`: build and execute one run
// - `ImportReport`: per-item created/error breakdown plus the run tag
// - `ImportError`: run-level (fatal) failures

pub mod batch;
pub mod encrypt;
pub mod folders;
pub mod paths;
pub mod resources;
mod service;
pub mod types;

pub use batch::{RunContext, BATCH_SIZE};
pub use folders::FolderRegistry;
pub use paths::ImportTag;
pub use service::{ImportConfig, ImportError, ImportService};
pub use types::{
    Credentials, EncryptedSecret, FileType, ImportFailure, ImportOptions, ImportOutcome,
    ImportReport, ImportSource, ImportedResource,
};
