use std::sync::Arc;

use vaultport::decoder::mock::MockDecoder;
use vaultport::encryption::mock::MockEncryptor;
use vaultport::import::{
    FileType, ImportConfig, ImportError, ImportOptions, ImportService, ImportSource, ImportTag,
    ImportedResource,
};
use vaultport::progress::{ChannelProgress, ImportProgress, NullProgress};
use vaultport::vault_client::mock::MockVault;
use vaultport::vault_client::VaultClient;

const TAG: &str = "import-kdbx-20240101120000";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn resource(name: &str, secret: &str, folder: &str) -> ImportedResource {
    ImportedResource {
        name: name.to_string(),
        secret_clear: secret.to_string(),
        folder_parent_path: folder.to_string(),
        ..Default::default()
    }
}

fn service(
    resources: Vec<ImportedResource>,
    folder_paths: Vec<String>,
    options: ImportOptions,
    vault: Arc<MockVault>,
    encryptor: Arc<MockEncryptor>,
) -> ImportService {
    let source = ImportSource {
        file_name: "passwords.kdbx".to_string(),
        file_type: FileType::Kdbx,
        bytes: vec![0u8; 16],
    };
    let config = ImportConfig::new("ada").with_options(options);

    ImportService::new(
        source,
        config,
        Arc::new(MockDecoder::new(resources, folder_paths)),
        encryptor,
        VaultClient::new(vault),
        Arc::new(NullProgress),
    )
    .with_import_tag(ImportTag::from_raw(TAG))
}

fn folder_options() -> ImportOptions {
    ImportOptions {
        import_folders: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_full_import_with_folders() {
    init_tracing();
    let vault = Arc::new(MockVault::new());
    let resources = vec![
        resource("mail", "hunter2", "Work"),
        resource("bank", "s3cret", "Work/Finance"),
        resource("wifi", "letmein", ""),
    ];
    let folder_paths = vec!["Work".to_string(), "Work/Finance".to_string()];

    let report = service(
        resources,
        folder_paths,
        folder_options(),
        vault.clone(),
        Arc::new(MockEncryptor::new()),
    )
    .exec()
    .await
    .unwrap();

    assert_eq!(report.import_tag, TAG);

    // root + Work + Work/Finance
    let folders = report.folders.expect("folder integration ran");
    assert_eq!(folders.created.len(), 3);
    assert!(folders.errors.is_empty());

    let created_folders = vault.created_folders();
    let root = created_folders
        .iter()
        .find(|f| f.name == TAG)
        .expect("run root folder");
    assert!(root.folder_parent_id.is_none());
    let work = created_folders.iter().find(|f| f.name == "Work").unwrap();
    assert_eq!(work.folder_parent_id.as_deref(), Some(root.id.as_str()));
    let finance = created_folders.iter().find(|f| f.name == "Finance").unwrap();
    assert_eq!(finance.folder_parent_id.as_deref(), Some(work.id.as_str()));

    // every resource created, linked into the recreated hierarchy
    assert_eq!(report.resources.created.len(), 3);
    assert!(report.resources.errors.is_empty());

    let created_resources = vault.created_resources();
    let mail = created_resources.iter().find(|r| r.name == "mail").unwrap();
    assert_eq!(mail.folder_parent_id.as_deref(), Some(work.id.as_str()));
    let bank = created_resources.iter().find(|r| r.name == "bank").unwrap();
    assert_eq!(bank.folder_parent_id.as_deref(), Some(finance.id.as_str()));
    // empty source path lands in the run root
    let wifi = created_resources.iter().find(|r| r.name == "wifi").unwrap();
    assert_eq!(wifi.folder_parent_id.as_deref(), Some(root.id.as_str()));
}

#[tokio::test]
async fn test_partial_failure_still_processes_later_batches() {
    init_tracing();
    let vault = Arc::new(MockVault::new());
    // 12 resources, batch size 5: batches of 5/5/2, failure in the second
    let resources: Vec<ImportedResource> = (0..12)
        .map(|i| resource(&format!("entry-{:02}", i), "pw", ""))
        .collect();
    vault.fail_on("entry-07");

    let report = service(
        resources,
        Vec::new(),
        ImportOptions::default(),
        vault.clone(),
        Arc::new(MockEncryptor::new()),
    )
    .exec()
    .await
    .unwrap();

    assert_eq!(report.resources.created.len(), 11);
    assert_eq!(report.resources.errors.len(), 1);
    assert_eq!(report.resources.errors[0].item.name, "entry-07");
    assert!(report.resources.errors[0].error.contains("entry-07"));
    assert_eq!(report.resources.total(), 12);

    // the third batch ran despite the second batch's failure
    assert!(vault
        .created_resources()
        .iter()
        .any(|r| r.name == "entry-11"));
}

#[tokio::test]
async fn test_folder_failure_skips_children_but_not_siblings() {
    let vault = Arc::new(MockVault::new());
    vault.fail_on("Broken");
    let folder_paths = vec![
        "Broken".to_string(),
        "Broken/Child".to_string(),
        "Fine".to_string(),
    ];

    let report = service(
        vec![resource("entry", "pw", "Fine")],
        folder_paths,
        folder_options(),
        vault.clone(),
        Arc::new(MockEncryptor::new()),
    )
    .exec()
    .await
    .unwrap();

    let folders = report.folders.unwrap();
    // root + Fine created; Broken errored; Broken/Child silently skipped
    assert_eq!(folders.created.len(), 2);
    assert_eq!(folders.errors.len(), 1);
    assert_eq!(folders.errors[0].item, format!("/{}/Broken", TAG));
    assert!(!folders
        .created
        .iter()
        .any(|f| f.name == "Child"));
    assert!(!folders
        .errors
        .iter()
        .any(|e| e.item.contains("Child")));

    // the resource under the surviving folder still linked correctly
    let fine = vault
        .created_folders()
        .into_iter()
        .find(|f| f.name == "Fine")
        .unwrap();
    let entry = vault.created_resources().pop().unwrap();
    assert_eq!(entry.folder_parent_id.as_deref(), Some(fine.id.as_str()));
}

#[tokio::test]
async fn test_count_mismatch_aborts_before_any_persistence() {
    let vault = Arc::new(MockVault::new());
    let encryptor = Arc::new(MockEncryptor::new());
    encryptor.force_result_count(1);

    let err = service(
        vec![resource("a", "pw", ""), resource("b", "pw", "")],
        vec!["Work".to_string()],
        folder_options(),
        vault.clone(),
        encryptor,
    )
    .exec()
    .await
    .unwrap_err();

    assert!(matches!(err, ImportError::Encryption(_)));
    assert!(vault.created_folders().is_empty());
    assert!(vault.created_resources().is_empty());
}

#[tokio::test]
async fn test_empty_secret_gets_no_secrets_field() {
    let vault = Arc::new(MockVault::new());
    let resources = vec![resource("blank", "", ""), resource("full", "pw", "")];

    let report = service(
        resources,
        Vec::new(),
        ImportOptions::default(),
        vault,
        Arc::new(MockEncryptor::new()),
    )
    .exec()
    .await
    .unwrap();

    assert_eq!(report.resources.created.len(), 2);
    assert!(report.resources.errors.is_empty());
}

#[tokio::test]
async fn test_progress_surface_lifecycle() {
    let vault = Arc::new(MockVault::new());
    let (sink, mut rx) = ChannelProgress::new();

    let source = ImportSource {
        file_name: "export.csv".to_string(),
        file_type: FileType::Csv,
        bytes: b"name,password\n".to_vec(),
    };
    let resources = vec![resource("a", "pw", ""), resource("b", "pw", "")];
    let service = ImportService::new(
        source,
        ImportConfig::new("ada"),
        Arc::new(MockDecoder::new(resources, Vec::new())),
        Arc::new(MockEncryptor::new()),
        VaultClient::new(vault),
        Arc::new(sink),
    );

    service.exec().await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    // open, one step per encrypt + one per save, close
    match &events[0] {
        ImportProgress::Opened { total_steps, .. } => assert_eq!(*total_steps, 4),
        other => panic!("expected Opened first, got {:?}", other),
    }
    assert_eq!(events.last(), Some(&ImportProgress::Closed));

    let steps: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ImportProgress::Step { step, .. } => Some(*step),
            _ => None,
        })
        .collect();
    assert_eq!(steps.len(), 4);
    // monotonically increasing steps
    assert!(steps.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_progress_closed_on_fatal_failure() {
    let vault = Arc::new(MockVault::new());
    let (sink, mut rx) = ChannelProgress::new();
    let encryptor = Arc::new(MockEncryptor::new());
    encryptor.force_result_count(5);

    let source = ImportSource {
        file_name: "passwords.kdbx".to_string(),
        file_type: FileType::Kdbx,
        bytes: vec![0u8; 16],
    };
    let service = ImportService::new(
        source,
        ImportConfig::new("ada"),
        Arc::new(MockDecoder::new(
            vec![resource("a", "pw", "")],
            Vec::new(),
        )),
        encryptor,
        VaultClient::new(vault),
        Arc::new(sink),
    );

    service.exec().await.unwrap_err();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.last(), Some(&ImportProgress::Closed));
}

#[tokio::test]
async fn test_folders_disabled_creates_none() {
    let vault = Arc::new(MockVault::new());

    let report = service(
        vec![resource("entry", "pw", "Work")],
        vec!["Work".to_string()],
        ImportOptions::default(), // import_folders off
        vault.clone(),
        Arc::new(MockEncryptor::new()),
    )
    .exec()
    .await
    .unwrap();

    assert!(report.folders.is_none());
    assert!(vault.created_folders().is_empty());
    let entry = vault.created_resources().pop().unwrap();
    assert!(entry.folder_parent_id.is_none());
}
