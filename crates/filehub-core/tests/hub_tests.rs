//! Integration tests for the FileHub public interface.
//!
//! These tests drive the façade against real registry documents on disk,
//! including hand-written ones with loose typing and unknown keys.

use filehub_core::{
    AccessDefaults, DeliveryKind, FileHub, FileHubConfig, FileHubError, FindOutcome, IndexMode,
    MetadataUpdate, Principals, Requester, SendAs,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const JPEG_HEADER: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
];

/// Create a root with a few files and a hand-written registry.
fn create_test_root(registry: Value) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();
    std::fs::create_dir_all(root.join("img")).unwrap();
    std::fs::write(root.join("img/team.jpg"), JPEG_HEADER).unwrap();
    std::fs::write(root.join("handbook.pdf"), b"%PDF-1.7 handbook").unwrap();
    std::fs::write(
        root.join("registry.json"),
        serde_json::to_string_pretty(&registry).unwrap(),
    )
    .unwrap();
    temp_dir
}

fn sample_registry() -> Value {
    json!({
        "version": 3,
        "files": [
            {
                "id": "team",
                "path": "img/team.jpg",
                "name": "Team Photo",
                "description": "offsite team photo",
                "tags": ["team", "photo"],
                "send_as": "image",
                "permissions": {
                    "allow": {"users": [], "groups": ["100"]},
                    "deny": {"users": [42], "groups": []}
                },
                "uploaded_by": "admin"
            },
            {
                "id": 7,
                "path": "handbook.pdf",
                "description": "employee handbook",
                "tags": "policy",
                "send_as": "FILE"
            },
            "not an entry"
        ]
    })
}

fn open(root: &TempDir) -> FileHub {
    FileHub::new(FileHubConfig::with_root(root.path())).unwrap()
}

#[test]
fn test_hub_creation_fails_for_nonexistent_root() {
    let result = FileHub::builder("/nonexistent/path/that/does/not/exist").build();
    assert!(result.is_err());
}

#[test]
fn test_lenient_registry_is_readable() {
    let root = create_test_root(sample_registry());
    let hub = open(&root);

    let handbook = hub.get(&Requester::anonymous(), "7").unwrap();
    assert_eq!(handbook.tags, vec!["policy"]);
    assert_eq!(handbook.send_as, SendAs::File);
    assert_eq!(hub.info().entry_count, 2);
}

#[test]
fn test_unknown_keys_survive_an_edit() {
    let root = create_test_root(sample_registry());
    let hub = open(&root);

    hub.update_metadata(
        "team",
        MetadataUpdate {
            description: Some("2024 offsite".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(root.path().join("registry.json")).unwrap())
            .unwrap();
    assert_eq!(saved["version"], 3);
    assert_eq!(saved["files"][0]["uploaded_by"], "admin");
    assert_eq!(saved["files"][0]["description"], "2024 offsite");
    assert_eq!(saved["files"].as_array().unwrap().len(), 2);
    assert!(root.path().join("registry.json.bak").exists());
}

#[test]
fn test_group_allow_and_user_deny() {
    let root = create_test_root(sample_registry());
    let hub = open(&root);

    let member = Requester::new("100", "7");
    let banned_member = Requester::new("100", "42");
    let outsider = Requester::new("200", "7");

    let plan = hub.prepare_delivery(&member, "team").unwrap();
    assert_eq!(plan.kind, DeliveryKind::Image);
    assert_eq!(plan.name, "Team Photo");

    assert!(matches!(
        hub.prepare_delivery(&banned_member, "team"),
        Err(FileHubError::PermissionDenied { .. })
    ));
    assert!(matches!(
        hub.prepare_delivery(&outsider, "team"),
        Err(FileHubError::PermissionDenied { .. })
    ));

    // Search results never leak entries the requester cannot open
    assert!(hub.list(&outsider, "photo").is_empty());
    assert_eq!(hub.list(&member, "photo").len(), 1);
}

#[test]
fn test_global_defaults_apply_to_open_entries() {
    let root = create_test_root(sample_registry());
    let mut config = FileHubConfig::with_root(root.path());
    config.access = AccessDefaults {
        allow: Principals::new(["admin"], Vec::<String>::new()),
        deny: Principals::default(),
    };
    let hub = FileHub::new(config).unwrap();

    // handbook declares no allow list, so the global one applies
    assert!(hub.get(&Requester::new("", "admin"), "7").is_ok());
    assert!(hub.get(&Requester::new("", "someone"), "7").is_err());
    // team declares its own allow list, which replaces the global one
    assert!(hub.get(&Requester::new("", "admin"), "team").is_err());
}

#[test]
fn test_find_and_prepare_on_real_registry() {
    let root = create_test_root(sample_registry());
    let hub = open(&root);

    match hub.find_and_prepare(&Requester::anonymous(), "handbook").unwrap() {
        FindOutcome::Deliver(plan) => {
            assert_eq!(plan.kind, DeliveryKind::File);
            assert_eq!(plan.absolute_path, root.path().join("handbook.pdf"));
        }
        other => panic!("expected delivery, got {:?}", other),
    }
}

#[test]
fn test_index_skips_catalogued_files() {
    let root = create_test_root(sample_registry());
    std::fs::write(root.path().join("img/new.webp"), b"RIFF\0\0\0\0WEBPVP8 ").unwrap();
    let hub = open(&root);

    let report = hub.index_directory(IndexMode::All, true).unwrap();
    assert_eq!(report.added_ids, vec!["new"]);
    assert_eq!(hub.info().entry_count, 3);
}

#[test]
fn test_relative_root_indexes_each_file_once() {
    let dir = tempfile::Builder::new()
        .prefix("rel-root")
        .tempdir_in(".")
        .unwrap();
    let relative = dir.path().strip_prefix(".").unwrap().to_path_buf();
    assert!(relative.is_relative());
    std::fs::write(relative.join("a.png"), JPEG_HEADER).unwrap();

    let hub = FileHub::builder(&relative).build().unwrap();
    assert!(hub.root_dir().is_absolute());

    let first = hub.index_directory(IndexMode::All, true).unwrap();
    assert_eq!(first.added_ids, vec!["a"]);
    let second = hub.index_directory(IndexMode::All, true).unwrap();
    assert_eq!(second.added, 0);

    let (registry, _) = hub.store().load();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.find("a").unwrap().path, "a.png");
}

#[test]
fn test_two_hubs_sharing_a_root_do_not_lose_updates() {
    let root = create_test_root(json!({ "files": [] }));
    let sources = TempDir::new().unwrap();
    for n in 0..6 {
        std::fs::write(sources.path().join(format!("doc{}.txt", n)), "x").unwrap();
    }
    let hubs = [Arc::new(open(&root)), Arc::new(open(&root))];

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let hub = Arc::clone(&hubs[n % 2]);
            let source = sources.path().join(format!("doc{}.txt", n));
            std::thread::spawn(move || hub.import_file(&source, Default::default()).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let (registry, _) = hubs[0].store().load();
    assert_eq!(registry.len(), 6);
    assert_eq!(registry.ids().len(), 6);
}
