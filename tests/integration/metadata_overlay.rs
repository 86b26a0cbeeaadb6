use finder_meta::{
    DirectoryMetadataRecord, EntryKind, ItemHandle, Storage, StorageError, SIDECAR_FILE_NAME,
};
use proptest::prelude::*;

use crate::integration::support::{harness, T0};

#[tokio::test]
async fn bootstrap_records_every_child_once() {
    let h = harness();
    for name in ["a.txt", "b.txt", "c.md"] {
        h.storage
            .write_text(&format!("/Docs/{}", name), "x")
            .await
            .unwrap();
    }
    h.storage.create_dir("/Docs/Sub").await.unwrap();

    let record = h.store.get_record("/Docs").await.unwrap();
    assert_eq!(record.len(), 4);
    for entry in &record.entries {
        assert_eq!(entry.created_at, T0);
        assert_eq!(entry.modified_at, T0);
    }
    assert_eq!(record.get("Sub").unwrap().kind, EntryKind::Directory);

    let persisted = h.storage.read_text("/Docs/.finder-meta").await.unwrap();
    let parsed: DirectoryMetadataRecord = serde_json::from_str(&persisted).unwrap();
    assert_eq!(parsed, record);
}

#[tokio::test]
async fn repeated_reads_are_byte_identical() {
    let h = harness();
    h.storage.write_text("/Docs/a.txt", "x").await.unwrap();

    let first = h.store.get_record("/Docs").await.unwrap();
    let bytes_after_first = h.storage.read_text("/Docs/.finder-meta").await.unwrap();
    h.clock.advance(10_000);
    let second = h.store.get_record("/Docs").await.unwrap();
    let bytes_after_second = h.storage.read_text("/Docs/.finder-meta").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(bytes_after_first, bytes_after_second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn new_entry_is_appended_with_equal_timestamps() {
    let h = harness();
    h.storage.write_text("/Docs/a.txt", "x").await.unwrap();
    let before = h.store.get_record("/Docs").await.unwrap();
    assert!(before.get("x").is_none());

    h.clock.advance(500);
    h.storage.write_text("/Docs/x", "new").await.unwrap();
    h.sync
        .record_change(&ItemHandle::new("x", EntryKind::File, Some("/Docs")))
        .await
        .unwrap();

    let after = h.store.get_record("/Docs").await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let row = after.get("x").unwrap();
    assert_eq!(row.created_at, row.modified_at);
    assert_eq!(row.created_at, T0 + 500);
    assert_eq!(after.entries.iter().filter(|e| e.name == "x").count(), 1);
}

#[tokio::test]
async fn touching_existing_entry_keeps_created_at() {
    let h = harness();
    h.storage.write_text("/Docs/x", "v1").await.unwrap();
    let item = ItemHandle::new("x", EntryKind::File, Some("/Docs"));
    h.sync.record_change(&item).await.unwrap();

    let t1 = h.clock.advance(60_000);
    h.sync.record_change(&item).await.unwrap();

    let record = h.store.get_record("/Docs").await.unwrap();
    let row = record.get("x").unwrap();
    assert_eq!(row.created_at, T0);
    assert_eq!(row.modified_at, t1);
    assert_eq!(record.len(), 1);
}

#[tokio::test]
async fn parentless_item_updates_root_record() {
    let h = harness();
    h.storage.write_text("/top.txt", "x").await.unwrap();
    h.sync
        .record_change(&ItemHandle::new("top.txt", EntryKind::File, None))
        .await
        .unwrap();

    let root = h.store.get_record("/").await.unwrap();
    assert!(root.get("top.txt").is_some());
    assert!(h.storage.exists("/.finder-meta").await.unwrap());
}

#[tokio::test]
async fn sidecar_never_lists_itself() {
    let h = harness();
    h.storage.write_text("/Docs/a.txt", "x").await.unwrap();
    // A corrupt sidecar forces a bootstrap from a live listing that contains it
    h.storage
        .write_text("/Docs/.finder-meta", "garbage")
        .await
        .unwrap();
    let listing = h.storage.list_children("/Docs").await.unwrap();
    assert!(listing.iter().any(|c| c.name == SIDECAR_FILE_NAME));

    let record = h.store.get_record("/Docs").await.unwrap();
    assert_eq!(record.len(), 1);
    assert!(record.get(SIDECAR_FILE_NAME).is_none());

    h.sync
        .record_change(&ItemHandle::new("a.txt", EntryKind::File, Some("/Docs")))
        .await
        .unwrap();
    let record = h.store.get_record("/Docs").await.unwrap();
    assert!(record.get(SIDECAR_FILE_NAME).is_none());
}

#[tokio::test]
async fn docs_scenario() {
    let h = harness();
    h.storage.write_text("/Docs/a.txt", "a").await.unwrap();
    h.storage.write_text("/Docs/b.txt", "b").await.unwrap();

    let record = h.store.get_record("/Docs").await.unwrap();
    assert_eq!(record.len(), 2);
    let a_before = record.get("a.txt").unwrap().clone();
    let b_before = record.get("b.txt").unwrap().clone();
    assert_eq!(a_before.created_at, a_before.modified_at);

    h.clock.advance(1_000);
    h.storage.write_text("/Docs/c.txt", "c").await.unwrap();
    h.sync
        .record_change(&ItemHandle::from_path("/Docs/c.txt", EntryKind::File).unwrap())
        .await
        .unwrap();

    let record = h.store.get_record("/Docs").await.unwrap();
    assert_eq!(record.len(), 3);
    let c = record.get("c.txt").unwrap();
    assert_eq!(c.created_at, c.modified_at);
    assert_eq!(record.get("a.txt").unwrap(), &a_before);
    assert_eq!(record.get("b.txt").unwrap(), &b_before);
}

#[tokio::test]
async fn missing_directory_propagates_not_found() {
    let h = harness();
    assert!(matches!(
        h.store.get_record("/Nowhere").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(!h.storage.exists("/Nowhere").await.unwrap());
}

#[tokio::test]
async fn deletion_outside_the_synchronizer_leaves_a_stale_row() {
    let h = harness();
    h.storage.write_text("/Docs/a.txt", "a").await.unwrap();
    h.store.get_record("/Docs").await.unwrap();
    h.storage.remove("/Docs/a.txt").await.unwrap();

    // Plain reads accept drift; reconcile is the explicit repair
    assert!(h.store.get_record("/Docs").await.unwrap().get("a.txt").is_some());
    let repaired = h.store.reconcile("/Docs").await.unwrap();
    assert!(repaired.get("a.txt").is_none());
}

proptest! {
    #[test]
    fn bootstrap_completeness(names in prop::collection::hash_set("[a-z]{1,8}\\.txt", 0..12)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let h = harness();
            h.storage.create_dir("/Dir").await.unwrap();
            for name in &names {
                h.storage.write_text(&format!("/Dir/{}", name), "").await.unwrap();
            }

            let record = h.store.get_record("/Dir").await.unwrap();
            assert_eq!(record.len(), names.len());
            for name in &names {
                let row = record.get(name).unwrap();
                assert_eq!(row.created_at, row.modified_at);
            }
            let persisted: DirectoryMetadataRecord = serde_json::from_str(
                &h.storage.read_text("/Dir/.finder-meta").await.unwrap(),
            )
            .unwrap();
            assert_eq!(persisted, record);
        });
    }
}
