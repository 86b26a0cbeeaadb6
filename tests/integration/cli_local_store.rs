use finder_meta::config::MetaConfig;
use finder_meta::tooling::cli::{CliContext, Commands};
use finder_meta::{ApiError, Finder, LocalStorage, ManualClock, Storage, StorageError};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use crate::integration::support::T0;

fn local_finder(temp: &TempDir) -> (Arc<ManualClock>, Finder) {
    let clock = Arc::new(ManualClock::new(T0));
    let storage = LocalStorage::open(temp.path().join("store")).unwrap();
    let finder = Finder::new(Arc::new(storage), clock.clone(), MetaConfig::default());
    (clock, finder)
}

#[tokio::test]
async fn sidecar_on_disk_has_the_persisted_shape() {
    let temp = TempDir::new().unwrap();
    let (_, finder) = local_finder(&temp);
    finder.create_file("/Docs/a.txt", "hello").await.unwrap();

    let raw = fs::read_to_string(temp.path().join("store/Docs/.finder-meta")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "a.txt");
    assert_eq!(entries[0]["kind"], "file");
    assert_eq!(entries[0]["createdAt"], T0);
    assert_eq!(entries[0]["modifiedAt"], T0);

    let root = fs::read_to_string(temp.path().join("store/.finder-meta")).unwrap();
    assert!(root.contains(r#""kind":"directory""#));
}

#[tokio::test]
async fn preexisting_host_files_are_backfilled() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("store/Docs");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("a.txt"), "a").unwrap();
    fs::write(docs.join("b.txt"), "b").unwrap();

    let (clock, finder) = local_finder(&temp);
    let views = finder.list("/Docs").await.unwrap();
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|v| v.created_at == Some(T0)));

    clock.advance(2_000);
    finder.write_file("/Docs/a.txt", "changed").await.unwrap();
    let views = finder.list("/Docs").await.unwrap();
    let a = views.iter().find(|v| v.name == "a.txt").unwrap();
    assert_eq!(a.created_at, Some(T0));
    assert_eq!(a.modified_at, Some(T0 + 2_000));
    assert_eq!(a.size, Some(7));
}

#[tokio::test]
async fn rename_in_place_keeps_creation_time() {
    let temp = TempDir::new().unwrap();
    let (clock, finder) = local_finder(&temp);
    finder.create_file("/notes.txt", "n").await.unwrap();
    clock.advance(5_000);
    finder.rename("/notes.txt", "/todo.txt").await.unwrap();

    let record = finder.metadata().get_record("/").await.unwrap();
    assert!(record.get("notes.txt").is_none());
    let row = record.get("todo.txt").unwrap();
    assert_eq!(row.created_at, T0);
    assert_eq!(row.modified_at, T0 + 5_000);
}

#[tokio::test]
async fn reserved_name_is_rejected_on_disk_too() {
    let temp = TempDir::new().unwrap();
    let (_, finder) = local_finder(&temp);
    finder.create_file("/a.txt", "a").await.unwrap();
    let err = finder.rename("/a.txt", "/.finder-meta").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::StorageError(StorageError::ReservedName(_))
    ));
    assert!(temp.path().join("store/a.txt").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_disk_reads_never_reset_creation_times() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(T0));
    let storage = Arc::new(LocalStorage::open(temp.path().join("store")).unwrap());
    for i in 0..100 {
        storage
            .write_text(&format!("/Docs/f{:03}.txt", i), "x")
            .await
            .unwrap();
    }
    let finder = Arc::new(Finder::new(storage, clock.clone(), MetaConfig::default()));
    finder.metadata().get_record("/Docs").await.unwrap();
    clock.advance(1_000);

    let writer = tokio::spawn({
        let finder = finder.clone();
        async move {
            for _ in 0..150 {
                finder.touch("/Docs/f000.txt").await.unwrap();
            }
        }
    });
    for _ in 0..150 {
        let record = finder.metadata().get_record("/Docs").await.unwrap();
        assert_eq!(record.len(), 100);
        assert!(record.entries.iter().all(|row| row.created_at == T0));
    }
    writer.await.unwrap();

    let record = finder.metadata().get_record("/Docs").await.unwrap();
    assert!(record.entries.iter().all(|row| row.created_at == T0));
    assert_eq!(record.get("f000.txt").unwrap().modified_at, T0 + 1_000);
}

#[tokio::test]
async fn store_config_file_stays_out_of_the_listing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("store");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("finder.toml"), "[meta]\nheal_corrupt = true\n").unwrap();
    let (_, finder) = local_finder(&temp);
    finder.create_file("/a.txt", "a").await.unwrap();

    let names: Vec<String> = finder
        .list("/")
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(names, vec!["a.txt"]);
    assert!(finder
        .metadata()
        .get_record("/")
        .await
        .unwrap()
        .get("finder.toml")
        .is_none());

    let err = finder.remove("/finder.toml").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::StorageError(StorageError::ReservedName(_))
    ));
    assert!(root.join("finder.toml").exists());
}

#[tokio::test]
async fn cli_commands_drive_the_store() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("cli-store");
    let config_path = temp.path().join("finder.toml");
    fs::write(
        &config_path,
        format!("[storage]\nroot = {:?}\n", root.to_string_lossy()),
    )
    .unwrap();

    let cli = CliContext::new(None, Some(config_path)).unwrap();
    assert_eq!(cli.root(), &root);

    let seeded = cli.execute(&Commands::Seed).await.unwrap();
    assert!(seeded.contains("/Documents/doc1.txt"));
    cli.execute(&Commands::Touch {
        path: "/Documents/new.txt".to_string(),
    })
    .await
    .unwrap();

    let listing = cli
        .execute(&Commands::Ls {
            path: "/Documents".to_string(),
            format: "json".to_string(),
        })
        .await
        .unwrap();
    let views: serde_json::Value = serde_json::from_str(&listing).unwrap();
    let names: Vec<&str> = views
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["doc1.txt", "new.txt"]);

    let meta = cli
        .execute(&Commands::Meta {
            path: "/".to_string(),
        })
        .await
        .unwrap();
    assert!(meta.contains("Documents"));
    assert!(meta.contains("Downloads"));
    assert!(!meta.contains(".finder-meta"));

    let err = cli
        .execute(&Commands::Ls {
            path: "/Missing".to_string(),
            format: "text".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::StorageError(StorageError::NotFound(_))
    ));
}
