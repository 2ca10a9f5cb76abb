//! Tests for the TOML file store, wired through the ServiceContainer

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use dictree::application::services::DictionaryService;
use dictree::config::{LanguageSeed, Settings};
use dictree::domain::{ActorId, LanguageId, Translation};
use dictree::infrastructure::di::ServiceContainer;
use dictree::infrastructure::store::TomlFileStore;
use dictree::infrastructure::traits::RealFileSystem;

/// Helper to create test settings pointing at a store inside `temp`
fn test_settings(temp: &TempDir) -> Settings {
    Settings {
        store_path: temp.path().join("data").join("dictionary.toml"),
        default_languages: vec![
            LanguageSeed {
                iso: "en-US".into(),
                name: "English".into(),
            },
            LanguageSeed {
                iso: "da-DK".into(),
                name: "Danish".into(),
            },
        ],
    }
}

#[test]
fn given_missing_store_file_when_listing_then_empty_and_no_file_written() {
    let temp = TempDir::new().unwrap();
    let settings = test_settings(&temp);
    let path = settings.store_path.clone();
    let container = ServiceContainer::new(settings);

    assert!(container.dictionary.list_tree().unwrap().is_empty());
    assert_eq!(container.dictionary.languages().unwrap().len(), 2);
    assert!(!path.exists());
}

#[test]
fn given_created_items_when_reopened_then_tree_and_translations_persist() {
    let temp = TempDir::new().unwrap();
    let settings = test_settings(&temp);

    let (root_id, child_id) = {
        let container = ServiceContainer::new(settings.clone());
        let root = container
            .dictionary
            .create("menu", None, Some(Translation::new("en-US", "Menu")))
            .unwrap();
        let child = container
            .dictionary
            .create("menu.file", Some(root.id), None)
            .unwrap();
        container
            .dictionary
            .upsert_translation(child.id, LanguageId::new("da-DK"), "Fil")
            .unwrap();
        (root.id, child.id)
    };

    let container = ServiceContainer::new(settings);
    let entries = container.dictionary.list_tree().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].item.id, root_id);
    assert_eq!(entries[1].item.id, child_id);
    assert_eq!(entries[1].depth, 1);
    assert_eq!(
        entries[1].item.translations.get(&"da-DK".into()),
        Some("Fil")
    );
}

#[test]
fn given_persisted_store_when_item_deleted_then_ids_not_reused() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(test_settings(&temp));
    let first = container.dictionary.create("a", None, None).unwrap();
    container
        .dictionary
        .delete(first.id, ActorId::default())
        .unwrap();

    let second = container.dictionary.create("a", None, None).unwrap();

    assert!(second.id > first.id);
}

#[test]
fn given_write_when_finished_then_no_temp_file_left() {
    let temp = TempDir::new().unwrap();
    let settings = test_settings(&temp);
    let dir = settings.store_path.parent().unwrap().to_path_buf();
    let container = ServiceContainer::new(settings);

    container.dictionary.create("a", None, None).unwrap();

    let names: HashSet<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains("dictionary.toml"));
    assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{names:?}");
}

/// Each thread owns its own store instance, as separate CLI processes would.
#[test]
fn given_two_stores_on_same_file_when_creating_concurrently_then_no_write_lost() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dictionary.toml");
    let per_writer = 50;
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|prefix| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let store = TomlFileStore::new(path, Arc::new(RealFileSystem));
                let service = DictionaryService::new(Arc::new(store));
                barrier.wait();
                (0..per_writer)
                    .filter(|i| service.create(&format!("{prefix}{i}"), None, None).is_ok())
                    .count()
            })
        })
        .collect();
    let reported: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let reader = DictionaryService::new(Arc::new(TomlFileStore::new(
        &path,
        Arc::new(RealFileSystem),
    )));
    let persisted = reader.list_tree().unwrap();
    assert_eq!(reported, 2 * per_writer);
    assert_eq!(persisted.len(), reported);
    let ids: HashSet<_> = persisted.iter().map(|e| e.item.id).collect();
    assert_eq!(ids.len(), persisted.len());
}

#[test]
fn given_two_stores_on_same_file_when_same_key_created_then_second_conflicts() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dictionary.toml");
    let first = DictionaryService::new(Arc::new(TomlFileStore::new(
        &path,
        Arc::new(RealFileSystem),
    )));
    let second = DictionaryService::new(Arc::new(TomlFileStore::new(
        &path,
        Arc::new(RealFileSystem),
    )));

    first.create("greeting", None, None).unwrap();
    let err = second.create("greeting", None, None).unwrap_err();

    assert!(err.is_validation());
    assert_eq!(first.list_tree().unwrap().len(), 1);
}

#[test]
fn given_existing_key_in_file_when_create_again_then_validation_error() {
    let temp = TempDir::new().unwrap();
    let container = ServiceContainer::new(test_settings(&temp));
    container.dictionary.create("greeting", None, None).unwrap();

    let err = container
        .dictionary
        .create("greeting", None, None)
        .unwrap_err();

    assert!(err.is_validation());
}
