//! Environment layer of settings loading
//!
//! Kept in its own test binary: it mutates process environment that every
//! `Settings::load` call reads.

use std::path::PathBuf;

use tempfile::TempDir;

use dictree::config::Settings;

#[test]
fn given_store_path_env_var_when_load_then_overrides_files() {
    let temp = TempDir::new().unwrap();
    let explicit = temp.path().join("dictree.toml");
    std::fs::write(&explicit, r#"store_path = "/srv/from-file.toml""#).unwrap();

    std::env::set_var("DICTREE_STORE_PATH", "/tmp/from-env.toml");
    let without_file = Settings::load(None);
    let with_file = Settings::load(Some(&explicit));
    std::env::remove_var("DICTREE_STORE_PATH");

    assert_eq!(
        without_file.unwrap().store_path,
        PathBuf::from("/tmp/from-env.toml")
    );
    assert_eq!(
        with_file.unwrap().store_path,
        PathBuf::from("/tmp/from-env.toml")
    );
    assert_eq!(
        Settings::load(Some(&explicit)).unwrap().store_path,
        PathBuf::from("/srv/from-file.toml")
    );
}
