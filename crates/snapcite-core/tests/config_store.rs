//! Config file drives where saved citations live.

use std::path::PathBuf;

use snapcite_core::config_file::{self, ConfigFile, NetworkConfig, StorageConfig};
use snapcite_core::{Config, SavedCitation, SavedCitations, SqliteStore};

#[test]
fn configured_store_path_round_trips_saved_citations() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("nested").join("citations.db");

    let file = ConfigFile {
        storage: Some(StorageConfig {
            store_path: Some(store_path.to_string_lossy().into_owned()),
        }),
        network: Some(NetworkConfig {
            fetch_timeout_secs: Some(5),
            user_agent: None,
        }),
        ..Default::default()
    };
    let config_path = dir.path().join("config.toml");
    config_file::save_to_path(&file, &config_path).unwrap();

    let loaded = config_file::load_from_path(&config_path).unwrap();
    let config = Config::from_file(&loaded);
    assert_eq!(config.fetch_timeout().as_secs(), 5);
    assert_eq!(config.resolved_store_path(), Some(PathBuf::from(&store_path)));

    let path = config.resolved_store_path().unwrap();
    {
        let saved = SavedCitations::new(SqliteStore::open(&path).unwrap());
        saved
            .save(SavedCitation::new("Older", "Older (2019).", "APA"))
            .unwrap();
        saved
            .save(SavedCitation::new("Newer", "Newer (2020).", "MLA"))
            .unwrap();
    }

    let saved = SavedCitations::new(SqliteStore::open(&path).unwrap());
    let titles: Vec<String> = saved.list().unwrap().into_iter().map(|c| c.title).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);

    assert_eq!(
        saved.delete(0).unwrap().map(|c| c.format),
        Some("MLA".to_string())
    );
    assert!(saved.delete(5).unwrap().is_none());
    assert_eq!(saved.list().unwrap().len(), 1);
}
