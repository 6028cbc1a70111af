//! Persistence round-trips through the TOML config store.

mod common;

use std::sync::Arc;

use slirc_ignore::{
    IgnoreLevel, IgnoreLevels, IgnoreStore, TextFilterMode, TomlConfigStore,
};

const SERVER: &str = "libera";

#[test]
fn mutations_survive_a_restart() {
    common::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ignore.toml");

    {
        let config = Arc::new(TomlConfigStore::open(&path).unwrap());
        let store = IgnoreStore::with_seed(config.seed(), config.clone());

        store.add_mask_with_levels(
            SERVER,
            "troll",
            IgnoreLevels::from(IgnoreLevel::Public),
            vec!["#ircafe".to_string()],
            Some(4_102_444_800_000),
            "*spam*",
            TextFilterMode::Glob,
            true,
        );
        store.add_mask(SERVER, "*!*@bad.example");
        store.add_soft_mask(SERVER, "chatty");
        store.remove_mask(SERVER, "*!*@bad.example");
    }

    // "Restart": reopen the document and seed a fresh store from it.
    let config = Arc::new(TomlConfigStore::open(&path).unwrap());
    let store = IgnoreStore::with_seed(config.seed(), config);

    assert_eq!(store.list_masks(SERVER), ["troll!*@*"]);
    assert_eq!(store.list_soft_masks(SERVER), ["chatty!*@*"]);
    assert_eq!(store.levels_for(SERVER, "troll"), IgnoreLevels::from(IgnoreLevel::Public));
    assert_eq!(store.channels_for(SERVER, "troll"), ["#ircafe"]);
    assert_eq!(store.expires_at_for(SERVER, "troll"), 4_102_444_800_000);
    assert_eq!(store.text_pattern_for(SERVER, "troll"), "*spam*");
    assert_eq!(store.text_pattern_mode_for(SERVER, "troll"), TextFilterMode::Glob);
    assert!(store.replies_for(SERVER, "troll"));
}

#[test]
fn prune_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ignore.toml");
    let now = 1_000_000i64;

    {
        let config = Arc::new(TomlConfigStore::open(&path).unwrap());
        let store = IgnoreStore::with_seed(config.seed(), config);
        store.add_mask_with_levels(
            SERVER, "old", IgnoreLevels::EMPTY, Vec::new(), Some(now - 1), "",
            TextFilterMode::Glob, false,
        );
        store.add_mask(SERVER, "keep");
        assert_eq!(store.prune_expired(SERVER, now), 1);
    }

    let config = Arc::new(TomlConfigStore::open(&path).unwrap());
    let store = IgnoreStore::with_seed(config.seed(), config);
    assert_eq!(store.list_masks(SERVER), ["keep!*@*"]);
}

#[test]
fn removing_a_server_clears_its_document_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ignore.toml");

    {
        let config = Arc::new(TomlConfigStore::open(&path).unwrap());
        let store = IgnoreStore::with_seed(config.seed(), config);
        store.add_mask(SERVER, "troll");
        store.add_mask("oftc", "other");
        assert!(store.remove_server(SERVER));
    }

    let config = TomlConfigStore::open(&path).unwrap();
    let seed = config.seed();
    assert!(!seed.servers.contains_key(SERVER));
    assert!(seed.servers.contains_key("oftc"));
}

#[test]
fn store_export_matches_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ignore.toml");

    let config = Arc::new(TomlConfigStore::open(&path).unwrap());
    let store = IgnoreStore::with_seed(config.seed(), config.clone());
    store.add_mask_with_levels(
        SERVER,
        "troll",
        IgnoreLevels::from(IgnoreLevel::Notices),
        Vec::new(),
        None,
        "",
        TextFilterMode::Glob,
        false,
    );
    store.add_soft_mask(SERVER, "chatty");

    assert_eq!(store.export_seed(), config.seed());
}
