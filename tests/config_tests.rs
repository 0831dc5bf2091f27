use std::env;

use rankskip::{Settings, SkipList};
use serial_test::serial;

const VARS: [&str; 3] = ["RANKSKIP_SEED", "RANKSKIP_LOG_LEVEL", "RANKSKIP_LOG_JSON"];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_defaults_without_env() {
    clear_env();

    let settings = Settings::load().unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.seed, None);
    assert_eq!(settings.log_level, "info");
    assert!(!settings.log_json);
}

#[test]
#[serial]
fn test_load_reads_prefixed_env() {
    clear_env();
    env::set_var("RANKSKIP_SEED", "42");
    env::set_var("RANKSKIP_LOG_LEVEL", "debug");
    env::set_var("RANKSKIP_LOG_JSON", "true");

    let settings = Settings::load();
    clear_env();

    let settings = settings.unwrap();
    assert_eq!(settings.seed, Some(42));
    assert_eq!(settings.log_level, "debug");
    assert!(settings.log_json);
}

#[test]
#[serial]
fn test_load_rejects_malformed_seed() {
    clear_env();
    env::set_var("RANKSKIP_SEED", "not-a-number");

    let settings = Settings::load();
    clear_env();

    assert!(settings.is_err());
}

#[test]
#[serial]
fn test_seeded_settings_give_reproducible_layers() {
    clear_env();
    env::set_var("RANKSKIP_SEED", "2024");

    let settings = Settings::load();
    clear_env();
    let settings = settings.unwrap();

    let mut a = SkipList::from_settings(&settings);
    let mut b = SkipList::from_settings(&settings);
    for i in 0..500 {
        a.add(i);
        b.add(i);
    }

    assert!(a.layers().eq(b.layers()));
    assert_eq!(a.height(), b.height());
}
