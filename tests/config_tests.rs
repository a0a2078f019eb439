//! Tests for persisted configuration.

use std::fs;
use std::path::Path;

use isleplan::config::{ConfigError, Configuration};
use isleplan::strictness::{Strictness, When};

#[test]
fn test_defaults_use_relaxed_preset() {
    let config = Configuration::default();
    assert!(!config.strict);
    assert_eq!(config.strictness(), &Strictness::relaxed_defaults());

    let options = config.options().expect("defaults are valid");
    assert_eq!(options.rest_cycles, vec![false; 7]);
    assert_eq!(options.limits.workshops, 4);
    assert_eq!(options.result_limit, 100);
}

#[test]
fn test_strict_switch_selects_strict_preset() {
    let config = Configuration {
        strict: true,
        ..Configuration::default()
    };
    let options = config.options().expect("valid");
    assert_eq!(options.strictness, Strictness::strict_defaults());
}

#[test]
fn test_partial_json_fills_defaults() {
    let config: Configuration =
        serde_json::from_str(r#"{ "strict": true, "rest_cycles": [0, 3], "result_limit": 5 }"#)
            .expect("valid JSON");

    assert!(config.strict);
    assert_eq!(config.result_limit, 5);
    assert_eq!(config.limits.cycles, 7);

    let options = config.options().expect("valid");
    assert_eq!(
        options.rest_cycles,
        vec![true, false, false, true, false, false, false]
    );
    assert!(options.is_rest(3));
    assert!(!options.is_rest(12));
}

#[test]
fn test_custom_preset_from_json() {
    let config: Configuration = serde_json::from_str(
        r#"{ "relaxed_defaults": { "per_cycle": ["Never", "Always", "Required"] } }"#,
    )
    .expect("valid JSON");

    assert_eq!(config.strictness().for_cycle(1), When::Always);
    assert_eq!(config.strictness().for_cycle(2), When::Required);
    assert_eq!(config.strictness().for_cycle(5), When::Never);
}

#[test]
fn test_rest_cycle_out_of_range() {
    let config = Configuration {
        rest_cycles: vec![7],
        ..Configuration::default()
    };
    assert!(matches!(
        config.options(),
        Err(ConfigError::RestCycleOutOfRange {
            cycle: 7,
            cycles: 7
        })
    ));
}

#[test]
fn test_empty_limits_are_rejected() {
    let config: Configuration =
        serde_json::from_str(r#"{ "limits": { "workshops": 0 } }"#).expect("valid JSON");
    assert_eq!(config.limits.cycles, 7);
    assert!(matches!(
        config.options(),
        Err(ConfigError::InvalidLimits(_))
    ));

    let config: Configuration =
        serde_json::from_str(r#"{ "limits": { "cycles": 0 } }"#).expect("valid JSON");
    assert!(matches!(
        config.options(),
        Err(ConfigError::InvalidLimits(_))
    ));

    let config: Configuration =
        serde_json::from_str(r#"{ "limits": { "workshops": 1, "cycles": 1 } }"#)
            .expect("valid JSON");
    let options = config.options().expect("smallest valid shape");
    assert_eq!(options.rest_cycles, vec![false]);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = Path::new("target/isleplan-tests/does-not-exist.json");
    let config = Configuration::load_or_default(path).expect("defaults");
    assert_eq!(config, Configuration::default());
    assert!(matches!(
        Configuration::load(path),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_load_round_trips_saved_file() {
    let dir = Path::new("target/isleplan-tests");
    fs::create_dir_all(dir).expect("create test dir");
    let path = dir.join("config.json");

    let config = Configuration {
        strict: true,
        rest_cycles: vec![6],
        work_per_call: 1_000,
        ..Configuration::default()
    };
    fs::write(&path, serde_json::to_string_pretty(&config).expect("serialize"))
        .expect("write config");

    assert_eq!(Configuration::load(&path).expect("load"), config);
}

#[test]
fn test_malformed_file_is_reported() {
    let dir = Path::new("target/isleplan-tests");
    fs::create_dir_all(dir).expect("create test dir");
    let path = dir.join("broken.json");
    fs::write(&path, "{ strict: yes").expect("write config");

    assert!(matches!(
        Configuration::load(&path),
        Err(ConfigError::Parse { .. })
    ));
}
