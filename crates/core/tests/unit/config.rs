//! Configuration Unit Tests.
//!
//! Verifies JSON deserialization, field defaults, and the L2-presence rule.

use cachesim_core::config::{LevelConfig, SimConfig};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn deserializes_full_config() {
    let config: SimConfig = serde_json::from_str(
        r#"{
            "block_bytes": 16,
            "l1": { "size_bytes": 1024, "assoc": 2 },
            "l2": { "size_bytes": 65536, "assoc": 8 },
            "pref_n": 3,
            "pref_m": 4
        }"#,
    )
    .unwrap();

    assert_eq!(config.block_bytes, 16);
    assert_eq!(
        config.l1,
        LevelConfig {
            size_bytes: 1024,
            assoc: 2,
        }
    );
    assert_eq!(
        config.l2,
        LevelConfig {
            size_bytes: 65536,
            assoc: 8,
        }
    );
    assert_eq!(config.pref_n, 3);
    assert_eq!(config.pref_m, 4);
}

/// Omitted fields fall back to the baseline hierarchy.
#[test]
fn partial_config_uses_defaults() {
    let config: SimConfig =
        serde_json::from_str(r#"{ "l1": { "size_bytes": 4096, "assoc": 8 } }"#).unwrap();

    assert_eq!(config.block_bytes, 32);
    assert_eq!(config.l1.size_bytes, 4096);
    assert_eq!(config.l1.assoc, 8);
    assert!(!config.has_l2());
    assert_eq!(config.pref_n, 0);
    assert_eq!(config.pref_m, 0);
}

#[test]
fn empty_object_is_the_default_config() {
    let config: SimConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, SimConfig::default());
}

#[test]
fn default_is_8k_4way_l1_only() {
    let config = SimConfig::default();
    assert_eq!(config.block_bytes, 32);
    assert_eq!(config.l1.size_bytes, 8192);
    assert_eq!(config.l1.assoc, 4);
    assert!(!config.has_l2());
}

/// L2 exists only when both its size and associativity are non-zero.
#[rstest]
#[case(0, 0, false)]
#[case(0, 4, false)]
#[case(65536, 0, false)]
#[case(65536, 8, true)]
fn l2_presence_requires_both_fields(
    #[case] size_bytes: u32,
    #[case] assoc: u32,
    #[case] present: bool,
) {
    let config = SimConfig {
        l2: LevelConfig { size_bytes, assoc },
        ..SimConfig::default()
    };
    assert_eq!(config.has_l2(), present);
    assert_eq!(config.l2.is_disabled(), !present);
}
