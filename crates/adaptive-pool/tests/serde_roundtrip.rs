//! JSON roundtrip of configuration and statistics snapshots

#![cfg(feature = "serde")]

use nebula_adaptive_pool::{
    AdaptivePool, AdaptivePoolConfig, FreeListConfig, NormalConfig, NormalVec, StatsSnapshot,
};
use pretty_assertions::assert_eq;

#[test]
fn pool_config_roundtrip() {
    let config = AdaptivePoolConfig::seasonal().with_free_list(FreeListConfig::Bounded(64));
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"adaptation_window":500.0,"free_list":{"bounded":64}}"#);

    let back: AdaptivePoolConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn pool_config_defaults_missing_fields() {
    let config: AdaptivePoolConfig = serde_json::from_str(r#"{"adaptation_window":100}"#).unwrap();
    assert_eq!(config.adaptation_window, 100.0);
    assert_eq!(config.free_list, FreeListConfig::default());

    let config: AdaptivePoolConfig =
        serde_json::from_str(r#"{"free_list":"unbounded"}"#).unwrap();
    assert_eq!(config.free_list, FreeListConfig::Unbounded);
}

#[test]
fn normal_config_roundtrip() {
    let config: NormalConfig = serde_json::from_str(r#"{"threshold":2.5}"#).unwrap();
    assert_eq!(config, NormalConfig::new(2.5));

    let config = NormalConfig::new(1.0).with_min_size(512);
    let back: NormalConfig =
        serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
    assert_eq!(back, config);
}

#[test]
fn stats_snapshot_roundtrip() {
    let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::new(NormalVec::new(1.0).unwrap()).unwrap();
    pool.release(vec![0u8; 10]);
    pool.release(vec![0u8; 20]);

    let snapshot = pool.stats();
    let back: StatsSnapshot =
        serde_json::from_str(&serde_json::to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(back, snapshot);
    assert_eq!(back.std_dev, 5.0);
}

#[test]
fn stats_snapshot_without_spread_roundtrip() {
    let pool: AdaptivePool<Vec<u8>, _> = AdaptivePool::new(NormalVec::new(1.0).unwrap()).unwrap();

    // empty pool, then a single release: std dev is NaN in both
    for expected_n in [0.0, 1.0] {
        if expected_n > 0.0 {
            pool.release(vec![0u8; 10]);
        }
        let snapshot = pool.stats();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""std_dev":null"#), "{json}");

        let back: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.n, expected_n);
        assert_eq!(back.actual_n, snapshot.actual_n);
        assert_eq!(back.mean, snapshot.mean);
        assert!(back.std_dev.is_nan());
    }
}
