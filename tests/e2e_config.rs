//! E2E tests for engine configuration
//!
//! Verifies that a saved config round-trips from disk and that series built
//! from it follow its settings.

use sigscope::series::sparse::{BinAnchor, InsertMode};
use sigscope::EngineConfig;

#[test]
fn test_config_drives_series_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sigscope").join("engine.json");

    let config = EngineConfig {
        chunk_size: 128,
        sample_rate: 1000,
        sparse_insert: InsertMode::Unordered,
        bin_anchor: BinAnchor::Start,
    };
    config.save(&path).unwrap();

    let loaded = EngineConfig::load(&path);
    assert_eq!(loaded, config);

    let dense = loaded.dense_series(0.0);
    dense.push_samples(&[1.0; 1000]);
    assert_eq!(dense.get_span(), (0.0, 1.0));

    let sparse = loaded.sparse_series();
    sparse.push_value(2.0, 2.0).unwrap();
    sparse.push_value(1.0, 1.0).unwrap();
    let means = sparse.mean_bins_anchored(1.0, 1.0, 2, loaded.bin_anchor);
    assert_eq!(means, vec![1.0, 2.0]);
}

#[test]
fn test_partial_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("engine.json");
    std::fs::write(&path, r#"{"chunk_size": 64}"#).unwrap();

    let config = EngineConfig::load(&path);
    assert_eq!(config.chunk_size, 64);
    assert_eq!(config.sample_rate, sigscope::DEFAULT_SAMPLE_RATE);
    assert_eq!(config.sparse_insert, InsertMode::Append);
}

/// Per-second history bins start where the configured anchor puts them
#[test]
fn test_bin_anchor_shifts_history_bins() {
    let frame_times = EngineConfig::default().sparse_series();
    for (time, ms) in [(0.5, 9.0), (1.2, 1.0), (1.8, 3.0), (2.6, 5.0)] {
        frame_times.push_value(time, ms).unwrap();
    }
    let (first, last) = frame_times.span().unwrap();

    let mut per_anchor = Vec::new();
    for anchor in [BinAnchor::Zero, BinAnchor::Start] {
        let origin = anchor.origin(first);
        let count = (last - origin).floor() as usize + 1;
        per_anchor.push(frame_times.mean_bins_anchored(first, 1.0, count, anchor));
    }

    assert_eq!(per_anchor[0], vec![9.0, 2.0, 5.0]);
    assert_eq!(per_anchor[1], vec![5.0, 3.0, 5.0]);
}
