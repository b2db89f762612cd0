//! Diagnostic snapshots of registry contents

use crate::series::SeriesKind;
use serde::{Deserialize, Serialize};

/// Totals over every registered series
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    /// Number of registered series
    pub series_count: usize,
    /// Sum of the series' memory usage in bytes
    pub memory_usage: usize,
    /// Sum of the series' sample counts
    pub num_samples: usize,
}

/// Per-series snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Registered name
    pub name: String,
    /// Dense or sparse
    pub kind: SeriesKind,
    /// Number of samples
    pub size: usize,
    /// Bytes held by the series
    pub memory_usage: usize,
    /// Covered interval, `None` while a sparse series is empty
    pub span: Option<(f64, f64)>,
}

impl DatabaseStats {
    /// Memory usage in mebibytes, for display
    pub fn memory_mib(&self) -> f64 {
        self.memory_usage as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_mib() {
        let stats = DatabaseStats {
            series_count: 1,
            memory_usage: 3 * 1024 * 1024,
            num_samples: 10,
        };
        assert_eq!(stats.memory_mib(), 3.0);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = SeriesStats {
            name: "sine".to_string(),
            kind: SeriesKind::Dense,
            size: 4,
            memory_usage: 128,
            span: Some((0.0, 4.0)),
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"kind\":\"dense\""));
        let loaded: SeriesStats = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, stats);
    }
}
