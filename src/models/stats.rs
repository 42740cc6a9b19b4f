use serde::{Deserialize, Serialize};

/// Per-city aggregate returned by `GET /admin/stats/heatmap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub city: String,
    pub count: i64,
    #[serde(default)]
    pub priority_avg: f64,
}

/// Relative density band for a cell, given the maximum count on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Low,
    Medium,
    High,
    Critical,
}

impl HeatmapCell {
    pub fn intensity(&self, max_count: i64) -> Intensity {
        // Same quartile thresholds the heatmap legend uses
        let max = max_count.max(1) as f64;
        let ratio = self.count as f64 / max;
        if ratio > 0.75 {
            Intensity::Critical
        } else if ratio > 0.5 {
            Intensity::High
        } else if ratio > 0.25 {
            Intensity::Medium
        } else {
            Intensity::Low
        }
    }
}
