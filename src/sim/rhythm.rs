//! Rhythm analysis over input-press intervals
//!
//! Pauses (intervals of 300ms or more) are not spam and are ignored.

use serde::{Deserialize, Serialize};

/// Intervals at or above this are treated as pauses (ms)
pub const SPAM_INTERVAL_CUTOFF_MS: f64 = 300.0;
/// Minimum qualifying samples before the score means anything
pub const MIN_SAMPLES: usize = 5;
/// Std-dev allowed before the score starts dropping (ms)
const DEAD_ZONE_MS: f64 = 5.0;
const PENALTY_PER_MS: f64 = 2.0;
const UR_SCALE: f64 = 10.0;

/// Summary statistics for one run's input rhythm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmStats {
    /// 0-100, higher is steadier
    pub consistency: f64,
    /// Scaled std-dev, unclamped
    pub unstable_rate: f64,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
    /// Qualifying samples used
    pub samples: usize,
}

impl Default for RhythmStats {
    fn default() -> Self {
        Self {
            consistency: 100.0,
            unstable_rate: 0.0,
            mean_ms: 0.0,
            std_dev_ms: 0.0,
            samples: 0,
        }
    }
}

impl RhythmStats {
    pub fn band(&self) -> UrBand {
        UrBand::classify(self.unstable_rate)
    }

    /// Consistency as shown on the leaderboard, e.g. "87%"
    pub fn consistency_label(&self) -> String {
        format!("{}%", self.consistency.round() as u32)
    }
}

/// Unstable-rate classification for the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrBand {
    /// Too steady to be a human hand
    Suspicious,
    Elite,
    Pro,
    Decent,
    Inconsistent,
}

impl UrBand {
    pub fn classify(unstable_rate: f64) -> Self {
        if unstable_rate < 50.0 {
            UrBand::Suspicious
        } else if unstable_rate < 80.0 {
            UrBand::Elite
        } else if unstable_rate < 150.0 {
            UrBand::Pro
        } else if unstable_rate < 250.0 {
            UrBand::Decent
        } else {
            UrBand::Inconsistent
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UrBand::Suspicious => "Suspicious (bot-like)",
            UrBand::Elite => "Elite",
            UrBand::Pro => "Pro",
            UrBand::Decent => "Decent",
            UrBand::Inconsistent => "Inconsistent",
        }
    }
}

/// Score the steadiness of press intervals
///
/// Fewer than [`MIN_SAMPLES`] qualifying intervals reports a perfect score.
pub fn analyze(intervals: &[f64]) -> RhythmStats {
    let spam: Vec<f64> = intervals
        .iter()
        .copied()
        .filter(|&ms| ms < SPAM_INTERVAL_CUTOFF_MS)
        .collect();

    if spam.len() < MIN_SAMPLES {
        return RhythmStats {
            samples: spam.len(),
            ..Default::default()
        };
    }

    let n = spam.len() as f64;
    let mean_ms = spam.iter().sum::<f64>() / n;
    let variance = spam.iter().map(|ms| (ms - mean_ms).powi(2)).sum::<f64>() / n;
    let std_dev_ms = variance.sqrt();

    RhythmStats {
        consistency: (100.0 - (std_dev_ms - DEAD_ZONE_MS) * PENALTY_PER_MS).clamp(0.0, 100.0),
        unstable_rate: std_dev_ms * UR_SCALE,
        mean_ms,
        std_dev_ms,
        samples: spam.len(),
    }
}
