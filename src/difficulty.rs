//! Difficulty table
//!
//! Each difficulty maps to a fixed scroll speed, gap height and theme color.

use serde::{Deserialize, Serialize};

/// Selectable difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
    Insane,
    Extreme,
}

/// Simulation parameters for one difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyConfig {
    pub difficulty: Difficulty,
    /// Scroll speed (px/frame), also the base vertical speed
    pub speed: f32,
    /// Gap height between top and bottom walls (px)
    pub gap: f32,
    /// Primary theme color
    pub color: &'static str,
}

const TABLE: [DifficultyConfig; 5] = [
    DifficultyConfig {
        difficulty: Difficulty::Easy,
        speed: 4.0,
        gap: 200.0,
        color: "#4ade80",
    },
    DifficultyConfig {
        difficulty: Difficulty::Normal,
        speed: 5.0,
        gap: 170.0,
        color: "#60a5fa",
    },
    DifficultyConfig {
        difficulty: Difficulty::Hard,
        speed: 6.0,
        gap: 140.0,
        color: "#f59e0b",
    },
    DifficultyConfig {
        difficulty: Difficulty::Insane,
        speed: 7.0,
        gap: 115.0,
        color: "#ef4444",
    },
    DifficultyConfig {
        difficulty: Difficulty::Extreme,
        speed: 8.0,
        gap: 95.0,
        color: "#a855f7",
    },
];

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
        Difficulty::Extreme,
    ];

    pub fn config(self) -> &'static DifficultyConfig {
        &TABLE[self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
            Difficulty::Extreme => "extreme",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            "extreme" => Some(Difficulty::Extreme),
            _ => None,
        }
    }
}

impl DifficultyConfig {
    /// Obstacles widen with speed so crossing time stays comparable
    pub fn obstacle_width(&self) -> f32 {
        50.0 + 2.0 * self.speed
    }
}
