//! Wave Dash - A wave side-scroller arcade minigame
//!
//! Core modules:
//! - `sim`: Simulation (wave motion, corridor generation, collisions, rhythm stats)
//! - `difficulty`: Static difficulty table
//! - `session`: Run lifecycle, ghost trace and leaderboard writes
//! - `leaderboard`: Per-mode top-5 run times
//! - `settings`: Persisted player preferences
//! - `persistence`: Key-value storage backends
//! - `platform`: Browser/native clock and date helpers
//! - `audio`: Event sounds (Web Audio playback on wasm)

pub mod audio;
pub mod difficulty;
pub mod leaderboard;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;

pub use difficulty::{Difficulty, DifficultyConfig};
pub use leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardKey};
pub use session::{GameSession, SessionConfig};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Run length needed to win outside endless mode (ms)
    pub const WIN_TIME_MS: f64 = 15_000.0;

    /// Default canvas dimensions
    pub const DEFAULT_CANVAS_WIDTH: f32 = 800.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 450.0;

    /// Horizontal avatar position as a fraction of canvas width
    pub const AVATAR_X_RATIO: f32 = 0.25;
    /// Avatar hitbox radius
    pub const AVATAR_RADIUS: f32 = 5.0;
    /// Avatar hitbox radius in mini mode
    pub const MINI_AVATAR_RADIUS: f32 = 3.0;
    /// Vertical speed multiplier in mini mode
    pub const MINI_SPEED_MULTIPLIER: f32 = 1.5;

    /// Thin floor/ceiling strip the avatar must not touch
    pub const BOUNDARY_MARGIN: f32 = 10.0;
    /// Minimum wall left above and below every generated gap
    pub const MIN_WALL: f32 = 40.0;

    /// Horizontal distance between consecutive obstacles
    pub const SPAWN_SPACING: f32 = 220.0;
    /// Obstacles this far past the left edge are dropped
    pub const PRUNE_MARGIN: f32 = 50.0;
    /// Extra lead-in before the first obstacle of a run
    pub const FIRST_OBSTACLE_LEAD: f32 = 200.0;

    /// Portal spawn chance per obstacle (auto mode only)
    pub const PORTAL_CHANCE: f64 = 0.15;
    /// Minimum scroll distance between portals
    pub const PORTAL_COOLDOWN_PX: f32 = 800.0;
    pub const PORTAL_RADIUS: f32 = 18.0;

    /// Rotation easing factor per frame
    pub const ROTATION_EASE: f32 = 0.6;

    /// Click samples between live consistency refreshes
    pub const CONSISTENCY_REFRESH_EVERY: usize = 5;

    /// Leaderboard size per mode key
    pub const MAX_LEADERBOARD_ENTRIES: usize = 5;
}
