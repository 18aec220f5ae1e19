//! Run state and core simulation types
//!
//! Everything a single run mutates lives in [`RunState`]. It is recreated on
//! every reset; nothing here outlives a run except what the session copies out.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rhythm::RhythmStats;
use crate::consts::*;
use crate::difficulty::DifficultyConfig;

/// Current status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Waiting for the first input-down
    Idle,
    /// Active gameplay
    Playing,
    /// Hit a wall, floor or ceiling
    Lost,
    /// Survived until the win time
    Won,
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Lost | RunStatus::Won)
    }
}

/// Which way "holding" moves the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GravitySide {
    /// Holding moves up the screen
    #[default]
    Normal,
    /// Holding moves down the screen
    Flipped,
}

impl GravitySide {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            GravitySide::Normal => 1.0,
            GravitySide::Flipped => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            GravitySide::Normal => GravitySide::Flipped,
            GravitySide::Flipped => GravitySide::Normal,
        }
    }
}

/// Portal types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortalKind {
    /// Flips gravity upside-down
    GravityUp,
    /// Restores normal gravity
    GravityDown,
}

impl PortalKind {
    /// Gravity side after passing through this portal
    pub fn target_side(self) -> GravitySide {
        match self {
            PortalKind::GravityUp => GravitySide::Flipped,
            PortalKind::GravityDown => GravitySide::Normal,
        }
    }

    /// The portal kind that moves away from `side`
    pub fn flipping_from(side: GravitySide) -> Self {
        match side {
            GravitySide::Normal => PortalKind::GravityUp,
            GravitySide::Flipped => PortalKind::GravityDown,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            PortalKind::GravityUp => PortalKind::GravityDown,
            PortalKind::GravityDown => PortalKind::GravityUp,
        }
    }
}

/// A wall pair with a gap between `top_height` and `bottom_y`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f32,
    pub width: f32,
    /// Bottom edge of the top wall
    pub top_height: f32,
    /// Top edge of the bottom wall
    pub bottom_y: f32,
    pub passed: bool,
}

impl Obstacle {
    #[inline]
    pub fn gap_center(&self) -> f32 {
        (self.top_height + self.bottom_y) * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// A one-shot gravity portal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub x: f32,
    pub y: f32,
    pub kind: PortalKind,
    pub radius: f32,
    pub active: bool,
}

/// Requested corridor generation mode (training pattern)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatternMode {
    /// Auto mode: rotates behaviors and spawns portals
    #[default]
    Random,
    Straight,
    Stairs,
    Zigzag,
}

impl PatternMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMode::Random => "random",
            PatternMode::Straight => "straight",
            PatternMode::Stairs => "stairs",
            PatternMode::Zigzag => "zigzag",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" | "auto" => Some(PatternMode::Random),
            "straight" => Some(PatternMode::Straight),
            "stairs" => Some(PatternMode::Stairs),
            "zigzag" => Some(PatternMode::Zigzag),
            _ => None,
        }
    }

    /// Next mode in the training cycle
    pub fn next(self) -> Self {
        match self {
            PatternMode::Random => PatternMode::Straight,
            PatternMode::Straight => PatternMode::Stairs,
            PatternMode::Stairs => PatternMode::Zigzag,
            PatternMode::Zigzag => PatternMode::Random,
        }
    }
}

/// Active generation behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    /// Loose uniform offset from the previous center
    Jump,
    Straight,
    Stairs,
    Zigzag,
}

impl From<PatternMode> for Pattern {
    fn from(mode: PatternMode) -> Self {
        match mode {
            PatternMode::Random => Pattern::Jump,
            PatternMode::Straight => Pattern::Straight,
            PatternMode::Stairs => Pattern::Stairs,
            PatternMode::Zigzag => Pattern::Zigzag,
        }
    }
}

/// Generation continuity across consecutive obstacles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternState {
    pub current: Pattern,
    /// Obstacles left before the auto mode rolls a new behavior
    pub counter: u32,
    /// Zigzag drift direction (+1 down, -1 up)
    pub zigzag_dir: f32,
}

impl PatternState {
    pub fn new(mode: PatternMode) -> Self {
        Self {
            current: mode.into(),
            counter: 0,
            zigzag_dir: 1.0,
        }
    }
}

/// Trail point for avatar rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 30;

/// Expanding ring drawn on every input press
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClickEffect {
    pub pos: Vec2,
    /// 0-1, decreases over time
    pub life: f32,
}

/// A particle for visual effects
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 128;

/// One sample of the avatar trace, stamped with run time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostFrame {
    pub t_ms: f64,
    pub y: f32,
}

/// Events emitted by a tick, for audio and UI side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Click,
    PortalEntered(PortalKind),
    ObstaclePassed,
    Crashed,
    Won,
    /// Finished run topped the leaderboard (emitted by the session)
    NewBest,
}

/// Per-run simulation parameters, fixed for the whole run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimParams {
    pub width: f32,
    pub height: f32,
    /// Horizontal scroll speed (px/frame)
    pub speed: f32,
    /// Vertical wave speed (px/frame)
    pub vertical_speed: f32,
    pub gap: f32,
    pub obstacle_width: f32,
    pub avatar_radius: f32,
    pub pattern_mode: PatternMode,
    pub endless: bool,
    pub reduced_motion: bool,
}

impl SimParams {
    pub fn new(
        config: &DifficultyConfig,
        mini: bool,
        endless: bool,
        pattern_mode: PatternMode,
        width: f32,
        height: f32,
    ) -> Self {
        let (vertical_speed, avatar_radius) = if mini {
            (config.speed * MINI_SPEED_MULTIPLIER, MINI_AVATAR_RADIUS)
        } else {
            (config.speed, AVATAR_RADIUS)
        };
        Self {
            width,
            height,
            speed: config.speed,
            vertical_speed,
            gap: config.gap,
            obstacle_width: config.obstacle_width(),
            avatar_radius,
            pattern_mode,
            endless,
            reduced_motion: false,
        }
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    #[inline]
    pub fn avatar_x(&self) -> f32 {
        self.width * AVATAR_X_RATIO
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub params: SimParams,
    pub rng: Pcg32,
    pub status: RunStatus,
    /// Monotonic timestamp of the first input-down (ms)
    pub start_time: f64,
    pub elapsed_ms: f64,
    pub avatar: Vec2,
    pub gravity_side: GravitySide,
    /// Cosmetic tilt (radians), eased every frame
    pub rotation: f32,
    /// Input state seen on the previous frame, for edge detection
    pub was_holding: bool,
    pub last_press_time: Option<f64>,
    /// Sorted by `x` (insertion order)
    pub obstacles: Vec<Obstacle>,
    pub portals: Vec<Portal>,
    pub pattern: PatternState,
    /// Scroll distance since the last portal spawned
    pub since_portal: f32,
    pub last_portal_kind: Option<PortalKind>,
    /// Inter-press gaps (ms), append-only during a run
    pub click_intervals: Vec<f64>,
    /// Live rhythm stats, refreshed every few samples
    pub rhythm: RhythmStats,
    /// Avatar trace for ghost replay
    pub frames: Vec<GhostFrame>,
    /// Visual-only state below
    pub trail: Vec<TrailPoint>,
    pub click_effects: Vec<ClickEffect>,
    pub particles: Vec<Particle>,
    pub shake: f32,
    /// Endless mode color cycle (degrees)
    pub hue: f32,
}

impl RunState {
    /// Create a fresh run with the given seed
    pub fn new(params: SimParams, seed: u64) -> Self {
        Self {
            params,
            rng: Pcg32::seed_from_u64(seed),
            status: RunStatus::Idle,
            start_time: 0.0,
            elapsed_ms: 0.0,
            avatar: Vec2::new(params.avatar_x(), params.height * 0.5),
            gravity_side: GravitySide::Normal,
            rotation: 0.0,
            was_holding: false,
            last_press_time: None,
            obstacles: Vec::new(),
            portals: Vec::new(),
            pattern: PatternState::new(params.pattern_mode),
            since_portal: 0.0,
            last_portal_kind: None,
            click_intervals: Vec::new(),
            rhythm: RhythmStats::default(),
            frames: Vec::new(),
            trail: Vec::with_capacity(TRAIL_LENGTH),
            click_effects: Vec::new(),
            particles: Vec::new(),
            shake: 0.0,
            hue: 0.0,
        }
    }

    /// Record current position to trail (newest first)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, TrailPoint { pos: self.avatar });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Burst of debris at the avatar position
    pub fn spawn_crash_particles(&mut self) {
        let count = 24;
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU;
            let speed = 2.0 + (i % 5) as f32 * 0.8;
            self.particles.push(Particle {
                pos: self.avatar,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life: 1.0,
                size: 2.0 + (i % 3) as f32,
            });
        }
        self.particles.truncate(MAX_PARTICLES);
        if !self.params.reduced_motion {
            self.shake = 1.0;
        }
    }

    /// Advance frame-driven visuals. Returns true while anything is still animating.
    pub fn decay_effects(&mut self) -> bool {
        for p in self.particles.iter_mut() {
            p.pos += p.vel;
            p.vel *= 0.95;
            p.life -= 0.025;
        }
        self.particles.retain(|p| p.life > 0.0);

        for c in self.click_effects.iter_mut() {
            c.life -= 0.08;
        }
        self.click_effects.retain(|c| c.life > 0.0);

        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }

        !self.particles.is_empty() || !self.click_effects.is_empty() || self.shake > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;

    fn params() -> SimParams {
        SimParams::new(
            Difficulty::Normal.config(),
            false,
            false,
            PatternMode::Random,
            800.0,
            450.0,
        )
    }

    #[test]
    fn test_new_run_starts_idle_and_centered() {
        let state = RunState::new(params(), 1);
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.avatar, Vec2::new(200.0, 225.0));
        assert!(state.obstacles.is_empty());
        assert_eq!(state.rhythm.consistency, 100.0);
    }

    #[test]
    fn test_mini_mode_scales_vertical_speed() {
        let config = Difficulty::Normal.config();
        let mini = SimParams::new(config, true, false, PatternMode::Random, 800.0, 450.0);
        assert_eq!(mini.vertical_speed, config.speed * MINI_SPEED_MULTIPLIER);
        assert_eq!(mini.speed, config.speed);
        assert!(mini.avatar_radius < params().avatar_radius);
    }

    #[test]
    fn test_portal_kinds_always_change_state_from_their_source() {
        for side in [GravitySide::Normal, GravitySide::Flipped] {
            let kind = PortalKind::flipping_from(side);
            assert_eq!(kind.target_side(), side.flipped());
            assert_eq!(kind.opposite().target_side(), side);
        }
    }

    #[test]
    fn test_pattern_mode_cycle_and_names() {
        let mut mode = PatternMode::Random;
        for _ in 0..4 {
            assert_eq!(PatternMode::from_str(mode.as_str()), Some(mode));
            mode = mode.next();
        }
        assert_eq!(mode, PatternMode::Random);
        assert_eq!(PatternMode::from_str("AUTO"), Some(PatternMode::Random));
        assert_eq!(PatternMode::from_str("spiral"), None);
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut state = RunState::new(params(), 1);
        for _ in 0..(TRAIL_LENGTH * 2) {
            state.record_trail();
        }
        assert_eq!(state.trail.len(), TRAIL_LENGTH);
    }

    #[test]
    fn test_effects_decay_to_rest() {
        let mut state = RunState::new(params(), 1);
        state.spawn_crash_particles();
        assert!(state.shake > 0.0);
        let mut frames = 0;
        while state.decay_effects() {
            frames += 1;
            assert!(frames < 1000, "effects never settled");
        }
        assert!(state.particles.is_empty());
        assert_eq!(state.shake, 0.0);
    }

    #[test]
    fn test_reduced_motion_skips_shake() {
        let mut state = RunState::new(params().with_reduced_motion(true), 1);
        state.spawn_crash_particles();
        assert_eq!(state.shake, 0.0);
        assert!(!state.particles.is_empty());
    }
}
