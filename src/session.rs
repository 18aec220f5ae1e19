//! Run lifecycle
//!
//! A [`GameSession`] owns the current [`RunState`] plus everything that
//! outlives a single run: the loaded leaderboard, the cached best time and the
//! best run's ghost trace. It is the only place that writes to storage, and
//! only when a run finishes. Abandoned runs never produce an entry.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::difficulty::Difficulty;
use crate::leaderboard::{Leaderboard, LeaderboardEntry, LeaderboardKey, round_time};
use crate::persistence::KeyValueStore;
use crate::platform;
use crate::settings::Settings;
use crate::sim::{
    ClickEffect, FrameInput, GameEvent, GhostFrame, GravitySide, Obstacle, Particle, PatternMode,
    Portal, RhythmStats, RunState, RunStatus, SimParams, TrailPoint, UrBand, analyze, tick,
};

/// Configuration chosen before a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub endless: bool,
    pub mini: bool,
    pub training_pattern: PatternMode,
    pub reduced_motion: bool,
}

impl SessionConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            difficulty: settings.difficulty,
            endless: settings.endless,
            mini: settings.mini,
            training_pattern: settings.training_pattern,
            reduced_motion: settings.reduced_motion,
        }
    }

    pub fn leaderboard_key(&self) -> LeaderboardKey {
        LeaderboardKey::new(self.difficulty, self.mini, self.endless)
    }
}

/// Outcome of the most recent finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub status: RunStatus,
    pub elapsed_ms: f64,
    pub stats: RhythmStats,
    pub entry: LeaderboardEntry,
    /// Leaderboard rank (1-indexed), None if it missed the top 5
    pub rank: Option<usize>,
    /// This run replaced the ghost trace
    pub new_ghost: bool,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Serialize)]
pub struct FrameSnapshot<'a> {
    pub status: RunStatus,
    pub elapsed_ms: f64,
    pub avatar: Vec2,
    pub rotation: f32,
    pub gravity_side: GravitySide,
    pub obstacles: &'a [Obstacle],
    pub portals: &'a [Portal],
    pub trail: &'a [TrailPoint],
    pub click_effects: &'a [ClickEffect],
    pub particles: &'a [Particle],
    pub shake: f32,
    /// Endless mode color cycle (degrees)
    pub hue: f32,
    /// Theme color (cycles in endless mode)
    pub color: String,
    /// Best run's height at the same elapsed time
    pub ghost_y: Option<f32>,
}

/// Results-screen statistics
#[derive(Debug, Serialize)]
pub struct RunStats<'a> {
    pub consistency: f64,
    pub unstable_rate: f64,
    pub band: UrBand,
    pub best_time: f64,
    pub leaderboard: &'a [LeaderboardEntry],
    pub click_intervals: &'a [f64],
}

/// Controller for consecutive runs under one configuration
pub struct GameSession<S: KeyValueStore> {
    store: S,
    config: SessionConfig,
    width: f32,
    height: f32,
    /// Seeds each new run
    seeds: Pcg32,
    state: RunState,
    holding: bool,
    leaderboard: Leaderboard,
    /// Cached head of the leaderboard (seconds)
    best_time: f64,
    best_run_frames: Vec<GhostFrame>,
    last_run: Option<RunSummary>,
}

impl<S: KeyValueStore> GameSession<S> {
    pub fn new(store: S, config: SessionConfig, seed: u64) -> Self {
        Self::with_canvas(store, config, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT, seed)
    }

    pub fn with_canvas(store: S, config: SessionConfig, width: f32, height: f32, seed: u64) -> Self {
        let key = config.leaderboard_key();
        let leaderboard = Leaderboard::load(&store, &key);
        let best_time = leaderboard.best_time();
        let mut seeds = Pcg32::seed_from_u64(seed);
        let state = RunState::new(Self::params_for(&config, width, height), seeds.random());
        Self {
            store,
            config,
            width,
            height,
            seeds,
            state,
            holding: false,
            leaderboard,
            best_time,
            best_run_frames: Vec::new(),
            last_run: None,
        }
    }

    fn params_for(config: &SessionConfig, width: f32, height: f32) -> SimParams {
        SimParams::new(
            config.difficulty.config(),
            config.mini,
            config.endless,
            config.training_pattern,
            width,
            height,
        )
        .with_reduced_motion(config.reduced_motion)
    }

    /// Pointer/key state from the presentation layer
    pub fn set_holding(&mut self, holding: bool) {
        self.holding = holding;
    }

    /// Run one animation frame
    pub fn frame(&mut self, now: f64) -> Vec<GameEvent> {
        let was_finished = self.state.status.is_finished();
        let mut events = tick(
            &mut self.state,
            &FrameInput {
                now,
                holding: self.holding,
            },
        );
        if !was_finished && self.state.status.is_finished() && self.finish_run() {
            events.push(GameEvent::NewBest);
        }
        events
    }

    /// Decorative update while not playing. Returns false once everything has settled.
    pub fn tick_effects(&mut self) -> bool {
        let animating = self.state.decay_effects();
        animating || self.state.status == RunStatus::Lost
    }

    /// Finalize a lost or won run. Returns true when it set a new best time.
    fn finish_run(&mut self) -> bool {
        let status = self.state.status;
        let elapsed_ms = self.state.elapsed_ms;
        let previous_best = self.best_time;

        let new_ghost = status == RunStatus::Won || elapsed_ms > previous_best * 1000.0;
        if new_ghost {
            self.best_run_frames = self.state.frames.clone();
        }

        let stats = analyze(&self.state.click_intervals);
        let entry = LeaderboardEntry {
            time: round_time(elapsed_ms),
            consistency: stats.consistency_label(),
            date: platform::today(),
        };
        let rank = self.leaderboard.add_entry(entry.clone());
        let key = self.config.leaderboard_key();
        self.leaderboard.save(&mut self.store, &key);
        self.best_time = self.leaderboard.best_time();

        log::info!(
            "Run finished: {:?} {:.2}s, consistency {}, UR {:.0}, rank {:?}",
            status,
            entry.time,
            entry.consistency,
            stats.unstable_rate,
            rank
        );

        self.last_run = Some(RunSummary {
            status,
            elapsed_ms,
            stats,
            entry,
            rank,
            new_ghost,
        });
        rank == Some(1)
    }

    /// Start over with a fresh run; an unfinished run is discarded
    pub fn reset(&mut self) {
        let params = Self::params_for(&self.config, self.width, self.height);
        self.state = RunState::new(params, self.seeds.random());
        // A press held across the reset must be released before it starts a run
        self.state.was_holding = self.holding;
        self.last_run = None;
    }

    /// Canvas size changed; only applied immediately while idle
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        if self.state.status == RunStatus::Idle {
            self.reset();
        }
    }

    /// Switch difficulty or modes; reloads the leaderboard when the key changes
    pub fn set_config(&mut self, config: SessionConfig) {
        let old_key = self.config.leaderboard_key();
        self.config = config;
        let key = config.leaderboard_key();
        if key != old_key {
            self.leaderboard = Leaderboard::load(&self.store, &key);
            self.best_time = self.leaderboard.best_time();
            self.best_run_frames.clear();
        }
        self.reset();
    }

    /// Wipe the leaderboard for the current key
    pub fn clear_leaderboard(&mut self) {
        let key = self.config.leaderboard_key();
        self.leaderboard.clear(&mut self.store, &key);
        self.best_time = 0.0;
        log::info!("Cleared leaderboard {}", key.storage_key());
    }

    /// Best run's height at `t_ms`, interpolated between recorded frames
    pub fn ghost_y(&self, t_ms: f64) -> Option<f32> {
        let frames = &self.best_run_frames;
        let last = frames.last()?;
        if t_ms > last.t_ms {
            return None;
        }
        let idx = frames.partition_point(|f| f.t_ms < t_ms);
        if idx == 0 {
            return Some(frames[0].y);
        }
        let (a, b) = (frames[idx - 1], frames[idx]);
        let span = b.t_ms - a.t_ms;
        if span <= 0.0 {
            return Some(b.y);
        }
        let t = ((t_ms - a.t_ms) / span) as f32;
        Some(a.y + (b.y - a.y) * t)
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        let state = &self.state;
        let color = if self.config.endless && !self.config.reduced_motion {
            format!("hsl({:.0}, 80%, 60%)", state.hue)
        } else {
            self.config.difficulty.config().color.to_string()
        };
        let ghost_y = match state.status {
            RunStatus::Playing => self.ghost_y(state.elapsed_ms),
            _ => None,
        };
        FrameSnapshot {
            status: state.status,
            elapsed_ms: state.elapsed_ms,
            avatar: state.avatar,
            rotation: state.rotation,
            gravity_side: state.gravity_side,
            obstacles: &state.obstacles,
            portals: &state.portals,
            trail: &state.trail,
            click_effects: &state.click_effects,
            particles: &state.particles,
            shake: state.shake,
            hue: state.hue,
            color,
            ghost_y,
        }
    }

    pub fn stats(&self) -> RunStats<'_> {
        let rhythm = match &self.last_run {
            Some(run) => run.stats,
            None => self.state.rhythm,
        };
        RunStats {
            consistency: rhythm.consistency,
            unstable_rate: rhythm.unstable_rate,
            band: rhythm.band(),
            best_time: self.best_time,
            leaderboard: &self.leaderboard.entries,
            click_intervals: &self.state.click_intervals,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.state.status
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn best_time(&self) -> f64 {
        self.best_time
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn best_run_frames(&self) -> &[GhostFrame] {
        &self.best_run_frames
    }

    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
