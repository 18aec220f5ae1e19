//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform dependencies:
//! - Wall-clock timestamps come in through [`FrameInput`]
//! - Seeded RNG only
//! - Cosmetic state never feeds back into collisions

pub mod collision;
pub mod corridor;
pub mod rhythm;
pub mod state;
pub mod tick;

pub use collision::{Collision, boundary_collision, hits_obstacle, touches_portal};
pub use corridor::{clamp_center, extend_stream, next_center, safe_band, spawn_obstacle};
pub use rhythm::{RhythmStats, UrBand, analyze};
pub use state::{
    ClickEffect, GameEvent, GhostFrame, GravitySide, Obstacle, Particle, Pattern, PatternMode,
    PatternState, Portal, PortalKind, RunState, RunStatus, SimParams, TrailPoint,
};
pub use tick::{FrameInput, tick};
