//! Collision detection for the wave avatar
//!
//! The avatar is a small circle. Obstacles are axis-aligned wall pairs with an
//! open gap, portals are circles, and the playfield has a thin floor and ceiling.

use glam::Vec2;

use super::state::{Obstacle, Portal};
use crate::consts::BOUNDARY_MARGIN;

/// What the avatar hit this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Ceiling,
    Floor,
    /// Index into the obstacle list
    Obstacle(usize),
}

/// Check the avatar against the floor and ceiling strips
pub fn boundary_collision(y: f32, radius: f32, height: f32) -> Option<Collision> {
    if y - radius < BOUNDARY_MARGIN {
        Some(Collision::Ceiling)
    } else if y + radius > height - BOUNDARY_MARGIN {
        Some(Collision::Floor)
    } else {
        None
    }
}

/// Check whether a circle overlaps either wall of an obstacle
///
/// Horizontal overlap: `[x - r, x + r]` intersects `[obs.x, obs.x + width]`.
/// Vertical overlap: the circle pokes above the gap top or below the gap bottom.
#[inline]
pub fn hits_obstacle(pos: Vec2, radius: f32, obstacle: &Obstacle) -> bool {
    let horizontal = pos.x + radius > obstacle.x && pos.x - radius < obstacle.right();
    let vertical = pos.y - radius < obstacle.top_height || pos.y + radius > obstacle.bottom_y;
    horizontal && vertical
}

/// First obstacle the avatar overlaps, if any
pub fn obstacle_collision(pos: Vec2, radius: f32, obstacles: &[Obstacle]) -> Option<Collision> {
    obstacles
        .iter()
        .position(|o| hits_obstacle(pos, radius, o))
        .map(Collision::Obstacle)
}

/// Circle-circle test against an active portal
#[inline]
pub fn touches_portal(pos: Vec2, radius: f32, portal: &Portal) -> bool {
    portal.active && pos.distance(Vec2::new(portal.x, portal.y)) < radius + portal.radius
}
