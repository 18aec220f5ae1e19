//! Per-frame simulation step
//!
//! Called once per animation frame. Timing is wall-clock: `elapsed` is always
//! `now - start_time`, so win/lose timing does not depend on frame rate. The
//! trail and particles are frame-driven and purely cosmetic.

use super::collision::{Collision, boundary_collision, obstacle_collision, touches_portal};
use super::corridor::{extend_stream, prune};
use super::rhythm;
use super::state::{ClickEffect, GameEvent, GhostFrame, RunState, RunStatus};
use crate::consts::*;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Monotonic timestamp (ms)
    pub now: f64,
    /// Pointer/key currently held
    pub holding: bool,
}

/// Advance the run by one frame and report what happened
pub fn tick(state: &mut RunState, input: &FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let pressed = input.holding && !state.was_holding;
    state.was_holding = input.holding;

    match state.status {
        RunStatus::Idle if pressed => start(state, input.now, &mut events),
        RunStatus::Playing => {
            if pressed {
                register_press(state, input.now, &mut events);
            }
        }
        _ => return events,
    }

    step(state, input, &mut events);
    events
}

fn start(state: &mut RunState, now: f64, events: &mut Vec<GameEvent>) {
    state.status = RunStatus::Playing;
    state.start_time = now;
    state.elapsed_ms = 0.0;
    state.last_press_time = Some(now);
    state.click_effects.push(ClickEffect {
        pos: state.avatar,
        life: 1.0,
    });
    events.push(GameEvent::RunStarted);
    log::info!("Run started at {:.0}ms", now);
}

/// Record the gap since the previous press
fn register_press(state: &mut RunState, now: f64, events: &mut Vec<GameEvent>) {
    if let Some(last) = state.last_press_time {
        state.click_intervals.push(now - last);
        if state.click_intervals.len() % CONSISTENCY_REFRESH_EVERY == 0 {
            state.rhythm = rhythm::analyze(&state.click_intervals);
        }
    }
    state.last_press_time = Some(now);
    state.click_effects.push(ClickEffect {
        pos: state.avatar,
        life: 1.0,
    });
    events.push(GameEvent::Click);
}

fn step(state: &mut RunState, input: &FrameInput, events: &mut Vec<GameEvent>) {
    let params = state.params;

    state.elapsed_ms = (input.now - state.start_time).max(0.0);
    if !params.endless && state.elapsed_ms >= WIN_TIME_MS {
        state.status = RunStatus::Won;
        events.push(GameEvent::Won);
        log::info!("Run won at {:.2}s", state.elapsed_ms / 1000.0);
        return;
    }
    if params.endless {
        state.hue = (state.hue + 1.0) % 360.0;
    }

    // Constant-speed wave: direction only, no acceleration
    let dir = if input.holding { -1.0 } else { 1.0 } * state.gravity_side.sign();
    let dy = dir * params.vertical_speed;
    state.avatar.y += dy;

    let target = dy.atan2(params.speed);
    state.rotation += (target - state.rotation) * ROTATION_EASE;

    state.record_trail();
    state.decay_effects();

    if let Some(hit) = boundary_collision(state.avatar.y, params.avatar_radius, params.height) {
        crash(state, hit, events);
        return;
    }

    // Scroll the world
    for obstacle in &mut state.obstacles {
        obstacle.x -= params.speed;
    }
    for portal in &mut state.portals {
        portal.x -= params.speed;
    }
    state.since_portal += params.speed;
    prune(state);
    extend_stream(state);

    let passed_line = state.avatar.x - params.avatar_radius;
    for obstacle in &mut state.obstacles {
        if !obstacle.passed && obstacle.right() < passed_line {
            obstacle.passed = true;
            events.push(GameEvent::ObstaclePassed);
        }
    }

    for portal in &mut state.portals {
        if touches_portal(state.avatar, params.avatar_radius, portal) {
            portal.active = false;
            let target = portal.kind.target_side();
            // Matching portals are consumed without effect
            if target != state.gravity_side {
                state.gravity_side = target;
                events.push(GameEvent::PortalEntered(portal.kind));
                log::debug!("Gravity -> {:?}", target);
            }
        }
    }

    if let Some(hit) = obstacle_collision(state.avatar, params.avatar_radius, &state.obstacles) {
        crash(state, hit, events);
        return;
    }

    state.frames.push(GhostFrame {
        t_ms: state.elapsed_ms,
        y: state.avatar.y,
    });
}

fn crash(state: &mut RunState, hit: Collision, events: &mut Vec<GameEvent>) {
    state.status = RunStatus::Lost;
    state.spawn_crash_particles();
    events.push(GameEvent::Crashed);
    log::info!(
        "Run lost ({:?}) at {:.2}s",
        hit,
        state.elapsed_ms / 1000.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::sim::state::{GravitySide, Obstacle, PatternMode, Portal, PortalKind, SimParams};

    fn new_state(endless: bool) -> RunState {
        let params = SimParams::new(
            Difficulty::Normal.config(),
            false,
            endless,
            PatternMode::Straight,
            800.0,
            450.0,
        );
        RunState::new(params, 12345)
    }

    fn press(now: f64) -> FrameInput {
        FrameInput { now, holding: true }
    }

    fn release(now: f64) -> FrameInput {
        FrameInput {
            now,
            holding: false,
        }
    }

    /// Start a run at t=0 and hand back the state mid-press
    fn playing(endless: bool) -> RunState {
        let mut state = new_state(endless);
        tick(&mut state, &press(0.0));
        assert_eq!(state.status, RunStatus::Playing);
        state
    }

    #[test]
    fn test_idle_until_first_press() {
        let mut state = new_state(false);
        let events = tick(&mut state, &release(10.0));
        assert!(events.is_empty());
        assert_eq!(state.status, RunStatus::Idle);

        let events = tick(&mut state, &press(20.0));
        assert_eq!(state.status, RunStatus::Playing);
        assert_eq!(events[0], GameEvent::RunStarted);
        assert_eq!(state.start_time, 20.0);
        assert!(state.click_intervals.is_empty());
    }

    #[test]
    fn test_holding_through_reset_does_not_start() {
        let mut state = new_state(false);
        state.was_holding = true;
        tick(&mut state, &press(0.0));
        assert_eq!(state.status, RunStatus::Idle);
    }

    #[test]
    fn test_elapsed_is_wall_clock() {
        let mut fast = playing(false);
        let mut slow = playing(false);
        for i in 1..=60 {
            let now = i as f64 * 16.0;
            let input = FrameInput {
                now,
                holding: i % 2 == 0,
            };
            tick(&mut fast, &input);
            assert_eq!(fast.elapsed_ms, now);
            if i % 20 == 0 {
                tick(&mut slow, &input);
                assert_eq!(slow.elapsed_ms, fast.elapsed_ms);
            }
        }
        assert_eq!(fast.frames.len(), 61);
        assert_eq!(slow.frames.len(), 4);
    }

    #[test]
    fn test_wins_at_time_limit() {
        let mut state = playing(false);
        tick(&mut state, &release(WIN_TIME_MS - 1.0));
        assert_eq!(state.status, RunStatus::Playing);
        let events = tick(&mut state, &release(WIN_TIME_MS));
        assert_eq!(state.status, RunStatus::Won);
        assert_eq!(events, vec![GameEvent::Won]);

        // Terminal: nothing else happens
        assert!(tick(&mut state, &press(WIN_TIME_MS + 500.0)).is_empty());
        assert_eq!(state.status, RunStatus::Won);
    }

    #[test]
    fn test_endless_never_wins() {
        let mut state = playing(true);
        tick(&mut state, &release(WIN_TIME_MS * 3.0));
        assert_eq!(state.status, RunStatus::Playing);
        assert!(state.hue > 0.0);
    }

    #[test]
    fn test_constant_speed_motion() {
        let mut state = playing(false);
        let v = state.params.vertical_speed;
        let y0 = state.avatar.y;
        tick(&mut state, &press(16.0));
        tick(&mut state, &press(32.0));
        assert_eq!(state.avatar.y, y0 - 2.0 * v);
        tick(&mut state, &release(48.0));
        assert_eq!(state.avatar.y, y0 - v);
        assert!(state.rotation > 0.0);
    }

    #[test]
    fn test_flipped_gravity_inverts_direction() {
        let mut state = playing(false);
        state.gravity_side = GravitySide::Flipped;
        let y0 = state.avatar.y;
        tick(&mut state, &press(16.0));
        assert_eq!(state.avatar.y, y0 + state.params.vertical_speed);
    }

    #[test]
    fn test_ceiling_crash_is_terminal() {
        let mut state = playing(false);
        state.avatar.y = BOUNDARY_MARGIN + state.params.avatar_radius + 1.0;
        let events = tick(&mut state, &press(16.0));
        assert_eq!(state.status, RunStatus::Lost);
        assert_eq!(events, vec![GameEvent::Crashed]);
        assert!(!state.particles.is_empty());

        // Past the win time a lost run stays lost
        assert!(tick(&mut state, &release(WIN_TIME_MS * 2.0)).is_empty());
        assert_eq!(state.status, RunStatus::Lost);
    }

    #[test]
    fn test_obstacle_overlap_crashes() {
        let mut state = playing(false);
        let speed = state.params.speed;
        let v = state.params.vertical_speed;
        // After this frame's scroll and move: obstacle at x=190, avatar at (200, 190)
        state.obstacles.push(Obstacle {
            x: 190.0 + speed,
            width: 50.0,
            top_height: 200.0,
            bottom_y: 350.0,
            passed: false,
        });
        state.avatar.y = 190.0 + v;
        tick(&mut state, &press(16.0));
        assert_eq!(state.status, RunStatus::Lost);
        // Crash frame is not recorded in the ghost trace
        assert_eq!(state.frames.len(), 1);
    }

    #[test]
    fn test_passing_through_gap_marks_passed() {
        let mut state = playing(false);
        state.obstacles.push(Obstacle {
            x: 140.0,
            width: 50.0,
            top_height: 100.0,
            bottom_y: 350.0,
            passed: false,
        });
        let events = tick(&mut state, &press(16.0));
        assert_eq!(state.status, RunStatus::Playing);
        assert!(events.contains(&GameEvent::ObstaclePassed));
        assert!(state.obstacles[0].passed);
    }

    #[test]
    fn test_portal_flips_once() {
        let mut state = playing(false);
        let at = |state: &RunState| Portal {
            x: state.avatar.x + state.params.speed,
            y: state.avatar.y - state.params.vertical_speed,
            kind: PortalKind::GravityUp,
            radius: 18.0,
            active: true,
        };
        state.portals.push(at(&state));
        let events = tick(&mut state, &press(16.0));
        assert_eq!(state.gravity_side, GravitySide::Flipped);
        assert!(events.contains(&GameEvent::PortalEntered(PortalKind::GravityUp)));
        assert!(!state.portals[0].active);

        // Same kind again: consumed, no flip, no event
        state.portals.clear();
        state.portals.push(Portal {
            y: state.avatar.y + state.params.vertical_speed,
            ..at(&state)
        });
        let events = tick(&mut state, &press(32.0));
        assert_eq!(state.gravity_side, GravitySide::Flipped);
        assert!(events.iter().all(|e| !matches!(e, GameEvent::PortalEntered(_))));
        assert!(!state.portals[0].active);
    }

    #[test]
    fn test_press_intervals_and_live_consistency() {
        let mut state = playing(false);
        let mut now = 0.0;
        for _ in 0..5 {
            tick(&mut state, &release(now + 50.0));
            now += 100.0;
            tick(&mut state, &press(now));
        }
        assert_eq!(state.click_intervals, vec![100.0; 5]);
        assert_eq!(state.rhythm.consistency, 100.0);
        assert_eq!(state.rhythm.samples, 5);

        for gap in [40.0, 160.0, 40.0, 160.0, 40.0] {
            tick(&mut state, &release(now + 20.0));
            now += gap;
            tick(&mut state, &press(now));
        }
        assert_eq!(state.click_intervals.len(), 10);
        assert!(state.rhythm.consistency < 100.0);
        assert!(state.rhythm.unstable_rate > 0.0);
        assert_eq!(state.rhythm.samples, 10);

        // Off-cycle presses leave the cached stats alone
        let cached = state.rhythm;
        tick(&mut state, &release(now + 20.0));
        tick(&mut state, &press(now + 500.0));
        assert_eq!(state.click_intervals.len(), 11);
        assert_eq!(state.rhythm, cached);
    }

    #[test]
    fn test_ghost_trace_one_frame_per_step() {
        let mut state = playing(false);
        for i in 1..=10 {
            tick(&mut state, &FrameInput {
                now: i as f64 * 16.0,
                holding: i % 2 == 0,
            });
        }
        assert_eq!(state.frames.len(), 11);
        assert_eq!(state.frames.last().map(|f| f.t_ms), Some(160.0));
    }

    #[test]
    fn test_determinism() {
        let params = SimParams::new(
            Difficulty::Hard.config(),
            false,
            false,
            PatternMode::Random,
            800.0,
            450.0,
        );
        let mut a = RunState::new(params, 42);
        let mut b = RunState::new(params, 42);

        for i in 0..400 {
            let input = FrameInput {
                now: i as f64 * 16.0,
                holding: (i / 7) % 2 == 0,
            };
            let events_a = tick(&mut a, &input);
            let events_b = tick(&mut b, &input);
            assert_eq!(events_a, events_b);
        }

        assert!(!a.frames.is_empty());
        assert_eq!(a.status, b.status);
        assert_eq!(a.avatar, b.avatar);
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.portals, b.portals);
        assert_eq!(a.frames, b.frames);
        assert_eq!(a.click_intervals, b.click_intervals);
    }

    #[test]
    fn test_stream_is_generated_while_playing() {
        let mut state = playing(false);
        assert!(!state.obstacles.is_empty());
        let first_x = state.obstacles[0].x;
        tick(&mut state, &release(16.0));
        assert_eq!(state.obstacles[0].x, first_x - state.params.speed);
    }
}
