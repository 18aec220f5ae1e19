//! Procedural corridor generation
//!
//! Every obstacle is placed relative to the previous one's gap center, so the
//! corridor stays continuous. The final gap center is always clamped into the
//! safe band, which keeps every gap reachable on screen.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{
    Obstacle, Pattern, PatternMode, PatternState, Portal, PortalKind, RunState, SimParams,
};
use crate::consts::*;

/// Maximum offset of a loose random jump (px)
const JUMP_RANGE: f32 = 100.0;
/// Chance that a stairs step jumps instead of holding
const STAIRS_JUMP_CHANCE: f64 = 0.3;
const STAIRS_JUMP_GAPS: f32 = 1.5;
/// Zigzag drift per obstacle, in units of vertical speed
const ZIGZAG_STEP_FACTOR: f32 = 5.0;

/// Range the gap center may occupy: `(min, max)`
///
/// Returns `None` when the canvas is too short to fit the gap plus both walls.
pub fn safe_band(height: f32, gap: f32) -> Option<(f32, f32)> {
    let lo = MIN_WALL + gap * 0.5;
    let hi = height - MIN_WALL - gap * 0.5;
    (lo <= hi).then_some((lo, hi))
}

/// Clamp a gap center into the safe band (midpoint if there is no band)
pub fn clamp_center(center: f32, height: f32, gap: f32) -> f32 {
    match safe_band(height, gap) {
        Some((lo, hi)) => center.clamp(lo, hi),
        None => height * 0.5,
    }
}

fn roll_pattern(rng: &mut Pcg32) -> Pattern {
    match rng.random_range(0..4) {
        0 => Pattern::Jump,
        1 => Pattern::Straight,
        2 => Pattern::Stairs,
        _ => Pattern::Zigzag,
    }
}

/// Compute the next gap center from the previous one
pub fn next_center(
    prev: f32,
    params: &SimParams,
    pattern: &mut PatternState,
    rng: &mut Pcg32,
) -> f32 {
    if params.pattern_mode == PatternMode::Random {
        if pattern.counter == 0 {
            pattern.current = roll_pattern(rng);
            pattern.counter = rng.random_range(5..=15);
            log::debug!(
                "Corridor pattern -> {:?} for {} obstacles",
                pattern.current,
                pattern.counter
            );
        }
        pattern.counter -= 1;
    }

    let mid = params.height * 0.5;
    let band = safe_band(params.height, params.gap);
    let in_band = |c: f32| band.is_none_or(|(lo, hi)| c >= lo && c <= hi);

    let raw = match pattern.current {
        Pattern::Jump => prev + rng.random_range(-JUMP_RANGE..=JUMP_RANGE),
        Pattern::Straight => mid,
        Pattern::Stairs => {
            if rng.random_bool(STAIRS_JUMP_CHANCE) {
                // Away from the midline, or back across it when already at the edge
                let dir = if prev < mid { -1.0 } else { 1.0 };
                let jump = STAIRS_JUMP_GAPS * params.gap;
                let away = prev + dir * jump;
                if in_band(away) { away } else { prev - dir * jump }
            } else {
                prev
            }
        }
        Pattern::Zigzag => {
            let step = ZIGZAG_STEP_FACTOR * params.vertical_speed;
            let next = prev + pattern.zigzag_dir * step;
            if in_band(next) {
                next
            } else {
                pattern.zigzag_dir = -pattern.zigzag_dir;
                prev + pattern.zigzag_dir * step
            }
        }
    };

    clamp_center(raw, params.height, params.gap)
}

/// Append one obstacle at `x`, possibly with a portal in its gap
pub fn spawn_obstacle(state: &mut RunState, x: f32) {
    let params = state.params;
    let prev = state
        .obstacles
        .last()
        .map(|o| o.gap_center())
        .unwrap_or(params.height * 0.5);
    let center = next_center(prev, &params, &mut state.pattern, &mut state.rng);
    let top_height = center - params.gap * 0.5;

    state.obstacles.push(Obstacle {
        x,
        width: params.obstacle_width,
        top_height,
        bottom_y: top_height + params.gap,
        passed: false,
    });

    maybe_spawn_portal(state, x + params.obstacle_width * 0.5, center);
}

fn maybe_spawn_portal(state: &mut RunState, x: f32, y: f32) {
    if state.params.pattern_mode != PatternMode::Random
        || state.since_portal < PORTAL_COOLDOWN_PX
        || !state.rng.random_bool(PORTAL_CHANCE)
    {
        return;
    }

    let kind = match state.last_portal_kind {
        Some(prev) => prev.opposite(),
        None => PortalKind::flipping_from(state.gravity_side),
    };
    state.portals.push(Portal {
        x,
        y,
        kind,
        radius: PORTAL_RADIUS,
        active: true,
    });
    state.since_portal = 0.0;
    state.last_portal_kind = Some(kind);
}

/// Keep the obstacle stream filled up to the right edge
pub fn extend_stream(state: &mut RunState) {
    let width = state.params.width;
    if state.obstacles.is_empty() {
        spawn_obstacle(state, width + FIRST_OBSTACLE_LEAD);
    }
    while let Some(next_x) = state
        .obstacles
        .last()
        .map(|o| o.x + SPAWN_SPACING)
        .filter(|&x| x <= width)
    {
        spawn_obstacle(state, next_x);
    }
}

/// Drop obstacles and portals that scrolled off the left edge
pub fn prune(state: &mut RunState) {
    state.obstacles.retain(|o| o.right() >= -PRUNE_MARGIN);
    state.portals.retain(|p| p.x + p.radius >= -PRUNE_MARGIN);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::sim::state::RunState;
    use proptest::prelude::*;

    fn state_with(mode: PatternMode, difficulty: Difficulty, seed: u64) -> RunState {
        let params = SimParams::new(difficulty.config(), false, false, mode, 800.0, 450.0);
        RunState::new(params, seed)
    }

    fn generate(state: &mut RunState, count: usize) {
        for i in 0..count {
            state.since_portal += SPAWN_SPACING;
            spawn_obstacle(state, i as f32 * SPAWN_SPACING);
        }
    }

    fn arb_mode() -> impl Strategy<Value = PatternMode> {
        prop_oneof![
            Just(PatternMode::Random),
            Just(PatternMode::Straight),
            Just(PatternMode::Stairs),
            Just(PatternMode::Zigzag),
        ]
    }

    fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop_oneof![
            Just(Difficulty::Easy),
            Just(Difficulty::Normal),
            Just(Difficulty::Hard),
            Just(Difficulty::Insane),
            Just(Difficulty::Extreme),
        ]
    }

    proptest! {
        #[test]
        fn test_prop_gaps_stay_inside_walls(
            mode in arb_mode(),
            difficulty in arb_difficulty(),
            seed in any::<u64>(),
            height in 360.0f32..1200.0,
        ) {
            let params = SimParams::new(difficulty.config(), false, false, mode, 800.0, height);
            let mut state = RunState::new(params, seed);
            generate(&mut state, 300);
            for o in &state.obstacles {
                prop_assert!(o.top_height >= MIN_WALL - 1e-3);
                prop_assert!(o.bottom_y <= height - MIN_WALL + 1e-3);
                prop_assert!((o.bottom_y - o.top_height - params.gap).abs() < 1e-3);
            }
        }

        #[test]
        fn test_prop_obstacles_strictly_increase_in_x(seed in any::<u64>()) {
            let mut state = state_with(PatternMode::Random, Difficulty::Hard, seed);
            for _ in 0..400 {
                extend_stream(&mut state);
                for o in &mut state.obstacles {
                    o.x -= state.params.speed;
                }
                prune(&mut state);
            }
            for pair in state.obstacles.windows(2) {
                prop_assert!(pair[0].x < pair[1].x);
            }
        }
    }

    #[test]
    fn test_straight_pins_the_midline() {
        let mut state = state_with(PatternMode::Straight, Difficulty::Normal, 7);
        generate(&mut state, 50);
        for o in &state.obstacles {
            assert_eq!(o.gap_center(), 225.0);
        }
    }

    #[test]
    fn test_stairs_holds_between_jumps() {
        let mut state = state_with(PatternMode::Stairs, Difficulty::Easy, 42);
        generate(&mut state, 200);
        let centers: Vec<f32> = state.obstacles.iter().map(|o| o.gap_center()).collect();
        let holds = centers.windows(2).filter(|w| w[0] == w[1]).count();
        let jumps = centers.len() - 1 - holds;
        assert!(holds > jumps, "plateaus should dominate ({holds} holds, {jumps} jumps)");
        assert!(jumps > 0);
    }

    #[test]
    fn test_zigzag_drifts_and_reverses() {
        let mut state = state_with(PatternMode::Zigzag, Difficulty::Normal, 3);
        generate(&mut state, 100);
        let step = ZIGZAG_STEP_FACTOR * state.params.vertical_speed;
        let deltas: Vec<f32> = state
            .obstacles
            .windows(2)
            .map(|w| w[1].gap_center() - w[0].gap_center())
            .collect();
        assert!(deltas.iter().all(|d| (d.abs() - step).abs() < 1e-3));
        assert!(deltas.iter().any(|d| *d > 0.0));
        assert!(deltas.iter().any(|d| *d < 0.0));
    }

    #[test]
    fn test_pinned_patterns_never_spawn_portals() {
        for mode in [PatternMode::Straight, PatternMode::Stairs, PatternMode::Zigzag] {
            let mut state = state_with(mode, Difficulty::Normal, 11);
            generate(&mut state, 500);
            assert!(state.portals.is_empty(), "{mode:?} spawned a portal");
        }
    }

    #[test]
    fn test_portals_alternate_and_respect_cooldown() {
        let mut state = state_with(PatternMode::Random, Difficulty::Normal, 5);
        generate(&mut state, 2000);
        assert!(state.portals.len() > 2);
        assert_eq!(state.portals[0].kind, PortalKind::GravityUp);
        for pair in state.portals.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
            assert!(pair[1].x - pair[0].x >= PORTAL_COOLDOWN_PX);
        }
    }

    #[test]
    fn test_auto_mode_counter_rolls_new_patterns() {
        let mut state = state_with(PatternMode::Random, Difficulty::Normal, 99);
        let mut seen = std::collections::HashSet::new();
        for i in 0..400 {
            spawn_obstacle(&mut state, i as f32);
            assert!(state.pattern.counter <= 14);
            seen.insert(format!("{:?}", state.pattern.current));
        }
        assert!(seen.len() >= 3);
    }

    #[test]
    fn test_stream_fills_to_right_edge() {
        let mut state = state_with(PatternMode::Random, Difficulty::Normal, 1);
        extend_stream(&mut state);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].x, 800.0 + FIRST_OBSTACLE_LEAD);

        state.obstacles[0].x = 0.0;
        extend_stream(&mut state);
        let xs: Vec<f32> = state.obstacles.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![0.0, 220.0, 440.0, 660.0]);
    }

    #[test]
    fn test_short_canvas_falls_back_to_midpoint() {
        assert_eq!(safe_band(100.0, 200.0), None);
        assert_eq!(clamp_center(10.0, 100.0, 200.0), 50.0);
    }

    #[test]
    fn test_prune_drops_offscreen_entries() {
        let mut state = state_with(PatternMode::Random, Difficulty::Normal, 1);
        spawn_obstacle(&mut state, -200.0);
        spawn_obstacle(&mut state, 100.0);
        state.portals.push(Portal {
            x: -100.0,
            y: 200.0,
            kind: PortalKind::GravityUp,
            radius: PORTAL_RADIUS,
            active: false,
        });
        prune(&mut state);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].x, 100.0);
        assert!(state.portals.is_empty());
    }
}
