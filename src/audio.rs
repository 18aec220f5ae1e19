//! Audio system using Web Audio API
//!
//! Short procedurally generated tones, one per game event. The event mapping
//! is platform independent; playback only exists in the browser build.

use crate::sim::{GameEvent, PortalKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// First press of a run
    Start,
    /// Every later press
    Click,
    /// Gravity flipped upside-down
    FlipUp,
    /// Gravity restored
    FlipDown,
    /// Crashed into a wall or the floor/ceiling
    Crash,
    /// Survived to the win time
    Win,
    /// New personal best
    NewBest,
}

impl SoundEffect {
    /// Sound for a game event; passing obstacles is silent
    pub fn for_event(event: GameEvent) -> Option<Self> {
        match event {
            GameEvent::RunStarted => Some(SoundEffect::Start),
            GameEvent::Click => Some(SoundEffect::Click),
            GameEvent::PortalEntered(PortalKind::GravityUp) => Some(SoundEffect::FlipUp),
            GameEvent::PortalEntered(PortalKind::GravityDown) => Some(SoundEffect::FlipDown),
            GameEvent::ObstaclePassed => None,
            GameEvent::Crashed => Some(SoundEffect::Crash),
            GameEvent::Won => Some(SoundEffect::Win),
            GameEvent::NewBest => Some(SoundEffect::NewBest),
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;
    use crate::sim::GameEvent;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Fails outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
            }
        }

        /// Set volume (0.0 - 1.0)
        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }

        /// Play whatever sounds a frame's events call for
        pub fn play_events(&self, events: &[GameEvent]) {
            for &event in events {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.play(effect);
                }
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Start => self.play_sweep(ctx, vol * 0.3, 200.0, 600.0, 0.15),
                SoundEffect::Click => self.play_click(ctx, vol),
                SoundEffect::FlipUp => self.play_sweep(ctx, vol * 0.3, 300.0, 900.0, 0.25),
                SoundEffect::FlipDown => self.play_sweep(ctx, vol * 0.3, 900.0, 300.0, 0.25),
                SoundEffect::Crash => self.play_crash(ctx, vol),
                SoundEffect::Win => self.play_sequence(
                    ctx,
                    vol * 0.3,
                    &[400.0, 500.0, 600.0, 800.0],
                    0.1,
                    OscillatorType::Triangle,
                ),
                SoundEffect::NewBest => self.play_sequence(
                    ctx,
                    vol * 0.25,
                    &[500.0, 600.0, 700.0, 800.0, 1000.0],
                    0.08,
                    OscillatorType::Triangle,
                ),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Press - short soft tick
        fn play_click(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 880.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.15, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.04)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.05).ok();
        }

        /// Pitch glide between two frequencies
        fn play_sweep(&self, ctx: &AudioContext, level: f32, from: f32, to: f32, len: f64) {
            let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + len)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + len * 0.8)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + len + 0.05).ok();
        }

        /// Crash - low boom with a crack on top
        fn play_crash(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();

            if let Some((osc, gain)) = self.create_osc(ctx, 100.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.5, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.frequency().set_value_at_time(100.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(30.0, t + 0.4)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.5).ok();
            }

            if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.2, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }

        /// Rising arpeggio for wins and new bests
        fn play_sequence(
            &self,
            ctx: &AudioContext,
            level: f32,
            freqs: &[f32],
            spacing: f64,
            osc_type: OscillatorType,
        ) {
            for (i, &freq) in freqs.iter().enumerate() {
                let delay = i as f64 * spacing;
                if let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(level, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_sounds_follow_direction() {
        assert_eq!(
            SoundEffect::for_event(GameEvent::PortalEntered(PortalKind::GravityUp)),
            Some(SoundEffect::FlipUp)
        );
        assert_eq!(
            SoundEffect::for_event(GameEvent::PortalEntered(PortalKind::GravityDown)),
            Some(SoundEffect::FlipDown)
        );
    }

    #[test]
    fn test_passing_is_silent() {
        assert_eq!(SoundEffect::for_event(GameEvent::ObstaclePassed), None);
        assert_eq!(
            SoundEffect::for_event(GameEvent::Crashed),
            Some(SoundEffect::Crash)
        );
    }
}
