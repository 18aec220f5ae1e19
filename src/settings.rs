//! Game settings and preferences
//!
//! Persisted separately from leaderboards under a single key.

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::PatternMode;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Mode ===
    /// Last selected difficulty
    pub difficulty: Difficulty,
    /// No win condition; run until collision
    pub endless: bool,
    /// Faster, steeper wave with a smaller hitbox
    pub mini: bool,
    /// Pinned corridor pattern for practice (Random = normal play)
    pub training_pattern: PatternMode,

    // === Audio ===
    pub sound: bool,
    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    // === Visual Effects ===
    /// Screen shake on crash
    pub screen_shake: bool,
    /// Avatar trail
    pub trails: bool,
    /// Crash particles and click ripples
    pub particles: bool,
    /// Draw the best run's ghost
    pub ghost: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no hue cycling)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            endless: false,
            mini: false,
            training_pattern: PatternMode::Random,

            sound: true,
            volume: 0.8,

            screen_shake: true,
            trails: true,
            particles: true,
            ghost: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "wave_dash_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective volume (0 when sound is off)
    pub fn effective_volume(&self) -> f32 {
        if self.sound {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged
    pub fn save(&self, store: &mut impl KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            difficulty: Difficulty::Insane,
            mini: true,
            training_pattern: PatternMode::Zigzag,
            sound: false,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"difficulty":"Hard","endless":true}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(settings.endless);
        assert!(settings.sound);
        assert_eq!(settings.training_pattern, PatternMode::Random);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"difficulty":"Nightmare"}"#)
            .unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_reduced_motion_and_mute() {
        let settings = Settings {
            reduced_motion: true,
            sound: false,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert_eq!(settings.effective_volume(), 0.0);
    }
}
