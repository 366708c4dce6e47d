//! Game settings and preferences
//!
//! Persisted separately from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};

/// Controller dead zone bounds
pub const MIN_DEAD_ZONE: f32 = 0.05;
pub const MAX_DEAD_ZONE: f32 = 0.3;
pub const DEFAULT_DEAD_ZONE: f32 = 0.1;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 128,
            QualityPreset::Medium => 512,
            QualityPreset::High => 1024,
        }
    }

    /// Whether bullet trails are drawn
    pub fn trails_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, hits, pickups)
    pub particles: bool,
    /// Bomb screen flash
    pub screen_flash: bool,
    /// Debug overlay (fps, entity counts, pad status)
    pub debug_overlay: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Controller ===
    pub vibration: bool,
    /// Stick dead zone, kept within [MIN_DEAD_ZONE, MAX_DEAD_ZONE]
    pub dead_zone: f32,

    // === Accessibility ===
    /// Reduced motion (no screen flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            screen_flash: true,
            debug_overlay: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            vibration: true,
            dead_zone: DEFAULT_DEAD_ZONE,

            reduced_motion: false,
        }
    }
}

impl Settings {
    pub const STORAGE_KEY: &'static str = "star_barrage_settings";

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        if preset == QualityPreset::Low {
            self.screen_flash = false;
        }
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Volume actually sent to the audio backend
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    pub fn toggle_vibration(&mut self) -> bool {
        self.vibration = !self.vibration;
        self.vibration
    }

    /// Nudge the dead zone, clamped to its bounds
    pub fn adjust_dead_zone(&mut self, delta: f32) -> f32 {
        self.dead_zone = (self.dead_zone + delta).clamp(MIN_DEAD_ZONE, MAX_DEAD_ZONE);
        self.dead_zone
    }

    /// Restore controller defaults (vibration on, default dead zone)
    pub fn reset_controller(&mut self) {
        self.vibration = true;
        self.dead_zone = DEFAULT_DEAD_ZONE;
    }

    /// Load settings; missing or unreadable data yields defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(mut settings)) => {
                log::info!("Loaded settings");
                settings.dead_zone = settings.dead_zone.clamp(MIN_DEAD_ZONE, MAX_DEAD_ZONE);
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_dead_zone_is_clamped() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust_dead_zone(1.0), MAX_DEAD_ZONE);
        assert_eq!(settings.adjust_dead_zone(-1.0), MIN_DEAD_ZONE);
        settings.reset_controller();
        assert_eq!(settings.dead_zone, DEFAULT_DEAD_ZONE);
        assert!(settings.vibration);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"vibration": false, "dead_zone": 0.9}"#)
            .expect("set");
        let settings = Settings::load(&store);
        assert!(!settings.vibration);
        assert_eq!(settings.dead_zone, MAX_DEAD_ZONE);
        assert_eq!(settings.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_save_and_reload() {
        let store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.apply_preset(QualityPreset::Low);
        settings.muted = true;
        settings.save(&store).expect("save");
        let loaded = Settings::load(&store);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.effective_volume(), 0.0);
        assert!(!loaded.effective_screen_flash());
    }

    #[test]
    fn test_particles_toggle_caps_to_zero() {
        let mut settings = Settings::default();
        assert_eq!(settings.max_particles(), 512);
        settings.particles = false;
        assert_eq!(settings.max_particles(), 0);
    }
}
