//! Game settings and mount configuration
//!
//! Settings are persisted in the key-value store; `MountConfig` is the
//! per-mount payload handed over by the host shell.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Easy => "Easy",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyPreset::Easy),
            "normal" | "medium" | "med" => Some(DifficultyPreset::Normal),
            "hard" => Some(DifficultyPreset::Hard),
            _ => None,
        }
    }

    /// Entity speed multiplier
    pub fn speed_scale(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 0.8,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Hard => 1.25,
        }
    }

    /// Spawn interval multiplier (lower spawns faster)
    pub fn interval_scale(&self) -> f32 {
        match self {
            DifficultyPreset::Easy => 1.25,
            DifficultyPreset::Normal => 1.0,
            DifficultyPreset::Hard => 0.8,
        }
    }

    /// Scale a tick interval, never below one tick
    pub fn scale_interval(&self, ticks: u64) -> u64 {
        ((ticks as f32 * self.interval_scale()).round() as u64).max(1)
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: DifficultyPreset,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Normal,
            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "office_arcade_settings";

    /// Load settings, falling back to defaults on any storage problem
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.load_json(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to load settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &mut S) {
        match store.save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("pair count {0} out of range ({min}..={max})", min = MountConfig::MIN_PAIRS, max = MountConfig::MAX_PAIRS)]
    Pairs(usize),
    #[error("session duration {0}s out of range (1..={max})", max = MountConfig::MAX_DURATION_SECS)]
    Duration(u32),
    #[error("unknown difficulty {0:?}")]
    Difficulty(String),
}

/// Options a host passes when mounting a game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// RNG seed; the host clock is used when absent
    pub seed: Option<u64>,
    /// Overrides the stored difficulty
    pub difficulty: Option<DifficultyPreset>,
    /// Overrides the game's session length (timed games only)
    pub duration_secs: Option<u32>,
    /// Memory match pair count
    pub pairs: Option<usize>,
}

impl MountConfig {
    pub const MIN_PAIRS: usize = 2;
    pub const MAX_PAIRS: usize = 18;
    pub const MAX_DURATION_SECS: u32 = 3600;

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse a difficulty override by name
    pub fn with_difficulty_name(mut self, name: &str) -> Result<Self, ConfigError> {
        let preset = DifficultyPreset::from_str(name)
            .ok_or_else(|| ConfigError::Difficulty(name.to_string()))?;
        self.difficulty = Some(preset);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pairs) = self.pairs {
            if !(Self::MIN_PAIRS..=Self::MAX_PAIRS).contains(&pairs) {
                return Err(ConfigError::Pairs(pairs));
            }
        }
        if let Some(secs) = self.duration_secs {
            if secs == 0 || secs > Self::MAX_DURATION_SECS {
                return Err(ConfigError::Duration(secs));
            }
        }
        Ok(())
    }

    /// Difficulty to play at, given the stored settings
    pub fn difficulty_or(&self, settings: &Settings) -> DifficultyPreset {
        self.difficulty.unwrap_or(settings.difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_preset_parse_case_insensitive() {
        assert_eq!(DifficultyPreset::from_str("HARD"), Some(DifficultyPreset::Hard));
        assert_eq!(DifficultyPreset::from_str(" easy "), Some(DifficultyPreset::Easy));
        assert_eq!(DifficultyPreset::from_str("nightmare"), None);
    }

    #[test]
    fn test_scale_interval_floor() {
        assert_eq!(DifficultyPreset::Normal.scale_interval(48), 48);
        assert_eq!(DifficultyPreset::Hard.scale_interval(1), 1);
        assert_eq!(DifficultyPreset::Easy.scale_interval(48), 60);
    }

    #[test]
    fn test_settings_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            difficulty: DifficultyPreset::Hard,
            show_fps: true,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_unknown_settings_keys_ignored() {
        let mut store = MemoryStore::new();
        store
            .set(
                "office_arcade_settings",
                r#"{"difficulty":"Easy","show_fps":true,"muted":true}"#,
            )
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.difficulty, DifficultyPreset::Easy);
        assert!(settings.show_fps);
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let mut store = MemoryStore::new();
        store.set("office_arcade_settings", "garbage").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(MountConfig::default().validate().is_ok());
        let bad_pairs = MountConfig {
            pairs: Some(1),
            ..Default::default()
        };
        assert_eq!(bad_pairs.validate(), Err(ConfigError::Pairs(1)));
        let bad_time = MountConfig {
            duration_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(bad_time.validate(), Err(ConfigError::Duration(0)));
    }

    #[test]
    fn test_difficulty_name_override() {
        let config = MountConfig::with_seed(1).with_difficulty_name("easy").unwrap();
        assert_eq!(config.difficulty_or(&Settings::default()), DifficultyPreset::Easy);
        assert!(matches!(
            MountConfig::default().with_difficulty_name("??"),
            Err(ConfigError::Difficulty(_))
        ));
    }
}
