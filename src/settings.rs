//! Game settings and preferences
//!
//! Persisted as JSON in LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::audio::AudioConfig;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    Medium,
    #[default]
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Twinkling stars in the sky
    pub fn star_count(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 60,
            QualityPreset::High => 100,
        }
    }

    /// Falling snowflakes
    pub fn snow_count(&self) -> usize {
        match self {
            QualityPreset::Low => 40,
            QualityPreset::Medium => 70,
            QualityPreset::High => 100,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Projectile trails
    pub trails: bool,

    // === Audio ===
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::High,
            trails: true,
            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse stored JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            muted: self.muted,
            master_volume: self.master_volume.clamp(0.0, 1.0),
            sfx_volume: self.sfx_volume.clamp(0.0, 1.0),
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "gift_shooter_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Failed to write settings to LocalStorage");
                    } else {
                        log::info!("Settings saved");
                    }
                }
                Err(e) => log::warn!("Failed to serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        log::debug!("Settings::save is a no-op on native ({})", Self::STORAGE_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{"muted":true,"quality":"Low"}"#).expect("valid json");
        assert!(s.muted);
        assert_eq!(s.quality, QualityPreset::Low);
        assert!(s.trails);
        assert_eq!(s.master_volume, 0.8);
    }

    #[test]
    fn test_json_round_trip_keeps_preferences() {
        let mut s = Settings::from_preset(QualityPreset::Medium);
        s.trails = false;
        let back = Settings::from_json(&s.to_json().expect("serialize")).expect("parse");
        assert_eq!(back, s);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Settings::from_json("not json").is_err());
    }

    #[test]
    fn test_audio_config_clamps() {
        let s = Settings {
            master_volume: 2.0,
            muted: true,
            ..Settings::default()
        };
        let cfg = s.audio_config();
        assert!(cfg.muted);
        assert_eq!(cfg.master_volume, 1.0);
    }

    #[test]
    fn test_preset_counts() {
        assert_eq!(QualityPreset::High.star_count(), 100);
        assert_eq!(QualityPreset::High.snow_count(), 100);
        assert!(QualityPreset::Low.star_count() < QualityPreset::Medium.star_count());
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        for preset in [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High] {
            assert_eq!(QualityPreset::parse(preset.as_str()), Some(preset));
        }
    }
}
