//! Game settings and tuning
//!
//! Persisted in LocalStorage on the web; natively read from the JSON file
//! named by `EMBER_HUNT_SETTINGS`. Missing fields fall back to defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Why a settings blob was refused
#[derive(Debug)]
pub enum SettingsError {
    /// Could not read the settings source
    Io(String),
    /// JSON did not parse
    Parse(serde_json::Error),
    /// Parsed, but a value is out of range
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(msg) => write!(f, "could not read settings: {}", msg),
            SettingsError::Parse(err) => write!(f, "settings are not valid JSON: {}", err),
            SettingsError::Invalid(what) => write!(f, "invalid setting: {}", what),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::Parse(err)
    }
}

/// Game settings/tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed RNG seed (None = seed from the clock)
    pub seed: Option<u64>,

    // === Placement ===
    /// Height of the virtual floor
    pub ground_y: f32,
    /// Furthest a placement tap may land from the scan marker
    pub max_place_radius: f32,
    /// Tilt (degrees) past which the floor counts as found
    pub floor_pitch_threshold_deg: f32,
    /// Rotate the camera with the device orientation sensor
    pub use_orientation: bool,

    // === Fire ===
    pub fire_radius: f32,
    /// Seconds every piece must stay inside the ring
    pub stable_seconds: f32,
    /// Pause between ignition and the hunt
    pub ignition_handoff_seconds: f32,

    // === Hunt ===
    pub target_score: i32,
    pub loss_score: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,

            ground_y: GROUND_Y,
            max_place_radius: MAX_PLACE_RADIUS,
            floor_pitch_threshold_deg: FLOOR_PITCH_THRESHOLD_DEG,
            use_orientation: true,

            fire_radius: FIRE_RADIUS,
            stable_seconds: STABLE_SECONDS,
            ignition_handoff_seconds: IGNITION_HANDOFF_SECONDS,

            target_score: TARGET_SCORE,
            loss_score: LOSS_SCORE,
        }
    }
}

impl Settings {
    /// Reject values that would make the game unwinnable or degenerate
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.ground_y.is_finite() {
            return Err(SettingsError::Invalid("ground_y must be finite"));
        }
        if !(self.max_place_radius > 0.0) {
            return Err(SettingsError::Invalid("max_place_radius must be positive"));
        }
        if !(self.fire_radius > 0.0) {
            return Err(SettingsError::Invalid("fire_radius must be positive"));
        }
        if !(self.stable_seconds > 0.0) {
            return Err(SettingsError::Invalid("stable_seconds must be positive"));
        }
        if !(self.ignition_handoff_seconds >= 0.0) {
            return Err(SettingsError::Invalid("ignition_handoff_seconds must not be negative"));
        }
        if self.target_score <= 0 || self.loss_score >= 0 {
            return Err(SettingsError::Invalid(
                "target_score must be positive and loss_score negative",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON settings blob
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ember_hunt_settings";

    /// Native settings file variable
    #[allow(dead_code)]
    const PATH_VAR: &'static str = "EMBER_HUNT_SETTINGS";

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
                    Err(err) => log::warn!("Ignoring stored settings: {}", err),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Load settings from the file named by `EMBER_HUNT_SETTINGS`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_VAR) else {
            return Self::default();
        };
        match Self::load_file(std::path::Path::new(&path)) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(err) => {
                log::warn!("Ignoring settings file {}: {}", path, err);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: &std::path::Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        Self::from_json(&json)
    }
}
