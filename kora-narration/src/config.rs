//! Configuration for the narration engine

use serde::{Deserialize, Serialize};

/// Speed multiplier bounds (1.0 is normal speed).
pub const SPEED_RANGE: (f32, f32) = (0.1, 2.0);
/// Volume bounds.
pub const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);
/// Pitch multiplier bounds (1.0 is normal pitch).
pub const PITCH_RANGE: (f32, f32) = (0.1, 2.0);

/// Narration engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Preferred speech engine
    pub engine: EngineKind,

    /// Initial speed multiplier (0.1-2.0, default 1.0)
    pub speed: f32,

    /// Initial volume (0.0-1.0, default 1.0)
    pub volume: f32,

    /// Initial pitch multiplier (0.1-2.0, default 1.0)
    pub pitch: f32,

    /// Language family preferred when picking a default voice (e.g. "en")
    pub preferred_language: String,

    /// Explicit voice name to select once the catalog contains it
    pub preferred_voice: Option<String>,

    /// Playback status sampling interval in milliseconds
    pub poll_interval_ms: u64,

    /// Interval between voice catalog re-reads in milliseconds
    pub voice_scan_interval_ms: u64,

    /// Total window for voice catalog re-reads in milliseconds
    pub voice_scan_window_ms: u64,
}

/// Speech engine type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Platform speech engine (espeak-ng, say, SAPI)
    Native,
    /// Deterministic in-process engine, useful for tests and demos
    Simulated,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Native,
            speed: 1.0,
            volume: 1.0,
            pitch: 1.0,
            preferred_language: "en".to_string(),
            preferred_voice: None,
            poll_interval_ms: 100,
            voice_scan_interval_ms: 500,
            voice_scan_window_ms: 5_000,
        }
    }
}

impl NarrationConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(SPEED_RANGE.0..=SPEED_RANGE.1).contains(&self.speed) {
            return Err(format!(
                "Speed must be between {} and {}",
                SPEED_RANGE.0, SPEED_RANGE.1
            ));
        }

        if !(VOLUME_RANGE.0..=VOLUME_RANGE.1).contains(&self.volume) {
            return Err(format!(
                "Volume must be between {} and {}",
                VOLUME_RANGE.0, VOLUME_RANGE.1
            ));
        }

        if !(PITCH_RANGE.0..=PITCH_RANGE.1).contains(&self.pitch) {
            return Err(format!(
                "Pitch must be between {} and {}",
                PITCH_RANGE.0, PITCH_RANGE.1
            ));
        }

        if self.preferred_language.is_empty() {
            return Err("Preferred language cannot be empty".to_string());
        }

        if self.preferred_language.len() > 32 {
            return Err("Preferred language too long (max 32 chars)".to_string());
        }

        if !self
            .preferred_language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(
                "Preferred language contains invalid characters (only alphanumeric and '-' allowed)"
                    .to_string(),
            );
        }

        if let Some(ref name) = self.preferred_voice {
            if name.is_empty() {
                return Err("Preferred voice cannot be empty if provided".to_string());
            }

            if name.len() > 256 {
                return Err("Preferred voice name too long (max 256 chars)".to_string());
            }

            if name.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("Preferred voice name contains invalid characters".to_string());
            }
        }

        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be greater than 0".to_string());
        }

        if self.poll_interval_ms > 10_000 {
            return Err("Poll interval too large (max 10000 ms)".to_string());
        }

        if self.voice_scan_interval_ms == 0 {
            return Err("Voice scan interval must be greater than 0".to_string());
        }

        if self.voice_scan_interval_ms > self.voice_scan_window_ms {
            return Err("Voice scan interval cannot be greater than scan window".to_string());
        }

        if self.voice_scan_window_ms > 60_000 {
            return Err("Voice scan window too large (max 60000 ms)".to_string());
        }

        Ok(())
    }
}

/// Clamp a speed multiplier into the supported range.
pub fn clamp_speed(value: f32) -> f32 {
    value.clamp(SPEED_RANGE.0, SPEED_RANGE.1)
}

/// Clamp a volume into the supported range.
pub fn clamp_volume(value: f32) -> f32 {
    value.clamp(VOLUME_RANGE.0, VOLUME_RANGE.1)
}

/// Clamp a pitch multiplier into the supported range.
pub fn clamp_pitch(value: f32) -> f32 {
    value.clamp(PITCH_RANGE.0, PITCH_RANGE.1)
}
