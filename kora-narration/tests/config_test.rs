//! Tests for narration configuration

use kora_narration::config::{
    clamp_pitch, clamp_speed, clamp_volume, EngineKind, NarrationConfig,
};

#[test]
fn test_config_default() {
    let config = NarrationConfig::default();
    assert_eq!(config.engine, EngineKind::Native);
    assert_eq!(config.speed, 1.0);
    assert_eq!(config.volume, 1.0);
    assert_eq!(config.pitch, 1.0);
    assert_eq!(config.preferred_language, "en");
    assert_eq!(config.poll_interval_ms, 100);
    assert_eq!(config.voice_scan_interval_ms, 500);
    assert_eq!(config.voice_scan_window_ms, 5_000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_speed() {
    let mut config = NarrationConfig::default();
    config.speed = 2.5; // Too high
    assert!(config.validate().is_err());

    config.speed = 0.05; // Too low
    assert!(config.validate().is_err());

    config.speed = 0.1;
    assert!(config.validate().is_ok());

    config.speed = 2.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_volume() {
    let mut config = NarrationConfig::default();
    config.volume = 1.5; // Too high
    assert!(config.validate().is_err());

    config.volume = -0.1; // Too low
    assert!(config.validate().is_err());

    config.volume = 0.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_pitch() {
    let mut config = NarrationConfig::default();
    config.pitch = 2.5;
    assert!(config.validate().is_err());

    config.pitch = 0.0;
    assert!(config.validate().is_err());

    config.pitch = 1.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_language() {
    let mut config = NarrationConfig::default();
    config.preferred_language = String::new();
    assert!(config.validate().is_err());

    config.preferred_language = "en US".to_string(); // Space not allowed
    assert!(config.validate().is_err());

    config.preferred_language = "en-GB".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_intervals() {
    let mut config = NarrationConfig::default();
    config.poll_interval_ms = 0;
    assert!(config.validate().is_err());

    config.poll_interval_ms = 100;
    config.voice_scan_interval_ms = 10_000;
    config.voice_scan_window_ms = 5_000; // Interval exceeds window
    assert!(config.validate().is_err());

    config.voice_scan_interval_ms = 500;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation_preferred_voice() {
    let mut config = NarrationConfig::default();
    config.preferred_voice = Some(String::new());
    assert!(config.validate().is_err());

    config.preferred_voice = Some("bad\0voice".to_string());
    assert!(config.validate().is_err());

    config.preferred_voice = Some("Hazel".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_clamp_helpers() {
    assert_eq!(clamp_speed(5.0), 2.0);
    assert_eq!(clamp_speed(0.0), 0.1);
    assert_eq!(clamp_speed(1.3), 1.3);

    assert_eq!(clamp_volume(1.5), 1.0);
    assert_eq!(clamp_volume(-0.5), 0.0);
    assert_eq!(clamp_volume(0.7), 0.7);

    assert_eq!(clamp_pitch(9.0), 2.0);
    assert_eq!(clamp_pitch(0.01), 0.1);
    assert_eq!(clamp_pitch(1.0), 1.0);
}

#[test]
fn test_engine_kind_serde() {
    let json = serde_json::to_string(&EngineKind::Simulated).unwrap();
    assert_eq!(json, "\"simulated\"");

    let kind: EngineKind = serde_json::from_str("\"native\"").unwrap();
    assert_eq!(kind, EngineKind::Native);
}

#[test]
fn test_config_deserialize_partial() {
    // Unspecified fields fall back to defaults
    let config: NarrationConfig =
        serde_json::from_str(r#"{"engine":"simulated","speed":1.5}"#).unwrap();
    assert_eq!(config.engine, EngineKind::Simulated);
    assert_eq!(config.speed, 1.5);
    assert_eq!(config.volume, 1.0);
    assert_eq!(config.poll_interval_ms, 100);
}
