//! kora-narration: narration playback for heritage-site audio guides
//!
//! Provides spoken narration with:
//! - A play/pause/resume/stop controller over pluggable speech engines
//! - Polling-based playback status for display components
//! - Asynchronous voice catalog loading with a default-voice heuristic
//! - Narration script composition from per-site fragments

pub mod config;
pub mod controller;
pub mod engines;
pub mod error;
pub mod script;
pub mod status;
pub mod voices;

pub use config::{EngineKind, NarrationConfig};
pub use controller::{NarrationController, NarrationSettings};
pub use engines::native::NativeEngine;
pub use engines::simulated::SimulatedEngine;
pub use engines::{SpeechEngine, Utterance, UtteranceEvents};
pub use error::NarrationError;
pub use script::{Site, SiteNarration};
pub use status::{PlaybackStatus, StatusPoller};
pub use voices::{pick_default_voice, VoiceCatalog, VoiceDescriptor};
