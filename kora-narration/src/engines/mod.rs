//! Speech engine implementations

pub mod native;
pub mod simulated;

use crate::error::NarrationError;
use crate::voices::VoiceDescriptor;
use async_trait::async_trait;

/// Callbacks fired as an utterance moves through an engine.
///
/// All callbacks are invoked from the engine's own task, never from the
/// submitting call.
#[derive(Default)]
pub struct UtteranceEvents {
    pub on_start: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_end: Option<Box<dyn Fn() + Send + Sync>>,
    pub on_error: Option<Box<dyn Fn(&str) + Send + Sync>>,
}

impl UtteranceEvents {
    pub(crate) fn fire_start(&self) {
        if let Some(cb) = &self.on_start {
            cb();
        }
    }

    pub(crate) fn fire_end(&self) {
        if let Some(cb) = &self.on_end {
            cb();
        }
    }

    pub(crate) fn fire_error(&self, message: &str) {
        if let Some(cb) = &self.on_error {
            cb(message);
        }
    }
}

/// A single narration request submitted to an engine.
///
/// Carries the playback parameters captured at submission time; later
/// settings changes never affect an utterance already in flight.
pub struct Utterance {
    pub text: String,
    /// Speed multiplier (1.0 is normal)
    pub speed: f32,
    /// Pitch multiplier (1.0 is normal)
    pub pitch: f32,
    /// Volume (0.0-1.0)
    pub volume: f32,
    /// Voice to speak with; engine default when absent
    pub voice: Option<VoiceDescriptor>,
    pub events: UtteranceEvents,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speed: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
            events: UtteranceEvents::default(),
        }
    }
}

/// Trait for speech engines
///
/// An engine plays at most one utterance at a time. Control verbs are
/// fire-and-forget and must not block; progress is observed through the
/// utterance events or by sampling `is_speaking`/`is_paused`.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Submit an utterance for playback, cancelling any utterance
    /// already in flight. Returns once the utterance is accepted.
    fn speak(&self, utterance: Utterance) -> Result<(), NarrationError>;

    /// Cancel the in-flight utterance, if any. No events fire for a
    /// cancelled utterance.
    fn cancel(&self);

    /// Pause the in-flight utterance, if any.
    fn pause(&self);

    /// Resume a paused utterance, if any.
    fn resume(&self);

    /// Whether an utterance is in flight (a paused utterance counts).
    fn is_speaking(&self) -> bool;

    /// Whether the in-flight utterance is paused.
    fn is_paused(&self) -> bool;

    /// Enumerate the voices the engine currently knows about. Some
    /// platforms populate this list asynchronously, so repeated calls
    /// may return more voices than earlier ones.
    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, NarrationError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
