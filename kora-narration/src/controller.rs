//! Narration controller
//!
//! Mediates between play/pause/stop intents and a speech engine,
//! exposing the four-verb contract plus speed/volume/pitch/voice
//! settings. Owned and disposed explicitly by whatever scope needs
//! narration; nothing here is process-global. Construction spawns the
//! voice-catalog loader and status poller, so a tokio runtime must be
//! current.

use crate::config::{clamp_pitch, clamp_speed, clamp_volume, NarrationConfig};
use crate::engines::{SpeechEngine, Utterance, UtteranceEvents};
use crate::error::NarrationError;
use crate::status::{PlaybackStatus, StatusPoller};
use crate::voices::{self, VoiceCatalog, VoiceDescriptor};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handler for asynchronous engine failures.
pub type ErrorHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Mutable narration settings, applied to the next spoken utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrationSettings {
    /// Speed multiplier (0.1-2.0)
    pub speed: f32,

    /// Volume (0.0-1.0)
    pub volume: f32,

    /// Pitch multiplier (0.1-2.0)
    pub pitch: f32,

    /// Index of the selected voice in the catalog snapshot
    pub voice_index: Option<usize>,
}

#[derive(Default)]
struct PlaybackFlags {
    playing: AtomicBool,
    paused: AtomicBool,
}

impl PlaybackFlags {
    fn set_idle(&self) {
        self.playing.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }
}

/// Narration controller
pub struct NarrationController {
    engine: Arc<dyn SpeechEngine>,
    supported: bool,
    settings: Arc<RwLock<NarrationSettings>>,
    selection_explicit: Arc<AtomicBool>,
    flags: Arc<PlaybackFlags>,
    // Monotonic utterance generation; callbacks from older utterances
    // are ignored
    generation: Arc<AtomicU64>,
    // Serializes the cancel-then-submit section of speak() and stop()
    speak_lock: Mutex<()>,
    catalog: VoiceCatalog,
    poller: StatusPoller,
    selection_task: JoinHandle<()>,
    error_handler: Option<ErrorHandler>,
}

impl NarrationController {
    /// Create a new narration controller
    ///
    /// An unavailable engine is not an error; the controller is built
    /// with narration disabled and every verb degrades to a no-op.
    pub fn new(
        engine: Arc<dyn SpeechEngine>,
        config: NarrationConfig,
    ) -> Result<Self, NarrationError> {
        config.validate().map_err(NarrationError::Config)?;

        let supported = engine.is_available();
        if !supported {
            warn!(
                "Speech engine '{}' is not available; narration disabled",
                engine.name()
            );
        }

        let settings = Arc::new(RwLock::new(NarrationSettings {
            speed: config.speed,
            volume: config.volume,
            pitch: config.pitch,
            voice_index: None,
        }));
        let selection_explicit = Arc::new(AtomicBool::new(false));

        let catalog = VoiceCatalog::spawn(
            Arc::clone(&engine),
            Duration::from_millis(config.voice_scan_interval_ms),
            Duration::from_millis(config.voice_scan_window_ms),
        );
        let poller = StatusPoller::spawn(
            Arc::clone(&engine),
            Duration::from_millis(config.poll_interval_ms),
        );

        let selection_task = {
            let mut rx = catalog.subscribe();
            let settings = Arc::clone(&settings);
            let explicit = Arc::clone(&selection_explicit);
            let preferred_voice = config.preferred_voice.clone();
            let preferred_language = config.preferred_language.clone();

            tokio::spawn(async move {
                loop {
                    let voices = rx.borrow_and_update().clone();

                    let current = settings.read().voice_index;
                    let explicit_in_range = explicit.load(Ordering::SeqCst)
                        && current.map_or(false, |i| i < voices.len());

                    if !explicit_in_range {
                        // An explicit selection that fell out of range
                        // reverts to the default heuristic
                        explicit.store(false, Ordering::SeqCst);
                        let index = preferred_voice
                            .as_deref()
                            .and_then(|name| voices::find_voice(&voices, name))
                            .or_else(|| {
                                voices::pick_default_voice(&voices, &preferred_language)
                            });
                        settings.write().voice_index = index;
                        if let Some(i) = index {
                            debug!("Default narration voice: {}", voices[i].name);
                        }
                    }

                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
        };

        Ok(Self {
            engine,
            supported,
            settings,
            selection_explicit,
            flags: Arc::new(PlaybackFlags::default()),
            generation: Arc::new(AtomicU64::new(0)),
            speak_lock: Mutex::new(()),
            catalog,
            poller,
            selection_task,
            error_handler: None,
        })
    }

    /// Install a handler for asynchronous engine failures. Without
    /// one, failures are logged and swallowed.
    pub fn with_error_handler(
        mut self,
        handler: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Speak `text`, cancelling any narration already in flight.
    ///
    /// Empty or whitespace-only text is a silent no-op: no state
    /// transition, no callbacks.
    pub fn speak(&self, text: &str) {
        if !self.supported {
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        let _guard = self.speak_lock.lock();

        // New generation first, so callbacks from the cancelled
        // utterance are already stale
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.engine.cancel();
        self.flags.set_idle();

        let (speed, pitch, volume, voice) = {
            let settings = self.settings.read();
            let voice = settings
                .voice_index
                .and_then(|i| self.catalog.snapshot().into_iter().nth(i));
            (settings.speed, settings.pitch, settings.volume, voice)
        };

        let events = UtteranceEvents {
            on_start: Some(Box::new({
                let flags = Arc::clone(&self.flags);
                let current = Arc::clone(&self.generation);
                move || {
                    if current.load(Ordering::SeqCst) == generation {
                        flags.playing.store(true, Ordering::SeqCst);
                        flags.paused.store(false, Ordering::SeqCst);
                    }
                }
            })),
            on_end: Some(Box::new({
                let flags = Arc::clone(&self.flags);
                let current = Arc::clone(&self.generation);
                move || {
                    if current.load(Ordering::SeqCst) == generation {
                        flags.set_idle();
                    }
                }
            })),
            on_error: Some(Box::new({
                let flags = Arc::clone(&self.flags);
                let current = Arc::clone(&self.generation);
                let handler = self.error_handler.clone();
                move |message: &str| {
                    if current.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    flags.set_idle();
                    match &handler {
                        Some(h) => h(message),
                        None => warn!("Speech engine error: {message}"),
                    }
                }
            })),
        };

        let utterance = Utterance {
            text: text.to_string(),
            speed,
            pitch,
            volume,
            voice,
            events,
        };

        if let Err(e) = self.engine.speak(utterance) {
            self.flags.set_idle();
            match &self.error_handler {
                Some(h) => h(&e.to_string()),
                None => warn!("Failed to submit narration: {e}"),
            }
        }
    }

    /// Pause the current narration. No-op unless playing and not
    /// already paused.
    pub fn pause(&self) {
        if !self.supported {
            return;
        }
        if self.flags.playing.load(Ordering::SeqCst) && !self.flags.paused.load(Ordering::SeqCst)
        {
            self.engine.pause();
            self.flags.paused.store(true, Ordering::SeqCst);
        }
    }

    /// Resume a paused narration. No-op unless paused.
    pub fn resume(&self) {
        if !self.supported {
            return;
        }
        if self.flags.paused.load(Ordering::SeqCst) {
            self.engine.resume();
            self.flags.paused.store(false, Ordering::SeqCst);
        }
    }

    /// Stop any narration unconditionally. Idempotent.
    pub fn stop(&self) {
        if !self.supported {
            return;
        }
        let _guard = self.speak_lock.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.engine.cancel();
        self.flags.set_idle();
    }

    /// Set the speed multiplier, clamped to the supported range.
    /// Takes effect on the next `speak`.
    pub fn set_speed(&self, value: f32) {
        self.settings.write().speed = clamp_speed(value);
    }

    /// Set the volume, clamped to the supported range. Takes effect on
    /// the next `speak`.
    pub fn set_volume(&self, value: f32) {
        self.settings.write().volume = clamp_volume(value);
    }

    /// Set the pitch multiplier, clamped to the supported range. Takes
    /// effect on the next `speak`.
    pub fn set_pitch(&self, value: f32) {
        self.settings.write().pitch = clamp_pitch(value);
    }

    /// Select a voice by its index in the current catalog snapshot.
    /// An out-of-range index leaves the selection unchanged.
    pub fn set_voice(&self, index: usize) {
        if index < self.catalog.snapshot().len() {
            self.settings.write().voice_index = Some(index);
            self.selection_explicit.store(true, Ordering::SeqCst);
        }
    }

    pub fn speed(&self) -> f32 {
        self.settings.read().speed
    }

    pub fn volume(&self) -> f32 {
        self.settings.read().volume
    }

    pub fn pitch(&self) -> f32 {
        self.settings.read().pitch
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> NarrationSettings {
        *self.settings.read()
    }

    /// Current voice catalog snapshot.
    pub fn voices(&self) -> Vec<VoiceDescriptor> {
        self.catalog.snapshot()
    }

    /// Subscribe to voice catalog updates.
    pub fn watch_voices(&self) -> watch::Receiver<Vec<VoiceDescriptor>> {
        self.catalog.subscribe()
    }

    /// The selected voice, if any.
    pub fn current_voice(&self) -> Option<VoiceDescriptor> {
        self.settings
            .read()
            .voice_index
            .and_then(|i| self.catalog.snapshot().into_iter().nth(i))
    }

    /// Current playback state as tracked through engine callbacks.
    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: self.flags.playing.load(Ordering::SeqCst),
            is_paused: self.flags.paused.load(Ordering::SeqCst),
        }
    }

    /// Subscribe to the sampled playback status.
    pub fn watch_status(&self) -> watch::Receiver<PlaybackStatus> {
        self.poller.subscribe()
    }

    /// Whether narration is supported at all (the engine was available
    /// at construction time).
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Cancel any narration and stop the background tasks. Also runs
    /// on drop.
    pub fn shutdown(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.engine.cancel();
        self.flags.set_idle();
        self.selection_task.abort();
        self.poller.shutdown();
        self.catalog.shutdown();
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
