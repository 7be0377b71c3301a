//! Deterministic in-process speech engine
//!
//! Plays an utterance for a duration proportional to its length on the
//! tokio clock, honoring pause and cancel. Used by tests, demos, and as
//! a stand-in on platforms without a native engine.

use crate::engines::{SpeechEngine, Utterance};
use crate::error::NarrationError;
use crate::voices::VoiceDescriptor;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const PROGRESS_TICK: Duration = Duration::from_millis(5);

/// Simulated speech engine
pub struct SimulatedEngine {
    inner: Arc<Inner>,
}

struct Inner {
    available: bool,
    ms_per_char: u64,
    speaking: AtomicBool,
    paused: AtomicBool,
    voices: RwLock<Vec<VoiceDescriptor>>,
    current: Mutex<Option<ActiveUtterance>>,
    spoken: Mutex<Vec<String>>,
    fail_next: Mutex<Option<String>>,
}

struct ActiveUtterance {
    cancelled: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::with_timing(10)
    }

    /// Engine whose utterances take `ms_per_char` milliseconds per
    /// character of text.
    pub fn with_timing(ms_per_char: u64) -> Self {
        Self::build(true, ms_per_char)
    }

    /// Engine that reports itself unavailable; every submission fails.
    pub fn unavailable() -> Self {
        Self::build(false, 10)
    }

    fn build(available: bool, ms_per_char: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                available,
                ms_per_char: ms_per_char.max(1),
                speaking: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                voices: RwLock::new(Vec::new()),
                current: Mutex::new(None),
                spoken: Mutex::new(Vec::new()),
                fail_next: Mutex::new(None),
            }),
        }
    }

    /// Replace the voice catalog the engine reports.
    pub fn set_voices(&self, voices: Vec<VoiceDescriptor>) {
        *self.inner.voices.write() = voices;
    }

    /// Make the next submitted utterance fail asynchronously with the
    /// given message instead of completing.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.inner.fail_next.lock() = Some(message.into());
    }

    /// Texts submitted so far, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.inner.spoken.lock().clone()
    }
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for SimulatedEngine {
    fn speak(&self, utterance: Utterance) -> Result<(), NarrationError> {
        if !self.inner.available {
            return Err(NarrationError::Engine(
                "Simulated engine not available".to_string(),
            ));
        }

        self.cancel();

        let duration = Duration::from_millis(
            self.inner.ms_per_char * utterance.text.chars().count().max(1) as u64,
        );
        let injected_failure = self.inner.fail_next.lock().take();
        self.inner.spoken.lock().push(utterance.text.clone());

        // In flight from the moment the submission is accepted
        self.inner.speaking.store(true, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let events = utterance.events;
            // A cancel that lands before the task runs suppresses all
            // events, including start
            if flag.load(Ordering::SeqCst) {
                return;
            }
            events.fire_start();

            if let Some(message) = injected_failure {
                tokio::time::sleep(PROGRESS_TICK).await;
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                inner.speaking.store(false, Ordering::SeqCst);
                inner.paused.store(false, Ordering::SeqCst);
                events.fire_error(&message);
                return;
            }

            let mut elapsed = Duration::ZERO;
            while elapsed < duration {
                tokio::time::sleep(PROGRESS_TICK).await;
                if flag.load(Ordering::SeqCst) {
                    return;
                }
                // A paused utterance makes no progress
                if !inner.paused.load(Ordering::SeqCst) {
                    elapsed += PROGRESS_TICK;
                }
            }

            if flag.load(Ordering::SeqCst) {
                return;
            }
            inner.speaking.store(false, Ordering::SeqCst);
            inner.paused.store(false, Ordering::SeqCst);
            events.fire_end();
        });

        *self.inner.current.lock() = Some(ActiveUtterance { cancelled, task });
        Ok(())
    }

    fn cancel(&self) {
        if let Some(active) = self.inner.current.lock().take() {
            active.cancelled.store(true, Ordering::SeqCst);
            active.task.abort();
        }
        self.inner.speaking.store(false, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    fn pause(&self) {
        if self.inner.speaking.load(Ordering::SeqCst) {
            self.inner.paused.store(true, Ordering::SeqCst);
        }
    }

    fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.inner.speaking.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, NarrationError> {
        Ok(self.inner.voices.read().clone())
    }

    fn is_available(&self) -> bool {
        self.inner.available
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
