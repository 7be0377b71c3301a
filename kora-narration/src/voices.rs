//! Voice catalog loading and default-voice selection
//!
//! Some platforms populate their voice list asynchronously, so a single
//! read at construction time can come up empty. The catalog loader
//! re-reads on a timer for a bounded window, stopping early once the
//! count stabilizes, and republishes snapshots through a watch channel.

use crate::engines::SpeechEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Name fragments that hint at a female voice, preferred for narration
/// clarity.
const FEMALE_HINT_TOKENS: [&str; 4] = ["female", "woman", "zira", "hazel"];

/// A voice as enumerated by a speech engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceDescriptor {
    /// Voice name/identifier
    pub name: String,

    /// Language tag (e.g. "en-US")
    pub language: String,

    /// Whether the voice is hosted locally rather than remotely
    pub is_local: bool,
}

/// Pick the index of the default voice for a catalog.
///
/// Preference order: a local voice in the preferred language family
/// whose name hints at a female voice, then any local voice in that
/// family, then the first voice of any kind, then none.
pub fn pick_default_voice(voices: &[VoiceDescriptor], preferred_language: &str) -> Option<usize> {
    let family: Vec<usize> = voices
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_local && v.language.starts_with(preferred_language))
        .map(|(i, _)| i)
        .collect();

    if let Some(&first) = family.first() {
        for &i in &family {
            let name = voices[i].name.to_lowercase();
            if FEMALE_HINT_TOKENS.iter().any(|t| name.contains(t)) {
                return Some(i);
            }
        }
        return Some(first);
    }

    if voices.is_empty() {
        None
    } else {
        Some(0)
    }
}

/// Find a voice by exact name.
pub fn find_voice(voices: &[VoiceDescriptor], name: &str) -> Option<usize> {
    voices.iter().position(|v| v.name == name)
}

/// Asynchronously loaded voice catalog
///
/// Spawns a loader task that enumerates the engine's voices
/// immediately, then re-enumerates every `scan_interval` until the
/// count stabilizes or `scan_window` elapses. The task is aborted on
/// drop.
pub struct VoiceCatalog {
    rx: watch::Receiver<Vec<VoiceDescriptor>>,
    task: JoinHandle<()>,
}

impl VoiceCatalog {
    pub fn spawn(
        engine: Arc<dyn SpeechEngine>,
        scan_interval: Duration,
        scan_window: Duration,
    ) -> Self {
        let (tx, rx) = watch::channel(Vec::new());

        let task = tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + scan_window;
            let mut last_count: Option<usize> = None;

            loop {
                match engine.list_voices().await {
                    Ok(voices) => {
                        let count = voices.len();
                        tx.send_if_modified(|current| {
                            if *current != voices {
                                *current = voices;
                                true
                            } else {
                                false
                            }
                        });

                        if count > 0 && last_count == Some(count) {
                            debug!("Voice catalog stabilized at {count} voices");
                            break;
                        }
                        last_count = Some(count);
                    }
                    Err(e) => warn!("Voice enumeration failed: {e}"),
                }

                if tokio::time::Instant::now() >= deadline {
                    debug!("Voice catalog scan window elapsed");
                    break;
                }
                tokio::time::sleep(scan_interval).await;
            }
        });

        Self { rx, task }
    }

    /// Current catalog snapshot.
    pub fn snapshot(&self) -> Vec<VoiceDescriptor> {
        self.rx.borrow().clone()
    }

    /// Subscribe to catalog updates.
    pub fn subscribe(&self) -> watch::Receiver<Vec<VoiceDescriptor>> {
        self.rx.clone()
    }

    /// Stop the loader task and close the channel. Also runs on drop.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for VoiceCatalog {
    fn drop(&mut self) {
        self.shutdown();
    }
}
