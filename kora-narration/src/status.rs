//! Polling-based playback status
//!
//! Engines do not all deliver start/end events reliably, so displays
//! get their state from a poller that samples the engine on a fixed
//! interval and republishes changes through a watch channel.

use crate::engines::SpeechEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Derived playback state, recomputed by sampling the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub is_paused: bool,
}

impl PlaybackStatus {
    pub fn idle(&self) -> bool {
        !self.is_playing
    }
}

/// Playback state poller
///
/// The task is aborted on drop so no sampling outlives the owner.
pub struct StatusPoller {
    rx: watch::Receiver<PlaybackStatus>,
    task: JoinHandle<()>,
}

impl StatusPoller {
    pub fn spawn(engine: Arc<dyn SpeechEngine>, poll_interval: Duration) -> Self {
        let (tx, rx) = watch::channel(PlaybackStatus::default());

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let status = PlaybackStatus {
                    is_playing: engine.is_speaking(),
                    is_paused: engine.is_paused(),
                };
                tx.send_if_modified(|current| {
                    if *current != status {
                        *current = status;
                        true
                    } else {
                        false
                    }
                });
            }
        });

        Self { rx, task }
    }

    /// Latest sampled status.
    pub fn current(&self) -> PlaybackStatus {
        *self.rx.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackStatus> {
        self.rx.clone()
    }

    /// Stop sampling and close the channel. Also runs on drop.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
