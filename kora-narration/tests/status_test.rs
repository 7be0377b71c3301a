//! Tests for the playback state poller

use kora_narration::engines::simulated::SimulatedEngine;
use kora_narration::engines::{SpeechEngine, Utterance};
use kora_narration::{PlaybackStatus, StatusPoller};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::timeout;

async fn wait_for(
    rx: &mut watch::Receiver<PlaybackStatus>,
    pred: impl Fn(PlaybackStatus) -> bool,
) {
    timeout(Duration::from_secs(30), async {
        loop {
            if pred(*rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.expect("status channel closed");
        }
    })
    .await
    .expect("polled status condition not reached");
}

#[tokio::test(start_paused = true)]
async fn test_poller_starts_idle() {
    let engine = Arc::new(SimulatedEngine::new());
    let poller = StatusPoller::spawn(Arc::clone(&engine) as Arc<_>, Duration::from_millis(100));

    assert_eq!(poller.current(), PlaybackStatus::default());
    assert!(poller.current().idle());
}

#[tokio::test(start_paused = true)]
async fn test_poller_tracks_engine_transitions() {
    let engine = Arc::new(SimulatedEngine::with_timing(50));
    let poller = StatusPoller::spawn(Arc::clone(&engine) as Arc<_>, Duration::from_millis(100));
    let mut rx = poller.subscribe();

    engine
        .speak(Utterance::new("a narration to observe"))
        .unwrap();
    wait_for(&mut rx, |s| s.is_playing).await;

    engine.pause();
    wait_for(&mut rx, |s| s.is_playing && s.is_paused).await;

    engine.resume();
    wait_for(&mut rx, |s| s.is_playing && !s.is_paused).await;

    // Natural completion lands back at idle
    wait_for(&mut rx, |s| s.idle()).await;
    assert!(!engine.is_speaking());
}

#[tokio::test(start_paused = true)]
async fn test_poller_observes_cancel() {
    let engine = Arc::new(SimulatedEngine::with_timing(50));
    let poller = StatusPoller::spawn(Arc::clone(&engine) as Arc<_>, Duration::from_millis(100));
    let mut rx = poller.subscribe();

    engine
        .speak(Utterance::new("this narration gets cancelled"))
        .unwrap();
    wait_for(&mut rx, |s| s.is_playing).await;

    engine.cancel();
    wait_for(&mut rx, |s| s.idle()).await;
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_outlives_nothing_after_drop() {
    let engine = Arc::new(SimulatedEngine::new());
    let poller = StatusPoller::spawn(Arc::clone(&engine) as Arc<_>, Duration::from_millis(100));
    let mut rx = poller.subscribe();
    drop(poller);

    // The sampling task is aborted with its poller; the channel closes
    // rather than delivering further samples
    engine.speak(Utterance::new("unobserved")).unwrap();
    let closed = timeout(Duration::from_secs(5), async {
        loop {
            if rx.changed().await.is_err() {
                return true;
            }
        }
    })
    .await
    .unwrap_or(false);
    assert!(closed);
}
