//! Basic narration example

use kora_narration::{NarrationConfig, NarrationController, SimulatedEngine};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // The simulated engine "plays" silently; swap in NativeEngine for
    // audible narration
    let engine = Arc::new(SimulatedEngine::new());
    let controller = NarrationController::new(engine, NarrationConfig::default())?;

    println!("Narrating...");
    controller.speak("Welcome to Rumtek Monastery, the Dharma Chakra Centre.");

    // Watch the polled status until the narration completes
    let mut status = controller.watch_status();
    loop {
        status.changed().await?;
        let current = *status.borrow();
        println!("playing={} paused={}", current.is_playing, current.is_paused);
        if current.idle() {
            break;
        }
        // Demonstrate pause/resume mid-narration
        controller.pause();
        tokio::time::sleep(Duration::from_millis(200)).await;
        controller.resume();
    }

    println!("Done");
    Ok(())
}
