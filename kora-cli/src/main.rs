// Kora Command Line Interface
// Narration playback and script composition for heritage-site audio guides

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kora_narration::script::{self, Site, SiteNarration};
use kora_narration::{
    EngineKind, NarrationConfig, NarrationController, NativeEngine, SimulatedEngine, SpeechEngine,
};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "kora")]
#[command(about = "Kora narration engine - spoken audio guides for heritage sites", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Use the simulated engine instead of the platform one
    #[arg(long, global = true)]
    simulated: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Speak text or a composed site narration
    Speak {
        /// Text to narrate; omit when using --script/--site
        text: Option<String>,

        /// Narration script file (JSON)
        #[arg(long)]
        script: Option<PathBuf>,

        /// Site id to narrate from the script
        #[arg(long)]
        site: Option<String>,

        /// Narration style
        #[arg(long, value_enum, default_value_t = Style::Full)]
        style: Style,

        /// Speed multiplier (0.1-2.0)
        #[arg(long)]
        speed: Option<f32>,

        /// Volume (0.0-1.0)
        #[arg(long)]
        volume: Option<f32>,

        /// Pitch multiplier (0.1-2.0)
        #[arg(long)]
        pitch: Option<f32>,

        /// Voice index from `kora voices`
        #[arg(long)]
        voice: Option<usize>,
    },

    /// List the voices the engine knows about
    Voices {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compose a site narration and print it without speaking
    Compose {
        /// Narration script file (JSON)
        #[arg(long)]
        script: PathBuf,

        /// Site id to compose
        #[arg(long)]
        site: String,

        /// Narration style
        #[arg(long, value_enum, default_value_t = Style::Full)]
        style: Style,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum Style {
    /// All narration fragments in order
    Full,
    /// Introduction, description, and location
    Short,
    /// One-line map marker blurb
    Marker,
}

/// On-disk narration script: sites plus their narration fragments
#[derive(Deserialize)]
struct ScriptFile {
    sites: Vec<Site>,
    #[serde(default)]
    narrations: Vec<SiteNarration>,
}

impl ScriptFile {
    fn load(path: &PathBuf) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse script file {}", path.display()))
    }

    fn compose(&self, site_id: &str, style: Style) -> Result<String> {
        let site = self
            .sites
            .iter()
            .find(|s| s.id == site_id)
            .with_context(|| format!("Site '{site_id}' not found in script"))?;
        let narration = self.narrations.iter().find(|n| n.id == site_id);

        Ok(match style {
            Style::Full => script::full_narration(site, narration),
            Style::Short => script::short_narration(site, narration),
            Style::Marker => script::marker_narration(site, narration),
        })
    }
}

fn load_config(cli: &Cli) -> Result<NarrationConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => NarrationConfig::default(),
    };

    if cli.simulated {
        config.engine = EngineKind::Simulated;
    }
    Ok(config)
}

fn build_engine(config: &NarrationConfig) -> Arc<dyn SpeechEngine> {
    match config.engine {
        EngineKind::Native => Arc::new(NativeEngine::new()),
        EngineKind::Simulated => Arc::new(SimulatedEngine::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Speak {
            text,
            script,
            site,
            style,
            speed,
            volume,
            pitch,
            voice,
        } => {
            let narration = match (text, script, site) {
                (Some(text), None, None) => text.clone(),
                (None, Some(script), Some(site)) => {
                    ScriptFile::load(script)?.compose(site, *style)?
                }
                _ => bail!("Provide either TEXT, or both --script and --site"),
            };

            let engine = build_engine(&config);
            let controller = NarrationController::new(engine, config)?;
            if !controller.is_supported() {
                bail!("Speech is not supported on this system");
            }

            if let Some(v) = speed {
                controller.set_speed(*v);
            }
            if let Some(v) = volume {
                controller.set_volume(*v);
            }
            if let Some(v) = pitch {
                controller.set_pitch(*v);
            }
            if let Some(index) = voice {
                // Give the catalog loader a chance to populate first
                let mut voices = controller.watch_voices();
                if voices.borrow_and_update().is_empty() {
                    let _ = voices.changed().await;
                }
                controller.set_voice(*index);
            }

            info!(engine = controller.engine_name(), "Speaking narration");
            controller.speak(&narration);

            let mut status = controller.watch_status();
            let spoken = async {
                // Wait briefly for playback to start, then until it
                // finishes; very short narrations can complete between
                // two samples
                let _ = tokio::time::timeout(std::time::Duration::from_secs(2), async {
                    while !status.borrow_and_update().is_playing {
                        if status.changed().await.is_err() {
                            break;
                        }
                    }
                })
                .await;
                while !status.borrow_and_update().idle() {
                    if status.changed().await.is_err() {
                        break;
                    }
                }
            };

            tokio::select! {
                _ = spoken => {}
                _ = tokio::signal::ctrl_c() => {
                    controller.stop();
                    println!("Stopped");
                }
            }
        }

        Commands::Voices { json } => {
            let engine = build_engine(&config);
            let controller = NarrationController::new(engine, config)?;

            // Let the loader finish its bounded scan before reporting
            let mut voices = controller.watch_voices();
            if voices.borrow_and_update().is_empty() {
                let _ = voices.changed().await;
            }
            let catalog = controller.voices();

            if *json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else if catalog.is_empty() {
                println!("No voices available");
            } else {
                let current = controller.current_voice();
                for (i, voice) in catalog.iter().enumerate() {
                    let marker = if current.as_ref() == Some(voice) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{marker} {i:3}  {:<40} {}", voice.name, voice.language);
                }
            }
        }

        Commands::Compose {
            script,
            site,
            style,
        } => {
            let text = ScriptFile::load(script)?.compose(site, *style)?;
            println!("{text}");
        }
    }

    Ok(())
}
