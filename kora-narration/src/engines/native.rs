//! Native platform speech engine
//!
//! Drives the platform's command-line speech tool as a child process:
//! `espeak-ng` on Linux, `say` on macOS, PowerShell `System.Speech` on
//! Windows. Pause and resume suspend the child with STOP/CONT signals
//! where the platform supports them.

use crate::engines::{SpeechEngine, Utterance};
use crate::error::NarrationError;
use crate::voices::VoiceDescriptor;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const MAX_TEXT_LENGTH: usize = 100_000;

/// Native speech engine (platform-specific)
pub struct NativeEngine {
    inner: Arc<Inner>,
}

struct Inner {
    available: bool,
    speaking: AtomicBool,
    paused: AtomicBool,
    current: Mutex<Option<ActiveChild>>,
}

struct ActiveChild {
    pid: u32,
    cancelled: Arc<AtomicBool>,
    // Kept so the handle lives as long as the utterance; the watcher
    // exits on its own once the child is reaped.
    _watcher: JoinHandle<()>,
}

impl NativeEngine {
    pub fn new() -> Self {
        let available = platform::probe();
        if available {
            info!("Native speech engine initialized ({})", platform::TOOL);
        } else {
            warn!(
                "Native speech engine not available ({} not found)",
                platform::TOOL
            );
        }

        Self {
            inner: Arc::new(Inner {
                available,
                speaking: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                current: Mutex::new(None),
            }),
        }
    }
}

impl Default for NativeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechEngine for NativeEngine {
    fn speak(&self, utterance: Utterance) -> Result<(), NarrationError> {
        if !self.inner.available {
            return Err(NarrationError::Engine(
                "Native speech engine not available".to_string(),
            ));
        }

        let Utterance {
            text,
            speed,
            pitch,
            volume,
            voice,
            events,
        } = utterance;

        if text.is_empty() {
            return Err(NarrationError::Engine("Text cannot be empty".to_string()));
        }

        if text.len() > MAX_TEXT_LENGTH {
            return Err(NarrationError::Engine(format!(
                "Text too long (max {} bytes)",
                MAX_TEXT_LENGTH
            )));
        }

        // Strip control characters before handing the text to a
        // subprocess
        let sanitized: String = text
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\r')
            .collect();

        self.cancel();

        let mut cmd = platform::speech_command(&sanitized, speed, pitch, volume, voice.as_ref())?;
        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| NarrationError::Engine(format!("Failed to start speech process: {e}")))?;
        let pid = child.id().unwrap_or(0);

        self.inner.speaking.store(true, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let inner = Arc::clone(&self.inner);

        let watcher = tokio::spawn(async move {
            // A cancel that lands before the watcher runs suppresses
            // all events, including start
            if flag.load(Ordering::SeqCst) {
                return;
            }
            events.fire_start();

            let result = child.wait_with_output().await;
            if flag.load(Ordering::SeqCst) {
                return;
            }

            inner.speaking.store(false, Ordering::SeqCst);
            inner.paused.store(false, Ordering::SeqCst);

            match result {
                Ok(output) if output.status.success() => events.fire_end(),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let message = format!(
                        "Speech process exited with {}: {}",
                        output.status,
                        stderr.trim()
                    );
                    warn!("{message}");
                    events.fire_error(&message);
                }
                Err(e) => {
                    let message = format!("Failed to wait on speech process: {e}");
                    warn!("{message}");
                    events.fire_error(&message);
                }
            }
        });

        *self.inner.current.lock() = Some(ActiveChild {
            pid,
            cancelled,
            _watcher: watcher,
        });

        Ok(())
    }

    fn cancel(&self) {
        if let Some(active) = self.inner.current.lock().take() {
            active.cancelled.store(true, Ordering::SeqCst);
            platform::terminate(active.pid);
        }
        self.inner.speaking.store(false, Ordering::SeqCst);
        self.inner.paused.store(false, Ordering::SeqCst);
    }

    fn pause(&self) {
        if !self.inner.speaking.load(Ordering::SeqCst) || self.inner.paused.load(Ordering::SeqCst)
        {
            return;
        }
        let pid = match &*self.inner.current.lock() {
            Some(active) => active.pid,
            None => return,
        };
        if platform::suspend(pid) {
            self.inner.paused.store(true, Ordering::SeqCst);
        }
    }

    fn resume(&self) {
        if !self.inner.paused.load(Ordering::SeqCst) {
            return;
        }
        let pid = match &*self.inner.current.lock() {
            Some(active) => active.pid,
            None => return,
        };
        if platform::resume(pid) {
            self.inner.paused.store(false, Ordering::SeqCst);
        }
    }

    fn is_speaking(&self) -> bool {
        self.inner.speaking.load(Ordering::SeqCst)
    }

    fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::SeqCst)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceDescriptor>, NarrationError> {
        if !self.inner.available {
            return Ok(vec![]);
        }
        platform::list_voices().await
    }

    fn is_available(&self) -> bool {
        self.inner.available
    }

    fn name(&self) -> &str {
        "native"
    }
}

fn sanitize_voice_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_' || *c == '.')
        .take(256)
        .collect()
}

// Platform-specific implementations

#[cfg(unix)]
mod signals {
    pub fn suspend(pid: u32) -> bool {
        send(pid, "-STOP")
    }

    pub fn resume(pid: u32) -> bool {
        send(pid, "-CONT")
    }

    pub fn terminate(pid: u32) {
        let _ = send(pid, "-TERM");
    }

    fn send(pid: u32, signal: &str) -> bool {
        if pid == 0 {
            return false;
        }
        std::process::Command::new("kill")
            .arg(signal)
            .arg(pid.to_string())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use super::*;
    use tokio::process::Command;

    pub const TOOL: &str = "espeak-ng";

    // espeak-ng's default speaking rate
    const BASE_WPM: f32 = 175.0;

    pub fn probe() -> bool {
        std::process::Command::new(TOOL)
            .arg("--version")
            .output()
            .is_ok()
    }

    pub fn speech_command(
        text: &str,
        speed: f32,
        pitch: f32,
        volume: f32,
        voice: Option<&VoiceDescriptor>,
    ) -> Result<Command, NarrationError> {
        let mut cmd = Command::new(TOOL);

        let wpm = (BASE_WPM * speed).round() as u32;
        cmd.arg("-s").arg(wpm.to_string());

        // Amplitude is 0-200, 100 is normal
        let amplitude = ((volume * 200.0).round() as u32).min(200);
        cmd.arg("-a").arg(amplitude.to_string());

        // Pitch is 0-99, 50 is normal
        let espeak_pitch = ((pitch * 50.0).round() as u32).min(99);
        cmd.arg("-p").arg(espeak_pitch.to_string());

        if let Some(v) = voice {
            let token = sanitize_voice_token(&v.language);
            if !token.is_empty() {
                cmd.arg("-v").arg(token);
            }
        }

        cmd.arg(text);
        Ok(cmd)
    }

    pub fn suspend(pid: u32) -> bool {
        signals::suspend(pid)
    }

    pub fn resume(pid: u32) -> bool {
        signals::resume(pid)
    }

    pub fn terminate(pid: u32) {
        signals::terminate(pid)
    }

    pub async fn list_voices() -> Result<Vec<VoiceDescriptor>, NarrationError> {
        let output = Command::new(TOOL)
            .arg("--voices")
            .output()
            .await
            .map_err(|e| NarrationError::Engine(format!("Failed to list voices: {e}")))?;

        if !output.status.success() {
            return Ok(vec![]);
        }

        // Columns: Pty Language Age/Gender VoiceName File Other
        let voices = String::from_utf8_lossy(&output.stdout)
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let language = fields.nth(1)?.to_string();
                let name = fields.nth(1)?.to_string();
                if language.len() > 64 || name.len() > 256 {
                    return None;
                }
                Some(VoiceDescriptor {
                    name,
                    language,
                    is_local: true,
                })
            })
            .take(1000)
            .collect();

        Ok(voices)
    }
}

#[cfg(target_os = "macos")]
mod platform {
    use super::*;
    use tokio::process::Command;

    pub const TOOL: &str = "say";

    const BASE_WPM: f32 = 175.0;

    pub fn probe() -> bool {
        std::process::Command::new(TOOL)
            .arg("-v")
            .arg("?")
            .output()
            .is_ok()
    }

    pub fn speech_command(
        text: &str,
        speed: f32,
        _pitch: f32,
        _volume: f32,
        voice: Option<&VoiceDescriptor>,
    ) -> Result<Command, NarrationError> {
        let mut cmd = Command::new(TOOL);

        let wpm = (BASE_WPM * speed).round() as u32;
        cmd.arg("-r").arg(wpm.to_string());

        // Volume and pitch are not supported by the say command
        if let Some(v) = voice {
            let token = sanitize_voice_token(&v.name);
            if !token.is_empty() {
                cmd.arg("-v").arg(token);
            }
        }

        cmd.arg(text);
        Ok(cmd)
    }

    pub fn suspend(pid: u32) -> bool {
        signals::suspend(pid)
    }

    pub fn resume(pid: u32) -> bool {
        signals::resume(pid)
    }

    pub fn terminate(pid: u32) {
        signals::terminate(pid)
    }

    pub async fn list_voices() -> Result<Vec<VoiceDescriptor>, NarrationError> {
        let output = Command::new(TOOL)
            .arg("-v")
            .arg("?")
            .output()
            .await
            .map_err(|e| NarrationError::Engine(format!("Failed to list voices: {e}")))?;

        if !output.status.success() {
            return Ok(vec![]);
        }

        // Lines look like: "Alex                en_US    # Most people..."
        let voices = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| {
                let head = line.split('#').next().unwrap_or("").trim_end();
                let (name, language) = head.rsplit_once(|c: char| c.is_whitespace())?;
                let name = name.trim();
                if name.is_empty() || name.len() > 256 {
                    return None;
                }
                Some(VoiceDescriptor {
                    name: name.to_string(),
                    language: language.replace('_', "-"),
                    is_local: true,
                })
            })
            .take(1000)
            .collect();

        Ok(voices)
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use super::*;
    use tokio::process::Command;

    pub const TOOL: &str = "powershell";

    pub fn probe() -> bool {
        // System.Speech ships with Windows
        true
    }

    pub fn speech_command(
        text: &str,
        speed: f32,
        _pitch: f32,
        volume: f32,
        voice: Option<&VoiceDescriptor>,
    ) -> Result<Command, NarrationError> {
        // SpeechSynthesizer.Rate is -10..10, 0 is normal
        let rate = (((speed - 1.0) * 10.0).round() as i32).clamp(-10, 10);
        let synth_volume = ((volume * 100.0).round() as u32).min(100);
        // Pitch adjustment would require SSML; not supported here

        let voice_arg = match voice {
            Some(v) => {
                let token = sanitize_voice_token(&v.name);
                if token.is_empty() {
                    String::new()
                } else {
                    format!("$synth.SelectVoice('{}'); ", token.replace('\'', "''"))
                }
            }
            None => String::new(),
        };

        let script = format!(
            "Add-Type -AssemblyName System.Speech; \
             $synth = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
             {}$synth.Rate = {}; $synth.Volume = {}; \
             $synth.Speak('{}'); $synth.Dispose()",
            voice_arg,
            rate,
            synth_volume,
            text.replace('\'', "''")
        );

        let mut cmd = Command::new(TOOL);
        cmd.arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(script);
        Ok(cmd)
    }

    pub fn suspend(_pid: u32) -> bool {
        warn!("Pause is not supported by the Windows speech engine");
        false
    }

    pub fn resume(_pid: u32) -> bool {
        false
    }

    pub fn terminate(pid: u32) {
        if pid == 0 {
            return;
        }
        let _ = std::process::Command::new("taskkill")
            .args(["/PID", &pid.to_string(), "/T", "/F"])
            .status();
    }

    pub async fn list_voices() -> Result<Vec<VoiceDescriptor>, NarrationError> {
        // Windows SAPI default voices
        Ok(vec![
            VoiceDescriptor {
                name: "Microsoft David Desktop".to_string(),
                language: "en-US".to_string(),
                is_local: true,
            },
            VoiceDescriptor {
                name: "Microsoft Zira Desktop".to_string(),
                language: "en-US".to_string(),
                is_local: true,
            },
        ])
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod platform {
    use super::*;
    use tokio::process::Command;

    pub const TOOL: &str = "(none)";

    pub fn probe() -> bool {
        false
    }

    pub fn speech_command(
        _text: &str,
        _speed: f32,
        _pitch: f32,
        _volume: f32,
        _voice: Option<&VoiceDescriptor>,
    ) -> Result<Command, NarrationError> {
        Err(NarrationError::Engine(
            "Native speech is not supported on this platform".to_string(),
        ))
    }

    pub fn suspend(_pid: u32) -> bool {
        false
    }

    pub fn resume(_pid: u32) -> bool {
        false
    }

    pub fn terminate(_pid: u32) {}

    pub async fn list_voices() -> Result<Vec<VoiceDescriptor>, NarrationError> {
        Ok(vec![])
    }
}
