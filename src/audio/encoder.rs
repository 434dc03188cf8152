//! MP3 encoding through an external ffmpeg-compatible command.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use tracing::{debug, info};

use super::ProcessingError;

#[derive(Debug)]
pub struct Mp3Encoder {
    command: String,
    bitrate_kbps: u32,
    available: OnceLock<bool>,
}

impl Mp3Encoder {
    pub fn new(command: impl Into<String>, bitrate_kbps: u32) -> Self {
        Self {
            command: command.into(),
            bitrate_kbps,
            available: OnceLock::new(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the encoder command runs. Checked once.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            let ok = Command::new(&self.command)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            info!(command = %self.command, available = ok, "MP3 encoder check");
            ok
        })
    }

    /// Encode `wav` into `mp3`, capping output at `max_duration_s`.
    pub fn encode(&self, wav: &Path, mp3: &Path, max_duration_s: f32) -> Result<(), ProcessingError> {
        debug!(input = %wav.display(), output = %mp3.display(), "Encoding MP3");

        let output = Command::new(&self.command)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(wav)
            .args(["-t", &format!("{max_duration_s:.3}")])
            .args(["-codec:a", "libmp3lame", "-b:a", &format!("{}k", self.bitrate_kbps)])
            .arg(mp3)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ProcessingError::EncoderUnavailable(self.command.clone()),
                _ => ProcessingError::Io(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProcessingError::EncoderFailed(format!(
                "exit code {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}
