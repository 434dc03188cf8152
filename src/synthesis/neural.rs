//! Out-of-process neural music generator.
//!
//! The configured executable is called as
//! `<cmd> --prompt <p> --duration <s> --sample-rate <hz> --output <wav>`
//! and must write a WAV file to the given path before exiting successfully.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::{GenerationMethod, SynthesisBackend, SynthesisError, SynthesisRequest};
use crate::audio::{self, RawAudioBuffer};
use crate::config::GeneratorConfig;

#[derive(Debug, Clone)]
pub struct ExternalGenerator {
    command: PathBuf,
    name: String,
}

impl ExternalGenerator {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        let command = command.into();
        let name = command
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| command.display().to_string());
        Self { command, name }
    }

    /// The generator if one is configured and its executable exists
    pub fn detect(config: &GeneratorConfig) -> Option<Self> {
        let Some(command) = &config.neural_command else {
            info!("No neural generator configured, using fallback synthesis");
            return None;
        };

        if command.exists() {
            info!(command = %command.display(), "Neural generator available");
            Some(Self::new(command))
        } else {
            warn!(command = %command.display(), "Neural generator not found, using fallback synthesis");
            None
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    fn run(&self, request: &SynthesisRequest, output: &Path) -> Result<(), SynthesisError> {
        debug!(command = %self.command.display(), prompt = %request.prompt, "Invoking neural generator");

        let result = Command::new(&self.command)
            .arg("--prompt")
            .arg(&request.prompt)
            .arg("--duration")
            .arg(request.duration_s.to_string())
            .arg("--sample-rate")
            .arg(request.sample_rate.to_string())
            .arg("--output")
            .arg(output)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(SynthesisError::Spawn)?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(SynthesisError::Failed(format!(
                "exit code {:?}: {}",
                result.status.code(),
                stderr.trim()
            )));
        }

        Ok(())
    }
}

impl SynthesisBackend for ExternalGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn method(&self) -> GenerationMethod {
        GenerationMethod::Neural
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<RawAudioBuffer, SynthesisError> {
        let output = tempfile::Builder::new()
            .prefix("moodwave_gen_")
            .suffix(".wav")
            .tempfile()
            .map_err(SynthesisError::Spawn)?;

        self.run(request, output.path())?;

        let (samples, rate) = audio::read_wav(output.path())
            .map_err(|e| SynthesisError::InvalidOutput(e.to_string()))?;

        if samples.is_empty() {
            return Err(SynthesisError::InvalidOutput(
                "generator wrote no samples".to_string(),
            ));
        }

        let samples = if rate != request.sample_rate {
            debug!(from = rate, to = request.sample_rate, "Resampling generator output");
            audio::resample(&samples, rate, request.sample_rate)?
        } else {
            samples
        };

        let (channels, frames) = samples.dim();
        info!(channels, frames, "Neural generation complete");

        // [1, channels, frames], the layout of batched model output
        Ok(RawAudioBuffer::new(
            samples.insert_axis(ndarray::Axis(0)).into_dyn(),
            request.sample_rate,
        ))
    }
}
