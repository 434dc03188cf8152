//! Audio synthesis backends.
//!
//! [`ExternalGenerator`] drives an optional neural model out of process;
//! [`FallbackSynthesizer`] renders procedural chords and always succeeds.

mod fallback;
mod neural;

pub use fallback::{FallbackSynthesizer, MAJOR_TRIAD, MINOR_TRIAD};
pub use neural::ExternalGenerator;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::audio::{ProcessingError, RawAudioBuffer};
use crate::mood::MusicalParameters;

/// Which backend produced a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMethod {
    Neural,
    Fallback,
}

impl GenerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neural => "neural",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for GenerationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to a synthesis backend
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub prompt: String,
    pub params: MusicalParameters,
    pub duration_s: f32,
    pub sample_rate: u32,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Failed to run generator: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Generator failed: {0}")]
    Failed(String),

    #[error("Invalid generator output: {0}")]
    InvalidOutput(String),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

pub trait SynthesisBackend: Send + Sync {
    fn name(&self) -> &str;

    fn method(&self) -> GenerationMethod;

    fn synthesize(&self, request: &SynthesisRequest) -> Result<RawAudioBuffer, SynthesisError>;
}
