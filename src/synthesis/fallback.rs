//! Procedural chord synthesizer used when no neural generator is available.

use std::f32::consts::TAU;

use tracing::debug;

use super::{GenerationMethod, SynthesisBackend, SynthesisError, SynthesisRequest};
use crate::audio::RawAudioBuffer;
use crate::mood::tables::{MAX_TEMPO, MIN_TEMPO};
use crate::mood::{MusicalKey, MusicalParameters};

/// C major triad (C4, E4, G4)
pub const MAJOR_TRIAD: [f32; 3] = [261.63, 329.63, 392.00];

/// C minor triad (C4, Eb4, G4)
pub const MINOR_TRIAD: [f32; 3] = [261.63, 311.13, 392.00];

/// Per-voice amplitude
const VOICE_GAIN: f32 = 0.2;

/// Exponential decay rate of each note, per second
const DECAY_RATE: f32 = 2.0;

/// Repeats a decaying triad every eighth note for the whole duration.
#[derive(Debug, Default, Clone)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Render exactly `sample_rate * duration_s` mono samples.
    pub fn render(params: &MusicalParameters, sample_rate: u32, duration_s: f32) -> RawAudioBuffer {
        let tempo = params.tempo.clamp(MIN_TEMPO, MAX_TEMPO) as f32;
        let note_s = (60.0 / tempo) / 2.0;
        let note_samples = ((sample_rate as f32 * note_s) as usize).max(1);
        let total = (sample_rate as f32 * duration_s.max(0.0)) as usize;

        let triad = match params.key {
            MusicalKey::Major => MAJOR_TRIAD,
            MusicalKey::Minor => MINOR_TRIAD,
        };

        let rate = sample_rate.max(1) as f32;
        let samples: Vec<f32> = (0..total)
            .map(|k| {
                let t = (k % note_samples) as f32 / rate;
                let envelope = (-DECAY_RATE * t).exp();
                triad
                    .iter()
                    .map(|freq| (TAU * freq * t).sin() * VOICE_GAIN)
                    .sum::<f32>()
                    * envelope
            })
            .collect();

        debug!(tempo, note_samples, total, key = %params.key, "Rendered fallback chords");
        RawAudioBuffer::mono(samples, sample_rate)
    }
}

impl SynthesisBackend for FallbackSynthesizer {
    fn name(&self) -> &str {
        "fallback-synth"
    }

    fn method(&self) -> GenerationMethod {
        GenerationMethod::Fallback
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<RawAudioBuffer, SynthesisError> {
        Ok(Self::render(
            &request.params,
            request.sample_rate,
            request.duration_s,
        ))
    }
}
