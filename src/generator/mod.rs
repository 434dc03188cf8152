//! Generation orchestrator: parameters or text in, playable track out.
//!
//! Neural synthesis is tried first when a generator is available; any
//! failure there falls back to procedural synthesis without retrying.

mod prompt;

pub use prompt::{build_synthesis_prompt, energy_word};

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::audio::{AudioPostProcessor, OutputFormat, ProcessingError};
use crate::config::GeneratorConfig;
use crate::history::{GenerationRecord, HistorySink};
use crate::mood::{MoodAnalyzer, MusicalParameters, ParameterError};
pub use crate::synthesis::GenerationMethod;
use crate::synthesis::{
    ExternalGenerator, FallbackSynthesizer, SynthesisBackend, SynthesisError, SynthesisRequest,
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("generation failed: {0}")]
    Processing(#[from] ProcessingError),

    /// The path is for logs only and stays out of the message
    #[error("generation failed: output file unreadable")]
    Unreadable(PathBuf),

    #[error("generation failed: invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
}

/// What to generate from
#[derive(Debug, Clone)]
pub enum GenerationInput {
    /// Pre-computed parameters
    Parameters(MusicalParameters),
    /// Free-text mood description, analyzed first
    Text(String),
}

/// A finished track
#[derive(Debug, Clone)]
pub struct GeneratedTrack {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub method: GenerationMethod,
    pub parameters: MusicalParameters,
    pub prompt: String,
}

/// Summary of the generation setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInfo {
    pub neural_available: bool,
    pub backend_name: String,
    pub sample_rate: u32,
    pub duration_s: f32,
    pub output_format: OutputFormat,
}

type SharedBackend = Arc<dyn SynthesisBackend>;

pub struct MusicGenerator {
    analyzer: Arc<MoodAnalyzer>,
    processor: AudioPostProcessor,
    config: GeneratorConfig,
    neural: OnceLock<Option<SharedBackend>>,
    fallback: FallbackSynthesizer,
    history: Option<Arc<dyn HistorySink>>,
}

impl std::fmt::Debug for MusicGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicGenerator")
            .field("analyzer", &self.analyzer)
            .field("processor", &self.processor)
            .field("neural_detected", &self.neural.get().map(Option::is_some))
            .field("history", &self.history.is_some())
            .finish()
    }
}

impl MusicGenerator {
    pub fn new(
        analyzer: Arc<MoodAnalyzer>,
        processor: AudioPostProcessor,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            analyzer,
            processor,
            config,
            neural: OnceLock::new(),
            fallback: FallbackSynthesizer::new(),
            history: None,
        }
    }

    pub fn with_history(mut self, sink: Arc<dyn HistorySink>) -> Self {
        self.history = Some(sink);
        self
    }

    /// Use `backend` as the neural generator instead of detecting one
    pub fn with_neural_backend(self, backend: SharedBackend) -> Self {
        let _ = self.neural.set(Some(backend));
        self
    }

    pub fn analyzer(&self) -> &MoodAnalyzer {
        &self.analyzer
    }

    pub fn analyzer_handle(&self) -> Arc<MoodAnalyzer> {
        self.analyzer.clone()
    }

    pub fn processor(&self) -> &AudioPostProcessor {
        &self.processor
    }

    /// Neural backend, detected on first use
    fn neural_backend(&self) -> Option<&SharedBackend> {
        self.neural
            .get_or_init(|| {
                ExternalGenerator::detect(&self.config).map(|g| Arc::new(g) as SharedBackend)
            })
            .as_ref()
    }

    pub fn neural_available(&self) -> bool {
        self.neural_backend().is_some()
    }

    pub fn generation_info(&self) -> GenerationInfo {
        let audio = self.processor.config();
        let backend_name = self
            .neural_backend()
            .map(|b| b.name().to_string())
            .unwrap_or_else(|| self.fallback.name().to_string());

        GenerationInfo {
            neural_available: self.neural_available(),
            backend_name,
            sample_rate: audio.sample_rate,
            duration_s: audio.duration_s,
            output_format: self.processor.preferred_format(),
        }
    }

    /// Render one track from parameters or a mood description.
    ///
    /// Neural synthesis is tried first when available; any failure there is
    /// logged and the procedural synthesizer renders instead. The finished
    /// file is recorded in history when a sink is attached.
    ///
    /// # Arguments
    ///
    /// * `input` - Pre-computed parameters (validated first) or free text
    ///
    /// # Returns
    ///
    /// The track's bytes, MIME type, path and the method that produced it.
    /// Errors only when no readable file could be produced at all, or when
    /// supplied parameters break their range invariants.
    pub fn generate(&self, input: GenerationInput) -> Result<GeneratedTrack, GenerationError> {
        let parameters = match input {
            GenerationInput::Parameters(params) => {
                params.validate()?;
                params
            }
            GenerationInput::Text(text) => self.analyzer.analyze(&text),
        };

        let prompt = build_synthesis_prompt(&parameters);
        info!(prompt = %prompt, mood = %parameters.mood_category, "Generating music");

        let audio = self.processor.config();
        let request = SynthesisRequest {
            prompt: prompt.clone(),
            params: parameters.clone(),
            duration_s: audio.duration_s,
            sample_rate: audio.sample_rate,
        };

        let (path, method) = match self.neural_backend() {
            Some(backend) => match self.render(backend.as_ref(), &request) {
                Ok(path) => (path, backend.method()),
                Err(e) => {
                    warn!(backend = backend.name(), error = %e, "Neural generation failed, using fallback");
                    (self.render(&self.fallback, &request)?, self.fallback.method())
                }
            },
            None => (self.render(&self.fallback, &request)?, self.fallback.method()),
        };

        let Some((bytes, mime_type)) = read_audio(&path) else {
            error!(path = %path.display(), "Generated file is not readable");
            return Err(GenerationError::Unreadable(path));
        };

        if let Some(history) = &self.history {
            history.record(GenerationRecord::new(&parameters, &path, method));
        }

        info!(path = %path.display(), %method, bytes = bytes.len(), "Generation complete");

        Ok(GeneratedTrack {
            path,
            bytes,
            mime_type,
            method,
            parameters,
            prompt,
        })
    }

    fn render(
        &self,
        backend: &dyn SynthesisBackend,
        request: &SynthesisRequest,
    ) -> Result<PathBuf, GenerationError> {
        debug!(backend = backend.name(), "Synthesizing");
        let buffer = backend.synthesize(request)?;
        Ok(self.processor.process(buffer, &request.params)?)
    }
}

/// MIME type by file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("mp3") => "audio/mp3",
        Some("wav") => "audio/wav",
        _ => "audio/mpeg",
    }
}

/// File contents and MIME type, or `None` if the file cannot be read
pub fn read_audio(path: &Path) -> Option<(Vec<u8>, &'static str)> {
    match std::fs::read(path) {
        Ok(bytes) => Some((bytes, mime_type_for(path))),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Audio file not readable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RawAudioBuffer;
    use crate::config::AudioConfig;
    use crate::history::RecentHistory;
    use crate::mood::MoodCategory;

    struct FailingBackend;

    impl SynthesisBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        fn method(&self) -> GenerationMethod {
            GenerationMethod::Neural
        }

        fn synthesize(&self, _request: &SynthesisRequest) -> Result<RawAudioBuffer, SynthesisError> {
            Err(SynthesisError::Failed("out of memory".to_string()))
        }
    }

    /// Returns a batched stereo buffer twice as long as requested
    struct StereoBackend;

    impl SynthesisBackend for StereoBackend {
        fn name(&self) -> &str {
            "stereo"
        }

        fn method(&self) -> GenerationMethod {
            GenerationMethod::Neural
        }

        fn synthesize(&self, request: &SynthesisRequest) -> Result<RawAudioBuffer, SynthesisError> {
            let frames = (request.sample_rate as f32 * request.duration_s * 2.0) as usize;
            let samples = ndarray::Array3::from_elem((1, 2, frames), 0.25f32);
            Ok(RawAudioBuffer::new(samples.into_dyn(), request.sample_rate))
        }
    }

    fn generator(dir: &Path) -> MusicGenerator {
        let audio = AudioConfig {
            sample_rate: 8_000,
            duration_s: 0.25,
            temp_dir: dir.to_path_buf(),
            encoder_command: "/nonexistent/ffmpeg".to_string(),
            ..AudioConfig::default()
        };
        let processor = AudioPostProcessor::new(audio).unwrap();
        MusicGenerator::new(
            Arc::new(MoodAnalyzer::builtin()),
            processor,
            GeneratorConfig::default(),
        )
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for(Path::new("a.mp3")), "audio/mp3");
        assert_eq!(mime_type_for(Path::new("a.wav")), "audio/wav");
        assert_eq!(mime_type_for(Path::new("a.ogg")), "audio/mpeg");
        assert_eq!(mime_type_for(Path::new("noext")), "audio/mpeg");
    }

    #[test]
    fn test_read_audio_missing_file() {
        assert!(read_audio(Path::new("/nonexistent/track.mp3")).is_none());
    }

    #[test]
    fn test_fallback_generation_from_text() {
        let tmp = tempfile::tempdir().unwrap();
        let history = Arc::new(RecentHistory::new(5));
        let generator = generator(tmp.path()).with_history(history.clone());

        let track = generator
            .generate(GenerationInput::Text("I need calm music for studying".to_string()))
            .unwrap();

        assert_eq!(track.method, GenerationMethod::Fallback);
        assert_eq!(track.mime_type, "audio/wav");
        assert_eq!(track.parameters.mood_category, MoodCategory::Calm);
        assert!(track.path.exists());
        assert!(track.bytes.starts_with(b"RIFF"));

        let records = history.recent(10);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mood_input, "I need calm music for studying");
    }

    #[test]
    fn test_neural_failure_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = generator(tmp.path()).with_neural_backend(Arc::new(FailingBackend));
        assert!(generator.neural_available());

        let track = generator
            .generate(GenerationInput::Parameters(MusicalParameters::default()))
            .unwrap();
        assert_eq!(track.method, GenerationMethod::Fallback);
    }

    #[test]
    fn test_neural_output_is_trimmed() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = generator(tmp.path()).with_neural_backend(Arc::new(StereoBackend));

        let track = generator
            .generate(GenerationInput::Parameters(MusicalParameters::default()))
            .unwrap();
        assert_eq!(track.method, GenerationMethod::Neural);

        let (samples, _) = crate::audio::read_wav(&track.path).unwrap();
        assert_eq!(samples.dim(), (2, 2_000));
    }

    #[test]
    fn test_generation_info_without_neural() {
        let tmp = tempfile::tempdir().unwrap();
        let info = generator(tmp.path()).generation_info();
        assert!(!info.neural_available);
        assert_eq!(info.backend_name, "fallback-synth");
        assert_eq!(info.sample_rate, 8_000);
        assert_eq!(info.output_format, OutputFormat::Wav);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let history = Arc::new(RecentHistory::new(5));
        let generator = generator(tmp.path()).with_history(history.clone());

        let mut params = MusicalParameters::default();
        params.energy_level = 250;
        params.tempo = 999;
        params.instruments.clear();

        let err = generator
            .generate(GenerationInput::Parameters(params))
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidParameters(ParameterError::Energy(250))
        ));
        assert!(history.is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unreadable_message_has_no_path() {
        let err = GenerationError::Unreadable(PathBuf::from("/srv/moodwave/tmp/calm_x.wav"));
        let message = err.to_string();
        assert_eq!(message, "generation failed: output file unreadable");
        assert!(!message.contains("/srv"));
    }

    #[test]
    fn test_unwritable_temp_dir_is_generation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = generator(tmp.path());
        std::fs::remove_dir_all(tmp.path()).unwrap();

        let err = generator
            .generate(GenerationInput::Parameters(MusicalParameters::default()))
            .unwrap_err();
        assert!(err.to_string().starts_with("generation failed"));
    }
}
