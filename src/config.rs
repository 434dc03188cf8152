use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
///
/// All settings can be configured via environment variables with the `MOODWAVE_` prefix.
/// For example: `MOODWAVE_SERVER__PORT=8097`, `MOODWAVE_AUDIO__DURATION_S=15`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Sentiment / embedding model configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Audio rendering and post-processing configuration
    #[serde(default)]
    pub audio: AudioConfig,

    /// Synthesis backend and history configuration
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Directory holding `model.onnx` + `vocab.txt` for sentiment classification
    #[serde(default)]
    pub sentiment_model_dir: Option<PathBuf>,

    /// Directory holding `model.onnx` + `vocab.txt` for sentence embeddings
    #[serde(default)]
    pub embedding_model_dir: Option<PathBuf>,

    /// Enable CUDA acceleration
    #[serde(default)]
    pub enable_cuda: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Target (and maximum) duration of a generated track in seconds
    #[serde(default = "default_duration")]
    pub duration_s: f32,

    /// Gain applied after peak normalization
    #[serde(default = "default_volume_factor")]
    pub volume_factor: f32,

    /// Peak-normalize raw synthesis output before enhancement
    #[serde(default = "default_true")]
    pub normalization_enabled: bool,

    /// Directory for rendered audio files
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Maximum number of rendered files kept in `temp_dir`
    #[serde(default = "default_max_temp_files")]
    pub max_temp_files: usize,

    /// MP3 bitrate in kbps
    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    /// Executable used for MP3 encoding
    #[serde(default = "default_encoder_command")]
    pub encoder_command: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            duration_s: default_duration(),
            volume_factor: default_volume_factor(),
            normalization_enabled: default_true(),
            temp_dir: default_temp_dir(),
            max_temp_files: default_max_temp_files(),
            bitrate_kbps: default_bitrate(),
            encoder_command: default_encoder_command(),
        }
    }
}

impl AudioConfig {
    /// Frame cap for a track rendered at `sample_rate`.
    ///
    /// Buffers from an external generator may arrive at a rate other than
    /// [`AudioConfig::sample_rate`], so the rate is passed explicitly.
    pub fn max_frames(&self, sample_rate: u32) -> usize {
        (sample_rate as f32 * self.duration_s) as usize
    }
}

fn default_sample_rate() -> u32 {
    32_000
}

fn default_duration() -> f32 {
    30.0
}

fn default_volume_factor() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

fn default_temp_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "moodwave", "moodwave") {
        proj_dirs.cache_dir().join("temp_audio")
    } else {
        PathBuf::from("./temp_audio")
    }
}

fn default_max_temp_files() -> usize {
    10
}

fn default_bitrate() -> u32 {
    192
}

fn default_encoder_command() -> String {
    "ffmpeg".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// External neural generator executable. Fallback synthesis is used when unset or missing.
    #[serde(default)]
    pub neural_command: Option<PathBuf>,

    /// Number of generation records kept in memory
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            neural_command: None,
            history_capacity: default_history_capacity(),
        }
    }
}

fn default_history_capacity() -> usize {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8097
}

impl ServerConfig {
    /// Returns the socket address for binding the server
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables should be prefixed with `MOODWAVE_` and use
    /// double underscores for nested values:
    /// - `MOODWAVE_AUDIO__SAMPLE_RATE` -> audio.sample_rate
    /// - `MOODWAVE_AUDIO__MAX_TEMP_FILES` -> audio.max_temp_files
    /// - `MOODWAVE_GENERATOR__NEURAL_COMMAND` -> generator.neural_command
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("MOODWAVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
