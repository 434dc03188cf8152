//! moodwave
//!
//! Turns free-text mood descriptions ("I need calm music for studying")
//! into structured musical parameters and renders them to audio, either
//! through an external neural generator or a built-in procedural
//! synthesizer. Served over a small MessagePack HTTP API.

pub mod audio;
pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod inference;
pub mod math;
pub mod mood;
pub mod server;
pub mod synthesis;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, Result};

pub use generator::{GeneratedTrack, GenerationInput, MusicGenerator};
pub use mood::{MoodAnalyzer, MoodCategory, MusicalParameters};
pub use synthesis::GenerationMethod;
