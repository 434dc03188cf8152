//! Musical parameter record and its categorical building blocks.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::tables;

/// The six mood categories, in ranking order.
///
/// Declaration order is significant: similarity ties resolve to the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Sad,
    Calm,
    Energetic,
    Mysterious,
    Romantic,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 6] = [
        MoodCategory::Happy,
        MoodCategory::Sad,
        MoodCategory::Calm,
        MoodCategory::Energetic,
        MoodCategory::Mysterious,
        MoodCategory::Romantic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Calm => "calm",
            Self::Energetic => "energetic",
            Self::Mysterious => "mysterious",
            Self::Romantic => "romantic",
        }
    }

    /// Axis index in embedding space used by the lexicon embedder
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn profile(&self) -> &'static tables::MoodProfile {
        tables::profile(*self)
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Map a classifier label onto a sentiment bucket.
    ///
    /// Ordinal labels (`LABEL_0..2`) and named labels are both accepted.
    /// Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "label_0" | "negative" | "neg" => Some(Self::Negative),
            "label_1" | "neutral" | "neu" => Some(Self::Neutral),
            "label_2" | "positive" | "pos" => Some(Self::Positive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicalKey {
    Major,
    Minor,
}

impl MusicalKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
        }
    }
}

impl fmt::Display for MusicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreStyle {
    ElectronicDance,
    Rock,
    Pop,
    Ambient,
    Classical,
    Folk,
    Blues,
    Indie,
    PopDance,
    AcousticPop,
    Cinematic,
    Ballad,
    Contemporary,
}

impl GenreStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ElectronicDance => "electronic_dance",
            Self::Rock => "rock",
            Self::Pop => "pop",
            Self::Ambient => "ambient",
            Self::Classical => "classical",
            Self::Folk => "folk",
            Self::Blues => "blues",
            Self::Indie => "indie",
            Self::PopDance => "pop_dance",
            Self::AcousticPop => "acoustic_pop",
            Self::Cinematic => "cinematic",
            Self::Ballad => "ballad",
            Self::Contemporary => "contemporary",
        }
    }
}

impl fmt::Display for GenreStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loudness marking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dynamics {
    Pp,
    P,
    Mp,
    Mf,
    F,
}

impl Dynamics {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pp => "pp",
            Self::P => "p",
            Self::Mp => "mp",
            Self::Mf => "mf",
            Self::F => "f",
        }
    }
}

impl fmt::Display for Dynamics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Texture {
    Monophonic,
    Homophonic,
    Polyphonic,
}

impl Texture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monophonic => "monophonic",
            Self::Homophonic => "homophonic",
            Self::Polyphonic => "polyphonic",
        }
    }
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the generator needs to render a track, derived from one mood description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicalParameters {
    pub mood_category: MoodCategory,
    /// 1..=10
    pub energy_level: u8,
    pub sentiment: Sentiment,
    /// 0.0..=1.0, rounded to 3 decimals
    pub sentiment_confidence: f32,

    /// BPM, 60..=180
    pub tempo: u16,
    pub key: MusicalKey,
    pub instruments: Vec<String>,
    pub time_signature: String,

    pub genre_style: GenreStyle,
    pub dynamics: Dynamics,
    pub texture: Texture,

    /// Natural-language hint for generation models
    pub text_prompt: String,
    pub original_input: String,
}

/// A parameter record that breaks one of its range invariants
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("energy_level {0} outside {min}..={max}", min = tables::MIN_ENERGY, max = tables::MAX_ENERGY)]
    Energy(u8),

    #[error("tempo {0} outside {min}..={max} BPM", min = tables::MIN_TEMPO, max = tables::MAX_TEMPO)]
    Tempo(u16),

    #[error("instrument list is empty")]
    NoInstruments,

    #[error("sentiment_confidence {0} outside 0..=1")]
    Confidence(f32),
}

impl MusicalParameters {
    /// Check the range invariants every analyzed record satisfies.
    ///
    /// Records built by [`MoodAnalyzer`](super::MoodAnalyzer) always pass;
    /// this exists for records that arrive from outside, e.g. over HTTP.
    ///
    /// # Returns
    ///
    /// The first violated invariant, checked in field order.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use moodwave::mood::{MusicalParameters, ParameterError};
    ///
    /// let mut params = MusicalParameters::default();
    /// assert!(params.validate().is_ok());
    ///
    /// params.tempo = 999;
    /// assert_eq!(params.validate(), Err(ParameterError::Tempo(999)));
    /// ```
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(tables::MIN_ENERGY..=tables::MAX_ENERGY).contains(&self.energy_level) {
            return Err(ParameterError::Energy(self.energy_level));
        }
        if !(0.0..=1.0).contains(&self.sentiment_confidence) {
            return Err(ParameterError::Confidence(self.sentiment_confidence));
        }
        if !(tables::MIN_TEMPO..=tables::MAX_TEMPO).contains(&self.tempo) {
            return Err(ParameterError::Tempo(self.tempo));
        }
        if self.instruments.iter().all(|i| i.trim().is_empty()) {
            return Err(ParameterError::NoInstruments);
        }
        Ok(())
    }

    /// The fixed record returned whenever analysis cannot run.
    pub fn fallback(original_input: impl Into<String>) -> Self {
        Self {
            mood_category: MoodCategory::Calm,
            energy_level: 5,
            sentiment: Sentiment::Neutral,
            sentiment_confidence: 0.5,
            tempo: 120,
            key: MusicalKey::Major,
            instruments: vec!["piano".to_string(), "strings".to_string()],
            time_signature: tables::TIME_SIGNATURE.to_string(),
            genre_style: GenreStyle::Contemporary,
            dynamics: Dynamics::Mp,
            texture: Texture::Homophonic,
            text_prompt: "moderate peaceful music in major key".to_string(),
            original_input: original_input.into(),
        }
    }
}

impl Default for MusicalParameters {
    fn default() -> Self {
        Self::fallback("default")
    }
}
