//! Fixed lookup tables for mood analysis.
//!
//! Reference texts feed the text embedder to build one vector per mood;
//! everything else maps (mood, energy) onto musical attributes.

use super::params::{Dynamics, GenreStyle, MoodCategory, Texture};

pub const TIME_SIGNATURE: &str = "4/4";

pub const MIN_TEMPO: u16 = 60;
pub const MAX_TEMPO: u16 = 180;
pub const MIN_ENERGY: u8 = 1;
pub const MAX_ENERGY: u8 = 10;

/// BPM added per energy point above 5 (subtracted below)
pub const TEMPO_PER_ENERGY: i32 = 8;

/// Static description of one mood category
#[derive(Debug, Clone)]
pub struct MoodProfile {
    pub category: MoodCategory,
    /// Display name
    pub name: &'static str,
    /// Descriptive keywords embedded to form the reference vector
    pub reference_text: &'static str,
    pub base_tempo: u16,
    pub instruments: &'static [&'static str],
    /// Phrase used in the analysis text prompt
    pub descriptor: &'static str,
}

// ============================================================================
// Mood profiles
// ============================================================================

pub const MOOD_HAPPY: MoodProfile = MoodProfile {
    category: MoodCategory::Happy,
    name: "Happy",
    reference_text: "joyful cheerful upbeat positive energetic bright excited elated",
    base_tempo: 120,
    instruments: &["piano", "guitar", "drums", "brass"],
    descriptor: "joyful and bright",
};

pub const MOOD_SAD: MoodProfile = MoodProfile {
    category: MoodCategory::Sad,
    name: "Sad",
    reference_text: "melancholy sorrowful depressed gloomy downcast dejected mournful",
    base_tempo: 70,
    instruments: &["piano", "strings", "cello", "violin"],
    descriptor: "melancholic and emotional",
};

pub const MOOD_CALM: MoodProfile = MoodProfile {
    category: MoodCategory::Calm,
    name: "Calm",
    reference_text: "peaceful tranquil serene relaxed meditative quiet soothing restful",
    base_tempo: 80,
    instruments: &["piano", "flute", "soft_strings", "harp"],
    descriptor: "peaceful and serene",
};

pub const MOOD_ENERGETIC: MoodProfile = MoodProfile {
    category: MoodCategory::Energetic,
    name: "Energetic",
    reference_text: "dynamic powerful intense vigorous exciting vibrant lively spirited",
    base_tempo: 140,
    instruments: &["electric_guitar", "drums", "bass", "synth"],
    descriptor: "dynamic and powerful",
};

pub const MOOD_MYSTERIOUS: MoodProfile = MoodProfile {
    category: MoodCategory::Mysterious,
    name: "Mysterious",
    reference_text: "enigmatic dark atmospheric suspenseful eerie cryptic shadowy unknown",
    base_tempo: 90,
    instruments: &["synth", "dark_strings", "ambient_pad", "low_brass"],
    descriptor: "dark and atmospheric",
};

pub const MOOD_ROMANTIC: MoodProfile = MoodProfile {
    category: MoodCategory::Romantic,
    name: "Romantic",
    reference_text: "loving tender passionate intimate gentle warm affectionate devoted",
    base_tempo: 85,
    instruments: &["piano", "violin", "soft_guitar", "strings"],
    descriptor: "tender and loving",
};

/// All profiles, in `MoodCategory::ALL` order
pub const MOOD_PROFILES: &[MoodProfile] = &[
    MOOD_HAPPY,
    MOOD_SAD,
    MOOD_CALM,
    MOOD_ENERGETIC,
    MOOD_MYSTERIOUS,
    MOOD_ROMANTIC,
];

pub fn profile(mood: MoodCategory) -> &'static MoodProfile {
    &MOOD_PROFILES[mood.index()]
}

// ============================================================================
// Energy keywords
// ============================================================================

pub const HIGH_ENERGY_KEYWORDS: &[&str] = &[
    "energetic", "excited", "pump", "workout", "dance", "party", "fast", "intense", "powerful",
    "dynamic", "vigorous", "lively", "explosive", "thrilling", "exhilarating", "pumped", "hyped",
    "electric", "wild",
];

pub const LOW_ENERGY_KEYWORDS: &[&str] = &[
    "calm", "peaceful", "sleep", "meditate", "quiet", "soft", "slow", "relaxed", "tranquil",
    "serene", "gentle", "mellow", "subdued", "drowsy", "tired", "lazy", "lethargic", "restful",
    "soothing",
];

// ============================================================================
// (mood, energy) -> attribute mappings
// ============================================================================

pub fn genre_style(mood: MoodCategory, energy: u8) -> GenreStyle {
    match mood {
        MoodCategory::Energetic => match energy {
            8.. => GenreStyle::ElectronicDance,
            6..=7 => GenreStyle::Rock,
            _ => GenreStyle::Pop,
        },
        MoodCategory::Calm => match energy {
            ..=3 => GenreStyle::Ambient,
            4..=5 => GenreStyle::Classical,
            _ => GenreStyle::Folk,
        },
        MoodCategory::Sad => {
            if energy <= 4 {
                GenreStyle::Blues
            } else {
                GenreStyle::Indie
            }
        }
        MoodCategory::Happy => {
            if energy >= 7 {
                GenreStyle::PopDance
            } else {
                GenreStyle::AcousticPop
            }
        }
        MoodCategory::Mysterious => GenreStyle::Cinematic,
        MoodCategory::Romantic => GenreStyle::Ballad,
    }
}

pub fn dynamics(energy: u8) -> Dynamics {
    match energy {
        ..=2 => Dynamics::Pp,
        3..=4 => Dynamics::P,
        5..=6 => Dynamics::Mp,
        7..=8 => Dynamics::Mf,
        _ => Dynamics::F,
    }
}

pub fn texture(energy: u8) -> Texture {
    match energy {
        ..=3 => Texture::Monophonic,
        4..=6 => Texture::Homophonic,
        _ => Texture::Polyphonic,
    }
}

/// Energy phrase for the analysis text prompt
pub fn energy_descriptor(energy: u8) -> &'static str {
    match energy {
        1 => "very slow and quiet",
        2 => "slow and gentle",
        3 => "calm and peaceful",
        4 => "relaxed",
        5 => "moderate",
        6 => "moderately energetic",
        7 => "upbeat",
        8 => "energetic",
        9 => "very energetic",
        10 => "intense and powerful",
        _ => "moderate",
    }
}
