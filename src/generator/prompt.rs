//! Text prompts for neural generation.

use crate::mood::MusicalParameters;

/// Instruments named in a prompt
const MAX_PROMPT_INSTRUMENTS: usize = 3;

/// Adjective for an energy level; out-of-range levels read as "moderate"
pub fn energy_word(energy: u8) -> &'static str {
    match energy {
        1 => "very slow",
        2 => "slow",
        3 => "gentle",
        4 => "relaxed",
        5 => "moderate",
        6 => "upbeat",
        7 => "energetic",
        8 => "lively",
        9 => "dynamic",
        10 => "intense",
        _ => "moderate",
    }
}

/// Prompt handed to synthesis backends.
///
/// At most three instruments are named; an empty list reads as "piano".
///
/// # Example
///
/// ```text
/// upbeat happy acoustic_pop music with piano and guitar and drums in major key at 128 BPM
/// ```
pub fn build_synthesis_prompt(params: &MusicalParameters) -> String {
    let instruments = if params.instruments.is_empty() {
        "piano".to_string()
    } else {
        params
            .instruments
            .iter()
            .take(MAX_PROMPT_INSTRUMENTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" and ")
    };

    format!(
        "{} {} {} music with {} in {} key at {} BPM",
        energy_word(params.energy_level),
        params.mood_category,
        params.genre_style,
        instruments,
        params.key,
        params.tempo
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::{MoodAnalyzer, MoodCategory, MusicalKey};

    #[test]
    fn test_default_prompt() {
        let params = MusicalParameters::default();
        assert_eq!(
            build_synthesis_prompt(&params),
            "moderate calm contemporary music with piano and strings in major key at 120 BPM"
        );
    }

    #[test]
    fn test_prompt_limits_instruments() {
        let mut params = MusicalParameters::default();
        params.mood_category = MoodCategory::Energetic;
        params.energy_level = 9;
        params.key = MusicalKey::Minor;
        params.tempo = 172;
        params.instruments = ["electric_guitar", "drums", "bass", "synth"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let prompt = build_synthesis_prompt(&params);
        assert!(prompt.starts_with("dynamic energetic"));
        assert!(prompt.contains("electric_guitar and drums and bass in minor key"));
        assert!(!prompt.contains("synth"));
        assert!(prompt.ends_with("at 172 BPM"));
    }

    #[test]
    fn test_empty_instruments() {
        let mut params = MusicalParameters::default();
        params.instruments.clear();
        assert!(build_synthesis_prompt(&params).contains("with piano in"));
    }

    #[test]
    fn test_energy_words_cover_range() {
        let words: Vec<_> = (1..=10).map(energy_word).collect();
        assert_eq!(words[0], "very slow");
        assert_eq!(words[9], "intense");
        assert_eq!(energy_word(0), "moderate");
    }

    #[test]
    fn test_prompt_from_analysis() {
        let params = MoodAnalyzer::builtin().analyze("I need calm music for studying");
        let prompt = build_synthesis_prompt(&params);
        assert!(prompt.contains(" calm "));
        assert!(prompt.contains("BPM"));
    }
}
