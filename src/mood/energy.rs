//! Energy scoring from keywords and sentiment.

use super::params::Sentiment;
use super::tables::{HIGH_ENERGY_KEYWORDS, LOW_ENERGY_KEYWORDS, MAX_ENERGY, MIN_ENERGY};

/// Energy points per net keyword hit
const KEYWORD_WEIGHT: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordHits {
    pub high: usize,
    pub low: usize,
}

impl KeywordHits {
    pub fn adjustment(&self) -> f32 {
        (self.high as f32 - self.low as f32) * KEYWORD_WEIGHT
    }
}

/// Count energy keywords contained in the text (case-insensitive substring match).
pub fn count_keywords(text: &str) -> KeywordHits {
    let lower = text.to_lowercase();
    KeywordHits {
        high: HIGH_ENERGY_KEYWORDS
            .iter()
            .filter(|word| lower.contains(*word))
            .count(),
        low: LOW_ENERGY_KEYWORDS
            .iter()
            .filter(|word| lower.contains(*word))
            .count(),
    }
}

/// Sentiment-derived starting energy: positive 6..8, negative 2..4, neutral 5.
pub fn base_energy(sentiment: Sentiment, confidence: f32) -> f32 {
    let confidence = confidence.clamp(0.0, 1.0);
    match sentiment {
        Sentiment::Positive => 6.0 + confidence * 2.0,
        Sentiment::Negative => 4.0 - confidence * 2.0,
        Sentiment::Neutral => 5.0,
    }
}

/// Combined energy level, clamped to 1..=10 and rounded.
pub fn energy_level(text: &str, sentiment: Sentiment, confidence: f32) -> u8 {
    let hits = count_keywords(text);
    let raw = base_energy(sentiment, confidence) + hits.adjustment();
    let clamped = raw.clamp(MIN_ENERGY as f32, MAX_ENERGY as f32);

    tracing::debug!(
        base = base_energy(sentiment, confidence),
        high_words = hits.high,
        low_words = hits.low,
        energy = clamped,
        "Energy calculation"
    );

    clamped.round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_keywords_case_insensitive() {
        let hits = count_keywords("DANCE party, then SLEEP");
        assert_eq!(hits.high, 2);
        assert_eq!(hits.low, 1);
    }

    #[test]
    fn test_substring_matching_counts_overlaps() {
        // "pumped" contains both "pump" and "pumped"
        let hits = count_keywords("pumped");
        assert_eq!(hits.high, 2);
    }

    #[test]
    fn test_base_energy() {
        assert!((base_energy(Sentiment::Positive, 1.0) - 8.0).abs() < 1e-6);
        assert!((base_energy(Sentiment::Negative, 1.0) - 2.0).abs() < 1e-6);
        assert!((base_energy(Sentiment::Neutral, 0.9) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_energy_rounds_half_up() {
        // 5.0 - 1.5 = 3.5 -> 4
        assert_eq!(energy_level("calm", Sentiment::Neutral, 0.8), 4);
    }

    #[test]
    fn test_energy_clamped_high_and_low() {
        let hype = HIGH_ENERGY_KEYWORDS.join(" ");
        assert_eq!(energy_level(&hype, Sentiment::Positive, 1.0), 10);

        let sleepy = LOW_ENERGY_KEYWORDS.join(" ");
        assert_eq!(energy_level(&sleepy, Sentiment::Negative, 1.0), 1);
    }

    #[test]
    fn test_energy_neutral_no_keywords() {
        assert_eq!(energy_level("music for the afternoon", Sentiment::Neutral, 0.5), 5);
    }
}
