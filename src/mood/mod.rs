//! Mood analysis: free text -> musical parameters.
//!
//! The analyzer runs four steps: sentiment scoring, mood classification by
//! cosine similarity against pre-computed reference embeddings, keyword
//! energy scoring, and a table-driven mapping onto musical attributes.
//! Analysis is advisory, so every internal fault degrades to the fixed
//! default record instead of surfacing an error.

pub mod energy;
pub mod params;
pub mod tables;

pub use params::{
    Dynamics, GenreStyle, MoodCategory, MusicalKey, MusicalParameters, ParameterError, Sentiment,
    Texture,
};
pub use tables::{MoodProfile, MOOD_PROFILES};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ModelConfig;
use crate::inference::{
    self, Embedding, InferenceError, LexiconEmbedder, LexiconSentiment, SentimentClassifier,
    TextEmbedder,
};

/// Winning sentiment bucket with its classifier confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub sentiment: Sentiment,
    pub confidence: f32,
}

/// Similarity of the input to one mood reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodSimilarity {
    pub mood: MoodCategory,
    pub similarity: f32,
}

/// Mood reference vectors, one per category in declaration order
struct MoodEmbeddingIndex {
    references: Vec<(MoodCategory, Embedding)>,
}

impl MoodEmbeddingIndex {
    fn build(embedder: &dyn TextEmbedder) -> Result<Self, InferenceError> {
        let references = MoodCategory::ALL
            .iter()
            .map(|mood| {
                embedder
                    .embed(mood.profile().reference_text)
                    .map(|emb| (*mood, emb))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { references })
    }

    fn similarities(&self, input: &Embedding) -> Result<Vec<MoodSimilarity>, InferenceError> {
        self.references
            .iter()
            .map(|(mood, reference)| {
                if reference.dim() != input.dim() {
                    return Err(InferenceError::DimensionMismatch {
                        expected: reference.dim(),
                        got: input.dim(),
                    });
                }
                Ok(MoodSimilarity {
                    mood: *mood,
                    similarity: input.cosine_similarity(reference),
                })
            })
            .collect()
    }
}

/// Converts mood descriptions into [`MusicalParameters`].
pub struct MoodAnalyzer {
    sentiment: Arc<dyn SentimentClassifier>,
    embedder: Arc<dyn TextEmbedder>,
    index: Option<MoodEmbeddingIndex>,
}

impl std::fmt::Debug for MoodAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoodAnalyzer")
            .field("sentiment", &self.sentiment.name())
            .field("embedder", &self.embedder.name())
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl MoodAnalyzer {
    /// Create an analyzer, pre-computing the mood reference embeddings.
    ///
    /// If the references cannot be built the analyzer still constructs, and
    /// every analysis returns the default record.
    pub fn new(sentiment: Arc<dyn SentimentClassifier>, embedder: Arc<dyn TextEmbedder>) -> Self {
        let index = match MoodEmbeddingIndex::build(embedder.as_ref()) {
            Ok(index) => {
                info!(
                    sentiment = sentiment.name(),
                    embedder = embedder.name(),
                    moods = index.references.len(),
                    "Mood embeddings created"
                );
                Some(index)
            }
            Err(e) => {
                warn!(error = %e, "Failed to build mood embeddings, analysis will use defaults");
                None
            }
        };

        Self {
            sentiment,
            embedder,
            index,
        }
    }

    /// Analyzer backed by the built-in lexicon capabilities
    pub fn builtin() -> Self {
        Self::new(
            Arc::new(LexiconSentiment::new()),
            Arc::new(LexiconEmbedder::new()),
        )
    }

    /// Analyzer using whichever backends the model configuration selects
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            inference::sentiment_backend(config),
            inference::embedding_backend(config),
        )
    }

    /// Whether reference embeddings are available
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Names of the active `(sentiment, embedding)` backends, e.g.
    /// `("lexicon-sentiment", "lexicon-embedder")`.
    pub fn backend_names(&self) -> (&str, &str) {
        (self.sentiment.name(), self.embedder.name())
    }

    /// Analyze a mood description. Never fails: faults yield the default record.
    ///
    /// Empty or whitespace-only text, text the embedder finds no mood in, and
    /// any backend error all produce [`MusicalParameters::fallback`] with
    /// `original_input` set to `text`.
    ///
    /// # Arguments
    ///
    /// * `text` - Free-text mood description
    ///
    /// # Returns
    ///
    /// A record whose energy is in 1..=10 and tempo in 60..=180.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use moodwave::mood::{MoodAnalyzer, MoodCategory};
    ///
    /// let analyzer = MoodAnalyzer::builtin();
    /// let params = analyzer.analyze("I need calm music for studying");
    /// assert_eq!(params.mood_category, MoodCategory::Calm);
    /// assert!(params.energy_level <= 5);
    /// ```
    pub fn analyze(&self, text: &str) -> MusicalParameters {
        if text.trim().is_empty() {
            debug!("Empty mood input, using default parameters");
            return MusicalParameters::fallback(text);
        }

        match self.try_analyze(text) {
            Ok(params) => params,
            Err(e) => {
                warn!(error = %e, "Mood analysis failed, using default parameters");
                MusicalParameters::fallback(text)
            }
        }
    }

    /// Analyze a mood description, surfacing inference faults.
    pub fn try_analyze(&self, text: &str) -> Result<MusicalParameters, InferenceError> {
        debug!(input = text, "Analyzing mood");

        let sentiment = self.score_sentiment(text)?;
        let mood = self.classify_mood(text)?;
        let energy = energy::energy_level(text, sentiment.sentiment, sentiment.confidence);

        info!(
            mood = %mood,
            energy,
            sentiment = %sentiment.sentiment,
            "Analysis complete"
        );

        Ok(map_parameters(mood, energy, sentiment, text))
    }

    /// Step 1: best sentiment candidate mapped onto the three buckets.
    ///
    /// # Errors
    ///
    /// [`InferenceError::NoCandidates`] for an empty classifier result and
    /// [`InferenceError::InvalidScore`] if any score is NaN or infinite.
    pub fn score_sentiment(&self, text: &str) -> Result<SentimentScore, InferenceError> {
        let candidates = self.sentiment.classify(text)?;
        if let Some(bad) = candidates.iter().find(|c| !c.score.is_finite()) {
            return Err(InferenceError::InvalidScore(bad.label.clone()));
        }
        let best = candidates
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or(InferenceError::NoCandidates)?;

        let sentiment = Sentiment::from_label(&best.label).unwrap_or_else(|| {
            debug!(label = %best.label, "Unrecognized sentiment label, treating as neutral");
            Sentiment::Neutral
        });

        Ok(SentimentScore {
            sentiment,
            confidence: best.score.clamp(0.0, 1.0),
        })
    }

    /// Similarity of the text to every mood reference, in category order.
    ///
    /// # Errors
    ///
    /// [`InferenceError::DegenerateEmbedding`] when the text embeds to a
    /// zero (or non-finite) vector, since every similarity would tie.
    pub fn mood_similarities(&self, text: &str) -> Result<Vec<MoodSimilarity>, InferenceError> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| InferenceError::ModelNotLoaded("mood embeddings".to_string()))?;

        let input = self.embedder.embed(text)?;
        let norm = input.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return Err(InferenceError::DegenerateEmbedding(norm));
        }
        index.similarities(&input)
    }

    /// Step 2: the most similar mood; ties go to the earlier category
    pub fn classify_mood(&self, text: &str) -> Result<MoodCategory, InferenceError> {
        let similarities = self.mood_similarities(text)?;
        debug!(?similarities, "Mood similarities");

        let mut best: Option<MoodSimilarity> = None;
        for candidate in similarities {
            match best {
                Some(current) if candidate.similarity <= current.similarity => {}
                _ => best = Some(candidate),
            }
        }

        best.map(|b| b.mood).ok_or(InferenceError::NoCandidates)
    }
}

/// Step 4: deterministic mapping of analysis results onto musical attributes.
///
/// # Arguments
///
/// * `mood` - Winning mood category
/// * `energy` - Energy level, clamped to 1..=10 here
/// * `sentiment` - Sentiment bucket and confidence (rounded to 3 decimals)
/// * `original_input` - Text carried through into the record
pub fn map_parameters(
    mood: MoodCategory,
    energy: u8,
    sentiment: SentimentScore,
    original_input: &str,
) -> MusicalParameters {
    let energy = energy.clamp(tables::MIN_ENERGY, tables::MAX_ENERGY);
    let profile = mood.profile();
    let key = musical_key(mood, sentiment.sentiment);

    MusicalParameters {
        mood_category: mood,
        energy_level: energy,
        sentiment: sentiment.sentiment,
        sentiment_confidence: (sentiment.confidence * 1000.0).round() / 1000.0,
        tempo: tempo(mood, energy),
        key,
        instruments: profile.instruments.iter().map(|s| s.to_string()).collect(),
        time_signature: tables::TIME_SIGNATURE.to_string(),
        genre_style: tables::genre_style(mood, energy),
        dynamics: tables::dynamics(energy),
        texture: tables::texture(energy),
        text_prompt: text_prompt(mood, energy, key),
        original_input: original_input.to_string(),
    }
}

/// Base tempo of the mood shifted by 8 BPM per energy point from 5, clamped to 60..=180.
///
/// # Example
///
/// ```ignore
/// use moodwave::mood::{tempo, MoodCategory};
///
/// assert_eq!(tempo(MoodCategory::Calm, 5), 80);
/// assert_eq!(tempo(MoodCategory::Energetic, 10), 180);
/// ```
pub fn tempo(mood: MoodCategory, energy: u8) -> u16 {
    let adjusted = mood.profile().base_tempo as i32
        + (energy as i32 - 5) * tables::TEMPO_PER_ENERGY;
    adjusted.clamp(tables::MIN_TEMPO as i32, tables::MAX_TEMPO as i32) as u16
}

/// Key from sentiment; sad and mysterious moods are always minor.
pub fn musical_key(mood: MoodCategory, sentiment: Sentiment) -> MusicalKey {
    if matches!(mood, MoodCategory::Sad | MoodCategory::Mysterious) {
        return MusicalKey::Minor;
    }
    match sentiment {
        Sentiment::Negative => MusicalKey::Minor,
        Sentiment::Positive | Sentiment::Neutral => MusicalKey::Major,
    }
}

/// Short natural-language description stored in [`MusicalParameters::text_prompt`].
///
/// Format: `"<energy descriptor> <mood descriptor> music in <key> key"`.
/// The longer prompt handed to synthesis backends is built separately by
/// `generator::build_synthesis_prompt`.
pub fn text_prompt(mood: MoodCategory, energy: u8, key: MusicalKey) -> String {
    format!(
        "{} {} music in {} key",
        tables::energy_descriptor(energy),
        mood.profile().descriptor,
        key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::LabelScore;

    struct FixedSentiment(Vec<LabelScore>);

    impl SentimentClassifier for FixedSentiment {
        fn name(&self) -> &str {
            "fixed"
        }

        fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    struct BrokenEmbedder;

    impl TextEmbedder for BrokenEmbedder {
        fn name(&self) -> &str {
            "broken"
        }

        fn embed(&self, _text: &str) -> Result<Embedding, InferenceError> {
            Err(InferenceError::ModelNotLoaded("broken".to_string()))
        }
    }

    /// Every text embeds to the same vector, so all moods tie
    struct ConstantEmbedder;

    impl TextEmbedder for ConstantEmbedder {
        fn name(&self) -> &str {
            "constant"
        }

        fn embed(&self, _text: &str) -> Result<Embedding, InferenceError> {
            Ok(Embedding::new(vec![1.0, 1.0, 1.0]))
        }
    }

    fn positive(confidence: f32) -> SentimentScore {
        SentimentScore {
            sentiment: Sentiment::Positive,
            confidence,
        }
    }

    #[test]
    fn test_energetic_dance_scenario() {
        let analyzer = MoodAnalyzer::builtin();
        let params = analyzer.analyze("I'm feeling energetic and ready to dance!");

        assert!(matches!(
            params.mood_category,
            MoodCategory::Energetic | MoodCategory::Happy
        ));
        assert!(params.energy_level >= 7);
        assert!(params.tempo >= 120);
    }

    #[test]
    fn test_calm_study_scenario() {
        let analyzer = MoodAnalyzer::builtin();
        let params = analyzer.analyze("I need calm music for studying");

        assert_eq!(params.mood_category, MoodCategory::Calm);
        assert!(params.energy_level <= 5);
        assert_eq!(params.key, MusicalKey::Major);
    }

    #[test]
    fn test_empty_input_returns_default() {
        let analyzer = MoodAnalyzer::builtin();
        for input in ["", "   "] {
            let params = analyzer.analyze(input);
            assert_eq!(params.mood_category, MoodCategory::Calm);
            assert_eq!(params.energy_level, 5);
            assert_eq!(params.sentiment, Sentiment::Neutral);
            assert_eq!(params.tempo, 120);
            assert_eq!(params.key, MusicalKey::Major);
        }
    }

    #[test]
    fn test_unavailable_embedder_falls_back_to_default() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(LexiconSentiment::new()),
            Arc::new(BrokenEmbedder),
        );
        assert!(!analyzer.is_ready());

        let params = analyzer.analyze("so happy today");
        assert_eq!(params, MusicalParameters::fallback("so happy today"));
        assert!(analyzer.try_analyze("so happy today").is_err());
    }

    #[test]
    fn test_empty_classifier_output_falls_back() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(FixedSentiment(vec![])),
            Arc::new(LexiconEmbedder::new()),
        );
        let params = analyzer.analyze("joyful morning");
        assert_eq!(params.mood_category, MoodCategory::Calm);
        assert_eq!(params.tempo, 120);
    }

    #[test]
    fn test_text_without_mood_words_returns_default() {
        let analyzer = MoodAnalyzer::builtin();
        for text in ["music for my commute", "play something", "I feel blah"] {
            assert!(matches!(
                analyzer.classify_mood(text),
                Err(InferenceError::DegenerateEmbedding(_))
            ));
            assert_eq!(analyzer.analyze(text), MusicalParameters::fallback(text));
        }
    }

    #[test]
    fn test_non_finite_sentiment_score_falls_back() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(FixedSentiment(vec![
                LabelScore::new("LABEL_2", f32::NAN),
                LabelScore::new("LABEL_1", 0.3),
            ])),
            Arc::new(LexiconEmbedder::new()),
        );
        assert!(matches!(
            analyzer.score_sentiment("joyful morning"),
            Err(InferenceError::InvalidScore(_))
        ));

        let params = analyzer.analyze("joyful morning");
        assert_eq!(params, MusicalParameters::fallback("joyful morning"));
        assert!((0.0..=1.0).contains(&params.sentiment_confidence));
    }

    #[test]
    fn test_sentiment_argmax_and_label_mapping() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(FixedSentiment(vec![
                LabelScore::new("LABEL_0", 0.7),
                LabelScore::new("LABEL_1", 0.2),
                LabelScore::new("LABEL_2", 0.1),
            ])),
            Arc::new(LexiconEmbedder::new()),
        );
        let score = analyzer.score_sentiment("anything").unwrap();
        assert_eq!(score.sentiment, Sentiment::Negative);
        assert!((score.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_label_treated_as_neutral() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(FixedSentiment(vec![LabelScore::new("LABEL_9", 0.9)])),
            Arc::new(LexiconEmbedder::new()),
        );
        let score = analyzer.score_sentiment("anything").unwrap();
        assert_eq!(score.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_similarity_ties_pick_first_category() {
        let analyzer = MoodAnalyzer::new(
            Arc::new(LexiconSentiment::new()),
            Arc::new(ConstantEmbedder),
        );
        assert_eq!(
            analyzer.classify_mood("whatever").unwrap(),
            MoodCategory::Happy
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let analyzer = MoodAnalyzer::builtin();
        let text = "a dark and eerie night in the forest";
        let first = analyzer.analyze(text);
        for _ in 0..5 {
            assert_eq!(analyzer.analyze(text), first);
        }
        assert_eq!(first.mood_category, MoodCategory::Mysterious);
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        let analyzer = MoodAnalyzer::builtin();
        let hype = tables::HIGH_ENERGY_KEYWORDS.join(" ").repeat(20);
        let sleepy = tables::LOW_ENERGY_KEYWORDS.join(" ").repeat(20);

        for text in [hype.as_str(), sleepy.as_str(), "!!!???", "😀😀😀"] {
            let params = analyzer.analyze(text);
            assert!((1..=10).contains(&params.energy_level), "{text}");
            assert!((60..=180).contains(&params.tempo), "{text}");
            assert!(MoodCategory::ALL.contains(&params.mood_category));
        }
    }

    #[test]
    fn test_sad_and_mysterious_force_minor() {
        for mood in [MoodCategory::Sad, MoodCategory::Mysterious] {
            for sentiment in [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative] {
                assert_eq!(musical_key(mood, sentiment), MusicalKey::Minor);
            }
        }
        assert_eq!(
            musical_key(MoodCategory::Happy, Sentiment::Negative),
            MusicalKey::Minor
        );
        assert_eq!(
            musical_key(MoodCategory::Calm, Sentiment::Neutral),
            MusicalKey::Major
        );
    }

    #[test]
    fn test_tempo_mapping_and_clamp() {
        assert_eq!(tempo(MoodCategory::Happy, 5), 120);
        assert_eq!(tempo(MoodCategory::Sad, 1), 60);
        assert_eq!(tempo(MoodCategory::Energetic, 10), 180);
        assert_eq!(tempo(MoodCategory::Calm, 4), 72);
    }

    #[test]
    fn test_map_parameters() {
        let params = map_parameters(MoodCategory::Energetic, 9, positive(0.91234), "go");

        assert_eq!(params.tempo, 172);
        assert_eq!(params.key, MusicalKey::Major);
        assert_eq!(params.genre_style, GenreStyle::ElectronicDance);
        assert_eq!(params.dynamics, Dynamics::F);
        assert_eq!(params.texture, Texture::Polyphonic);
        assert_eq!(
            params.instruments,
            vec!["electric_guitar", "drums", "bass", "synth"]
        );
        assert_eq!(params.sentiment_confidence, 0.912);
        assert_eq!(
            params.text_prompt,
            "very energetic dynamic and powerful music in major key"
        );
        assert_eq!(params.original_input, "go");
    }
}
