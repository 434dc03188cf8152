//! Dictionary-based sentiment and embedding backends.
//!
//! Patterns follow the usual word-list convention: a trailing `*` matches any
//! word starting with the stem, anything else must match the whole word.
//! Both backends are deterministic and have no external dependencies, so they
//! are always available.

use super::{Embedding, InferenceError, LabelScore, SentimentClassifier, TextEmbedder};
use crate::math;
use crate::mood::MoodCategory;

const POSITIVE_WORDS: &[&str] = &[
    "happy", "happi*", "joy*", "love", "loved", "loving", "great", "good", "wonderful",
    "amazing", "awesome", "excit*", "cheer*", "glad", "delight*", "fantastic", "beautiful",
    "bright", "ready", "enjoy*", "smil*", "celebrat*", "hope*", "hopeful", "grateful", "thrill*",
    "elat*", "blessed", "proud", "excellent", "nice", "sunny", "positiv*", "energetic", "fun",
    "peaceful", "optimis*", "inspir*",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "sadness", "depress*", "angry", "anger", "hate*", "terribl*", "awful", "bad",
    "miser*", "lonel*", "upset", "hurt*", "cry", "crying", "cried", "anxi*", "stress*", "worr*",
    "fear*", "scared", "scary", "gloom*", "sorrow*", "grief", "griev*", "mourn*", "unhapp*",
    "horribl*", "painful", "broken", "heartbr*", "frustrat*", "bored", "negativ*", "exhausted",
    "hopeless", "tragic", "dread*",
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "isn't", "wasn't", "can't", "cannot", "without",
];

/// Logit added per sentiment word
const WORD_WEIGHT: f32 = 1.5;

/// Logit of the neutral class before any evidence
const NEUTRAL_PRIOR: f32 = 1.0;

/// (pattern, mood axis, weight)
const MOOD_LEXICON: &[(&str, MoodCategory, f32)] = &[
    // happy
    ("happy", MoodCategory::Happy, 1.0),
    ("happi*", MoodCategory::Happy, 1.0),
    ("joy*", MoodCategory::Happy, 1.0),
    ("cheer*", MoodCategory::Happy, 1.0),
    ("upbeat", MoodCategory::Happy, 1.0),
    ("positiv*", MoodCategory::Happy, 1.0),
    ("bright*", MoodCategory::Happy, 1.0),
    ("elat*", MoodCategory::Happy, 1.0),
    ("glad", MoodCategory::Happy, 1.0),
    ("delight*", MoodCategory::Happy, 1.0),
    ("fun", MoodCategory::Happy, 1.0),
    ("smil*", MoodCategory::Happy, 1.0),
    ("sunny", MoodCategory::Happy, 1.0),
    ("sunshine", MoodCategory::Happy, 1.0),
    ("celebrat*", MoodCategory::Happy, 1.0),
    ("laugh*", MoodCategory::Happy, 1.0),
    ("playful", MoodCategory::Happy, 1.0),
    ("wonderful", MoodCategory::Happy, 0.5),
    ("excited", MoodCategory::Happy, 0.5),
    ("excited", MoodCategory::Energetic, 0.5),
    // sad
    ("sad", MoodCategory::Sad, 1.0),
    ("sadness", MoodCategory::Sad, 1.0),
    ("sorrow*", MoodCategory::Sad, 1.0),
    ("depress*", MoodCategory::Sad, 1.0),
    ("gloom*", MoodCategory::Sad, 1.0),
    ("melanchol*", MoodCategory::Sad, 1.0),
    ("downcast", MoodCategory::Sad, 1.0),
    ("deject*", MoodCategory::Sad, 1.0),
    ("mourn*", MoodCategory::Sad, 1.0),
    ("cry", MoodCategory::Sad, 1.0),
    ("crying", MoodCategory::Sad, 1.0),
    ("tears", MoodCategory::Sad, 1.0),
    ("lonel*", MoodCategory::Sad, 1.0),
    ("heartbr*", MoodCategory::Sad, 1.0),
    ("grief", MoodCategory::Sad, 1.0),
    ("griev*", MoodCategory::Sad, 1.0),
    ("unhapp*", MoodCategory::Sad, 1.0),
    ("upset", MoodCategory::Sad, 1.0),
    ("blue", MoodCategory::Sad, 0.5),
    // calm
    ("calm*", MoodCategory::Calm, 1.0),
    ("peace*", MoodCategory::Calm, 1.0),
    ("tranquil*", MoodCategory::Calm, 1.0),
    ("seren*", MoodCategory::Calm, 1.0),
    ("relax*", MoodCategory::Calm, 1.0),
    ("meditat*", MoodCategory::Calm, 1.0),
    ("quiet*", MoodCategory::Calm, 1.0),
    ("sooth*", MoodCategory::Calm, 1.0),
    ("restful", MoodCategory::Calm, 1.0),
    ("chill*", MoodCategory::Calm, 1.0),
    ("study*", MoodCategory::Calm, 1.0),
    ("studi*", MoodCategory::Calm, 1.0),
    ("focus*", MoodCategory::Calm, 1.0),
    ("sleep*", MoodCategory::Calm, 1.0),
    ("zen", MoodCategory::Calm, 1.0),
    ("unwind*", MoodCategory::Calm, 1.0),
    ("mellow", MoodCategory::Calm, 1.0),
    ("gentle", MoodCategory::Calm, 0.5),
    // energetic
    ("energ*", MoodCategory::Energetic, 1.0),
    ("dynamic*", MoodCategory::Energetic, 1.0),
    ("power*", MoodCategory::Energetic, 1.0),
    ("intens*", MoodCategory::Energetic, 1.0),
    ("vigor*", MoodCategory::Energetic, 1.0),
    ("exciting", MoodCategory::Energetic, 1.0),
    ("vibrant", MoodCategory::Energetic, 1.0),
    ("lively", MoodCategory::Energetic, 1.0),
    ("spirited", MoodCategory::Energetic, 1.0),
    ("danc*", MoodCategory::Energetic, 1.0),
    ("party", MoodCategory::Energetic, 1.0),
    ("parties", MoodCategory::Energetic, 1.0),
    ("partying", MoodCategory::Energetic, 1.0),
    ("workout*", MoodCategory::Energetic, 1.0),
    ("gym", MoodCategory::Energetic, 1.0),
    ("running", MoodCategory::Energetic, 1.0),
    ("pump*", MoodCategory::Energetic, 1.0),
    ("hype*", MoodCategory::Energetic, 1.0),
    ("fast", MoodCategory::Energetic, 1.0),
    ("wild", MoodCategory::Energetic, 1.0),
    ("electric*", MoodCategory::Energetic, 1.0),
    ("explosiv*", MoodCategory::Energetic, 1.0),
    ("thrill*", MoodCategory::Energetic, 1.0),
    ("exhilarat*", MoodCategory::Energetic, 1.0),
    ("adrenaline", MoodCategory::Energetic, 1.0),
    // mysterious
    ("myster*", MoodCategory::Mysterious, 1.0),
    ("enigma*", MoodCategory::Mysterious, 1.0),
    ("dark*", MoodCategory::Mysterious, 1.0),
    ("atmospher*", MoodCategory::Mysterious, 1.0),
    ("suspens*", MoodCategory::Mysterious, 1.0),
    ("eerie", MoodCategory::Mysterious, 1.0),
    ("cryptic", MoodCategory::Mysterious, 1.0),
    ("shadow*", MoodCategory::Mysterious, 1.0),
    ("unknown", MoodCategory::Mysterious, 1.0),
    ("strange*", MoodCategory::Mysterious, 1.0),
    ("creep*", MoodCategory::Mysterious, 1.0),
    ("haunt*", MoodCategory::Mysterious, 1.0),
    ("spook*", MoodCategory::Mysterious, 1.0),
    ("secret*", MoodCategory::Mysterious, 1.0),
    ("ghost*", MoodCategory::Mysterious, 1.0),
    ("misty", MoodCategory::Mysterious, 1.0),
    ("foggy", MoodCategory::Mysterious, 1.0),
    ("noir", MoodCategory::Mysterious, 1.0),
    ("night*", MoodCategory::Mysterious, 0.5),
    ("moon*", MoodCategory::Mysterious, 0.5),
    // romantic
    ("love", MoodCategory::Romantic, 1.0),
    ("loved", MoodCategory::Romantic, 1.0),
    ("loving", MoodCategory::Romantic, 1.0),
    ("romanc*", MoodCategory::Romantic, 1.0),
    ("romant*", MoodCategory::Romantic, 1.0),
    ("tender*", MoodCategory::Romantic, 1.0),
    ("passion*", MoodCategory::Romantic, 1.0),
    ("intimat*", MoodCategory::Romantic, 1.0),
    ("warm*", MoodCategory::Romantic, 1.0),
    ("affection*", MoodCategory::Romantic, 1.0),
    ("devot*", MoodCategory::Romantic, 1.0),
    ("kiss*", MoodCategory::Romantic, 1.0),
    ("darling", MoodCategory::Romantic, 1.0),
    ("sweetheart", MoodCategory::Romantic, 1.0),
    ("valentine*", MoodCategory::Romantic, 1.0),
    ("wedding", MoodCategory::Romantic, 1.0),
    ("candle*", MoodCategory::Romantic, 0.5),
    ("heart", MoodCategory::Romantic, 0.5),
    ("gentle", MoodCategory::Romantic, 0.5),
];

/// Lowercased word tokens; apostrophes stay inside words ("don't").
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn pattern_matches(pattern: &str, token: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(stem) => token.starts_with(stem),
        None => token == pattern,
    }
}

fn in_list(list: &[&str], token: &str) -> bool {
    list.iter().any(|pattern| pattern_matches(pattern, token))
}

/// Word-list sentiment scorer emitting `LABEL_0` (negative), `LABEL_1`
/// (neutral) and `LABEL_2` (positive) with softmax scores.
///
/// A sentiment word directly preceded by a negator counts for the opposite class.
#[derive(Debug, Default, Clone)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    /// (positive hits, negative hits) after negation handling
    fn polarity_counts(&self, text: &str) -> (usize, usize) {
        let tokens = tokenize(text);
        let mut positive = 0;
        let mut negative = 0;

        for (i, token) in tokens.iter().enumerate() {
            let negated = i > 0 && NEGATORS.contains(&tokens[i - 1].as_str());
            let is_pos = in_list(POSITIVE_WORDS, token);
            let is_neg = in_list(NEGATIVE_WORDS, token);

            match (is_pos, is_neg, negated) {
                (true, false, false) | (false, true, true) => positive += 1,
                (false, true, false) | (true, false, true) => negative += 1,
                _ => {}
            }
        }

        (positive, negative)
    }
}

impl SentimentClassifier for LexiconSentiment {
    fn name(&self) -> &str {
        "lexicon-sentiment"
    }

    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError> {
        let (positive, negative) = self.polarity_counts(text);
        let logits = [
            negative as f32 * WORD_WEIGHT,
            NEUTRAL_PRIOR,
            positive as f32 * WORD_WEIGHT,
        ];
        let probs = math::softmax(&logits);

        Ok(probs
            .into_iter()
            .enumerate()
            .map(|(i, p)| LabelScore::new(format!("LABEL_{i}"), p))
            .collect())
    }
}

/// Projects text onto the six mood axes using a fixed word lexicon.
///
/// Dimension is the number of mood categories; words outside the lexicon
/// contribute nothing, so text with no mood words embeds to the zero vector.
#[derive(Debug, Default, Clone)]
pub struct LexiconEmbedder;

impl LexiconEmbedder {
    pub const DIM: usize = MoodCategory::ALL.len();

    pub fn new() -> Self {
        Self
    }
}

impl TextEmbedder for LexiconEmbedder {
    fn name(&self) -> &str {
        "lexicon-embedder"
    }

    fn embed(&self, text: &str) -> Result<Embedding, InferenceError> {
        let mut data = vec![0.0f32; Self::DIM];

        for token in tokenize(text) {
            for (pattern, mood, weight) in MOOD_LEXICON {
                if pattern_matches(pattern, &token) {
                    data[mood.index()] += weight;
                }
            }
        }

        let mut embedding = Embedding::new(data);
        embedding.normalize();
        Ok(embedding)
    }
}
