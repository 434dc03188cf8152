//! Text inference capabilities used by mood analysis.
//!
//! Sentiment classification and sentence embedding are pluggable: the
//! analyzer only sees the [`SentimentClassifier`] and [`TextEmbedder`]
//! traits. Lexicon-based implementations are always available; transformer
//! models run through ONNX Runtime when the `onnx` feature is enabled and
//! model directories are configured.

mod lexicon;
#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
mod tokenizer;

pub use lexicon::{LexiconEmbedder, LexiconSentiment};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxSentimentModel, OnnxTextEncoder};
#[cfg(feature = "onnx")]
pub use tokenizer::WordPieceTokenizer;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::math;

/// A single classifier candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Sentence embedding vector
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: Vec<f32>,
}

impl Embedding {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    /// Get the raw embedding data
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn dim(&self) -> usize {
        self.data.len()
    }

    /// Cosine similarity with another embedding (0.0 on dimension mismatch)
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        math::cosine_similarity(&self.data, &other.data)
    }

    /// L2 norm; zero for text the embedder found nothing in
    pub fn norm(&self) -> f32 {
        math::l2_norm(&self.data)
    }

    /// L2 normalize the embedding in place
    pub fn normalize(&mut self) {
        math::normalize_in_place(&mut self.data);
    }
}

/// Text classification capability: text -> candidate labels with scores.
pub trait SentimentClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError>;
}

/// Text embedding capability: text -> fixed-length vector.
pub trait TextEmbedder: Send + Sync {
    fn name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Embedding, InferenceError>;
}

/// Inference error types
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Classifier returned no candidates")]
    NoCandidates,

    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Input embedding has no direction (norm {0})")]
    DegenerateEmbedding(f32),

    #[error("Classifier returned non-finite score for {0}")]
    InvalidScore(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("ONNX runtime error: {0}")]
    Onnx(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pick the sentiment classifier for this process.
///
/// Uses the ONNX model when compiled in and configured, otherwise the lexicon scorer.
pub fn sentiment_backend(config: &ModelConfig) -> Arc<dyn SentimentClassifier> {
    #[cfg(feature = "onnx")]
    {
        if let Some(dir) = &config.sentiment_model_dir {
            match OnnxSentimentModel::load(dir, config.enable_cuda) {
                Ok(model) => {
                    info!(path = %dir.display(), "Loaded ONNX sentiment model");
                    return Arc::new(model);
                }
                Err(e) => warn!(error = %e, "Failed to load sentiment model, using lexicon scorer"),
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        if config.sentiment_model_dir.is_some() {
            warn!("Sentiment model configured but onnx feature is disabled, using lexicon scorer");
        }
    }

    info!("Using lexicon sentiment scorer");
    Arc::new(LexiconSentiment::new())
}

/// Pick the text embedder for this process.
pub fn embedding_backend(config: &ModelConfig) -> Arc<dyn TextEmbedder> {
    #[cfg(feature = "onnx")]
    {
        if let Some(dir) = &config.embedding_model_dir {
            match OnnxTextEncoder::load(dir, config.enable_cuda) {
                Ok(model) => {
                    info!(path = %dir.display(), "Loaded ONNX text encoder");
                    return Arc::new(model);
                }
                Err(e) => warn!(error = %e, "Failed to load text encoder, using lexicon embedder"),
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        if config.embedding_model_dir.is_some() {
            warn!("Embedding model configured but onnx feature is disabled, using lexicon embedder");
        }
    }

    info!("Using lexicon embedder");
    Arc::new(LexiconEmbedder::new())
}
