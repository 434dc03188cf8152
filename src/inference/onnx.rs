//! Transformer text models run through ONNX Runtime.
//!
//! A model directory holds `model.onnx` and the WordPiece `vocab.txt`.
//! Sentiment models output `[1, n_labels]` logits; label names are read from
//! an optional `labels.txt`, otherwise `LABEL_<i>` is used. Sentence encoders
//! output token states `[1, seq, dim]` which are mean pooled over the
//! attention mask.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use tracing::{debug, info};

use super::tokenizer::{Encoding, WordPieceTokenizer};
use super::{Embedding, InferenceError, LabelScore, SentimentClassifier, TextEmbedder};
use crate::math;

const MODEL_FILE: &str = "model.onnx";
const VOCAB_FILE: &str = "vocab.txt";
const LABELS_FILE: &str = "labels.txt";

const MAX_SEQUENCE_LEN: usize = 128;

fn create_session(model_path: &Path, use_cuda: bool) -> Result<Session, InferenceError> {
    if !model_path.exists() {
        return Err(InferenceError::ModelNotLoaded(format!(
            "{} not found",
            model_path.display()
        )));
    }

    let mut builder = Session::builder().map_err(|e| InferenceError::Onnx(e.to_string()))?;

    builder = builder
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError::Onnx(e.to_string()))?;

    builder = builder
        .with_intra_threads(2)
        .map_err(|e| InferenceError::Onnx(e.to_string()))?;

    if use_cuda {
        #[cfg(feature = "cuda")]
        {
            use ort::execution_providers::CUDAExecutionProvider;
            builder = builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .map_err(|e| InferenceError::Onnx(e.to_string()))?;
        }
        #[cfg(not(feature = "cuda"))]
        {
            tracing::warn!("CUDA requested but not compiled with cuda feature, using CPU");
        }
    }

    builder
        .commit_from_file(model_path)
        .map_err(|e| InferenceError::Onnx(format!("Failed to load model: {e}")))
}

fn to_tensor(values: Vec<i64>) -> Result<Tensor<i64>, InferenceError> {
    let len = values.len();
    let array = Array2::from_shape_vec((1, len), values)
        .map_err(|e| InferenceError::Onnx(format!("input shape error: {e}")))?;
    Tensor::from_array(array).map_err(|e| InferenceError::Onnx(e.to_string()))
}

/// One forward pass; returns (shape, flat data) of the first output
fn run_once(
    session: &mut Session,
    encoding: &Encoding,
    with_token_types: bool,
) -> Result<(Vec<i64>, Vec<f32>), InferenceError> {
    let input_ids = to_tensor(encoding.input_ids.clone())?;
    let attention_mask = to_tensor(encoding.attention_mask.clone())?;

    let outputs = if with_token_types {
        let token_type_ids = to_tensor(encoding.token_type_ids.clone())?;
        session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
            "token_type_ids" => token_type_ids
        ])
    } else {
        session.run(ort::inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask
        ])
    }
    .map_err(|e| InferenceError::Onnx(e.to_string()))?;

    let (_, output) = outputs
        .iter()
        .next()
        .ok_or_else(|| InferenceError::Onnx("model produced no output".to_string()))?;

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| InferenceError::Onnx(e.to_string()))?;

    Ok((shape.iter().copied().collect(), data.to_vec()))
}

/// Run a BERT-style session. RoBERTa and DistilBERT exports take no
/// `token_type_ids`, so a rejected three-input call is retried with two.
fn run_encoder(
    session: &Mutex<Session>,
    encoding: &Encoding,
) -> Result<(Vec<i64>, Vec<f32>), InferenceError> {
    let mut session = session
        .lock()
        .map_err(|e| InferenceError::Onnx(format!("Session lock error: {e}")))?;

    match run_once(&mut session, encoding, true) {
        Ok(result) => Ok(result),
        Err(e) => {
            debug!(error = %e, "Retrying without token_type_ids");
            run_once(&mut session, encoding, false)
        }
    }
}

fn model_files(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join(MODEL_FILE), dir.join(VOCAB_FILE))
}

/// Sequence classification model producing sentiment logits
pub struct OnnxSentimentModel {
    session: Mutex<Session>,
    tokenizer: WordPieceTokenizer,
    labels: Vec<String>,
    name: String,
}

impl std::fmt::Debug for OnnxSentimentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSentimentModel")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .finish()
    }
}

impl OnnxSentimentModel {
    pub fn load(dir: &Path, use_cuda: bool) -> Result<Self, InferenceError> {
        let (model_path, vocab_path) = model_files(dir);
        let session = create_session(&model_path, use_cuda)?;
        let tokenizer = WordPieceTokenizer::from_file(&vocab_path, MAX_SEQUENCE_LEN)?;

        let labels_path = dir.join(LABELS_FILE);
        let labels = if labels_path.exists() {
            std::fs::read_to_string(&labels_path)?
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };

        let name = format!("onnx-sentiment:{}", dir_name(dir));
        info!(model = %name, labels = labels.len(), "Sentiment session created");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            labels,
            name,
        })
    }

    fn label(&self, index: usize) -> String {
        self.labels
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{index}"))
    }
}

impl SentimentClassifier for OnnxSentimentModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, InferenceError> {
        let encoding = self.tokenizer.encode(text);
        let (shape, logits) = run_encoder(&self.session, &encoding)?;
        debug!(?shape, "Sentiment logits");

        let probs = math::softmax(&logits);
        Ok(probs
            .into_iter()
            .enumerate()
            .map(|(i, p)| LabelScore::new(self.label(i), p))
            .collect())
    }
}

/// Sentence encoder with attention-masked mean pooling
pub struct OnnxTextEncoder {
    session: Mutex<Session>,
    tokenizer: WordPieceTokenizer,
    name: String,
}

impl std::fmt::Debug for OnnxTextEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxTextEncoder")
            .field("name", &self.name)
            .finish()
    }
}

impl OnnxTextEncoder {
    pub fn load(dir: &Path, use_cuda: bool) -> Result<Self, InferenceError> {
        let (model_path, vocab_path) = model_files(dir);
        let session = create_session(&model_path, use_cuda)?;
        let tokenizer = WordPieceTokenizer::from_file(&vocab_path, MAX_SEQUENCE_LEN)?;

        let name = format!("onnx-encoder:{}", dir_name(dir));
        info!(model = %name, "Text encoder session created");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            name,
        })
    }
}

impl TextEmbedder for OnnxTextEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn embed(&self, text: &str) -> Result<Embedding, InferenceError> {
        let encoding = self.tokenizer.encode(text);
        let (shape, data) = run_encoder(&self.session, &encoding)?;

        let pooled = match shape.as_slice() {
            // token states
            [1, seq, dim] => mean_pool(&data, &encoding.attention_mask, *seq as usize, *dim as usize)?,
            // already pooled
            [1, _] => data,
            other => {
                return Err(InferenceError::Onnx(format!(
                    "unexpected encoder output shape {other:?}"
                )))
            }
        };

        let mut embedding = Embedding::new(pooled);
        embedding.normalize();
        Ok(embedding)
    }
}

fn mean_pool(data: &[f32], mask: &[i64], seq: usize, dim: usize) -> Result<Vec<f32>, InferenceError> {
    if data.len() != seq * dim {
        return Err(InferenceError::DimensionMismatch {
            expected: seq * dim,
            got: data.len(),
        });
    }

    let mut sum = vec![0.0f32; dim];
    let mut count = 0.0f32;
    for (t, row) in data.chunks(dim).enumerate() {
        if mask.get(t).copied().unwrap_or(0) == 0 {
            continue;
        }
        for (acc, v) in sum.iter_mut().zip(row) {
            *acc += v;
        }
        count += 1.0;
    }

    if count > 0.0 {
        for v in &mut sum {
            *v /= count;
        }
    }
    Ok(sum)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_respects_mask() {
        let data = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&data, &[1, 1, 0], 3, 2).unwrap();
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_pool_shape_mismatch() {
        assert!(mean_pool(&[1.0, 2.0, 3.0], &[1], 2, 2).is_err());
    }

    #[test]
    fn test_missing_model_dir() {
        let err = OnnxSentimentModel::load(Path::new("/nonexistent/model"), false).unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotLoaded(_)));
    }
}
