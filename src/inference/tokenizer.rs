//! Minimal WordPiece tokenizer for BERT-family text models.
//!
//! Reads a `vocab.txt` (one token per line, line number = id), lowercases,
//! splits on whitespace and punctuation, then greedily matches the longest
//! vocabulary piece, continuing pieces prefixed with `##`.

use std::collections::HashMap;
use std::path::Path;

use super::InferenceError;

const CLS: &str = "[CLS]";
const SEP: &str = "[SEP]";
const UNK: &str = "[UNK]";
const PAD: &str = "[PAD]";

/// Words longer than this map straight to `[UNK]`
const MAX_WORD_CHARS: usize = 100;

/// Model inputs for one sequence, padded to `max_len`
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

impl Encoding {
    /// Number of non-padding positions
    pub fn len(&self) -> usize {
        self.attention_mask.iter().filter(|m| **m == 1).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: HashMap<String, i64>,
    cls_id: i64,
    sep_id: i64,
    unk_id: i64,
    pad_id: i64,
    max_len: usize,
}

impl WordPieceTokenizer {
    /// Load from a `vocab.txt` file
    pub fn from_file(path: &Path, max_len: usize) -> Result<Self, InferenceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_vocab(contents.lines(), max_len)
    }

    pub fn from_vocab<'a>(
        tokens: impl IntoIterator<Item = &'a str>,
        max_len: usize,
    ) -> Result<Self, InferenceError> {
        let vocab: HashMap<String, i64> = tokens
            .into_iter()
            .enumerate()
            .map(|(i, t)| (t.trim_end().to_string(), i as i64))
            .collect();

        let lookup = |token: &str| {
            vocab
                .get(token)
                .copied()
                .ok_or_else(|| InferenceError::Tokenizer(format!("vocabulary lacks {token}")))
        };

        Ok(Self {
            cls_id: lookup(CLS)?,
            sep_id: lookup(SEP)?,
            unk_id: lookup(UNK)?,
            pad_id: lookup(PAD)?,
            max_len: max_len.max(2),
            vocab,
        })
    }

    /// Encode text as `[CLS] pieces... [SEP]`, truncated and padded to the max length
    pub fn encode(&self, text: &str) -> Encoding {
        let mut ids = vec![self.cls_id];
        let budget = self.max_len - 2;

        for word in split_words(text) {
            let pieces = self.word_pieces(&word);
            let room = budget.saturating_sub(ids.len() - 1);
            if room == 0 {
                break;
            }
            ids.extend(pieces.into_iter().take(room));
        }
        ids.push(self.sep_id);

        let used = ids.len();
        let mut attention_mask = vec![1i64; used];
        attention_mask.resize(self.max_len, 0);
        ids.resize(self.max_len, self.pad_id);

        Encoding {
            input_ids: ids,
            attention_mask,
            token_type_ids: vec![0; self.max_len],
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Greedy longest-match-first segmentation of one word
    fn word_pieces(&self, word: &str) -> Vec<i64> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_CHARS {
            return vec![self.unk_id];
        }

        let mut pieces = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;

            while start < end {
                let mut candidate: String = chars[start..end].iter().collect();
                if start > 0 {
                    candidate.insert_str(0, "##");
                }
                if let Some(id) = self.vocab.get(&candidate) {
                    found = Some(*id);
                    break;
                }
                end -= 1;
            }

            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => return vec![self.unk_id],
            }
        }

        pieces
    }
}

/// Lowercase, split on whitespace, and emit punctuation as separate words
fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_ascii_punctuation() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            words.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}
