//! Generation history.
//!
//! The generator hands every finished track to a [`HistorySink`]. The
//! built-in [`RecentHistory`] keeps the newest records in memory.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::mood::{MoodCategory, MusicalKey, MusicalParameters};
use crate::synthesis::GenerationMethod;

/// One finished generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub timestamp: DateTime<Utc>,
    pub mood_input: String,
    pub mood_category: MoodCategory,
    pub energy_level: u8,
    pub tempo: u16,
    pub key: MusicalKey,
    pub instruments: Vec<String>,
    pub audio_file_path: String,
    pub generation_method: GenerationMethod,
}

impl GenerationRecord {
    pub fn new(params: &MusicalParameters, path: &Path, method: GenerationMethod) -> Self {
        Self {
            timestamp: Utc::now(),
            mood_input: params.original_input.clone(),
            mood_category: params.mood_category,
            energy_level: params.energy_level,
            tempo: params.tempo,
            key: params.key,
            instruments: params.instruments.clone(),
            audio_file_path: path.display().to_string(),
            generation_method: method,
        }
    }
}

/// Receives generation records. Implementations must not block for long or fail loudly.
pub trait HistorySink: Send + Sync {
    fn record(&self, record: GenerationRecord);
}

/// Bounded in-memory history, oldest records dropped first
#[derive(Debug)]
pub struct RecentHistory {
    records: RwLock<VecDeque<GenerationRecord>>,
    capacity: usize,
}

impl RecentHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Records, newest first, at most `limit`
    pub fn recent(&self, limit: usize) -> Vec<GenerationRecord> {
        match self.records.read() {
            Ok(records) => records.iter().rev().take(limit).cloned().collect(),
            Err(e) => {
                warn!(error = %e, "History lock poisoned");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl HistorySink for RecentHistory {
    fn record(&self, record: GenerationRecord) {
        match self.records.write() {
            Ok(mut records) => {
                while records.len() >= self.capacity {
                    records.pop_front();
                }
                records.push_back(record);
            }
            Err(e) => warn!(error = %e, "History lock poisoned, dropping record"),
        }
    }
}
