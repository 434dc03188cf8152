//! Bodies for the mood, generation and history endpoints.

use serde::{Deserialize, Serialize};

use crate::history::GenerationRecord;
use crate::mood::{MoodCategory, MoodProfile, MusicalParameters};

/// Request to analyze a mood description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

/// One mood category as listed by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodInfo {
    pub mood: MoodCategory,
    pub name: String,
    pub base_tempo: u16,
    pub instruments: Vec<String>,
    pub descriptor: String,
}

impl From<&MoodProfile> for MoodInfo {
    fn from(profile: &MoodProfile) -> Self {
        Self {
            mood: profile.category,
            name: profile.name.to_string(),
            base_tempo: profile.base_tempo,
            instruments: profile.instruments.iter().map(|s| s.to_string()).collect(),
            descriptor: profile.descriptor.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodListResponse {
    pub moods: Vec<MoodInfo>,
}

/// Request to generate a track.
///
/// `parameters` wins when both are given; at least one is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parameters: Option<MusicalParameters>,
}

/// Query string for `GET /history`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

fn default_history_limit() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Newest first
    pub records: Vec<GenerationRecord>,
}
