use super::model::AudioOffset;
use serde::{Deserialize, Serialize};

/// Request for POST /api/voiceovers/regenerate
#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateVoiceoverRequest {
    pub entity_id: String,
    pub content_html: String,
    pub language_accent_code: String,
    pub voiceover_filename: String,
}

/// Response for POST /api/voiceovers/regenerate
#[derive(Debug, Serialize, Deserialize)]
pub struct RegenerateVoiceoverResponse {
    pub audio_offsets: Vec<AudioOffset>,
}
