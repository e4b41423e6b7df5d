use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::voiceover::{
        dto::{RegenerateVoiceoverRequest, RegenerateVoiceoverResponse},
        VoiceoverServiceApi,
    },
    error::{AppError, AppResult},
};

/// Largest accepted markup payload, in bytes.
const MAX_CONTENT_LENGTH: usize = 50_000;

pub struct VoiceoverController {
    voiceover_service: Arc<dyn VoiceoverServiceApi>,
}

impl VoiceoverController {
    pub fn new(voiceover_service: Arc<dyn VoiceoverServiceApi>) -> Self {
        Self { voiceover_service }
    }

    /// POST /api/voiceovers/regenerate - Regenerate the voiceover for one
    /// piece of lesson content
    pub async fn regenerate(
        State(controller): State<Arc<VoiceoverController>>,
        Json(request): Json<RegenerateVoiceoverRequest>,
    ) -> AppResult<(StatusCode, Json<RegenerateVoiceoverResponse>)> {
        // Validate input
        if request.entity_id.is_empty() {
            return Err(AppError::BadRequest("entity_id cannot be empty".to_string()));
        }

        if request.content_html.is_empty() {
            return Err(AppError::BadRequest(
                "content_html cannot be empty".to_string(),
            ));
        }

        if request.content_html.len() > MAX_CONTENT_LENGTH {
            return Err(AppError::PayloadTooLarge(format!(
                "content_html must be {} bytes or less",
                MAX_CONTENT_LENGTH
            )));
        }

        if request.language_accent_code.is_empty() {
            return Err(AppError::BadRequest(
                "language_accent_code cannot be empty".to_string(),
            ));
        }

        if request.voiceover_filename.is_empty() || request.voiceover_filename.contains('/') {
            return Err(AppError::BadRequest(
                "voiceover_filename must be a bare filename".to_string(),
            ));
        }

        let audio_offsets = controller
            .voiceover_service
            .regenerate_voiceover(
                &request.entity_id,
                &request.content_html,
                &request.language_accent_code,
                &request.voiceover_filename,
            )
            .await
            .map_err(AppError::from)?;

        Ok((
            StatusCode::OK,
            Json(RegenerateVoiceoverResponse { audio_offsets }),
        ))
    }
}
