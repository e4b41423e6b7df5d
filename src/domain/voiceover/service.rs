use super::cache::VoiceoverCache;
use super::error::VoiceoverServiceError;
use super::model::AudioOffset;
use crate::domain::content::{fingerprint, normalize};
use crate::infrastructure::repositories::{BlobStore, SpeechSynthesisRepository};
use async_trait::async_trait;
use std::sync::Arc;

const AUDIO_MIMETYPE: &str = "audio/mpeg";

/// Coordinates voiceover regeneration for one piece of lesson content:
/// normalize the markup, consult the cache, synthesize on a verified miss,
/// and keep the audio blob, cache record, and timing offsets consistent.
pub struct VoiceoverService {
    cache: VoiceoverCache,
    synthesis_repo: Arc<dyn SpeechSynthesisRepository>,
    blob_store: Arc<dyn BlobStore>,
}

impl VoiceoverService {
    pub fn new(
        cache: VoiceoverCache,
        synthesis_repo: Arc<dyn SpeechSynthesisRepository>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            cache,
            synthesis_repo,
            blob_store,
        }
    }

    /// Audio artifacts live under a per-entity `audio/` namespace.
    fn audio_blob_key(entity_id: &str, voiceover_filename: &str) -> String {
        format!("{}/audio/{}", entity_id, voiceover_filename)
    }
}

#[async_trait]
pub trait VoiceoverServiceApi: Send + Sync {
    /// Regenerate the voiceover for the given lesson content.
    ///
    /// This operation:
    /// - Normalizes the rich markup into speech-ready plain text
    /// - Reuses previously synthesized audio on a verified cache hit
    /// - Otherwise synthesizes, commits the audio blob, then updates the
    ///   cache (resolving fingerprint collisions)
    ///
    /// Returns the ordered word-level timing sequence for the audio that
    /// now lives under the target filename. On synthesis failure nothing
    /// is written: no blob, no cache entry.
    async fn regenerate_voiceover(
        &self,
        entity_id: &str,
        content_html: &str,
        language_accent_code: &str,
        voiceover_filename: &str,
    ) -> Result<Vec<AudioOffset>, VoiceoverServiceError>;
}

#[async_trait]
impl VoiceoverServiceApi for VoiceoverService {
    async fn regenerate_voiceover(
        &self,
        entity_id: &str,
        content_html: &str,
        language_accent_code: &str,
        voiceover_filename: &str,
    ) -> Result<Vec<AudioOffset>, VoiceoverServiceError> {
        let provider = self.synthesis_repo.provider_id();
        let target_key = Self::audio_blob_key(entity_id, voiceover_filename);

        tracing::info!(
            entity_id = entity_id,
            accent = language_accent_code,
            provider = provider,
            markup_length = content_html.len(),
            "Voiceover regeneration request"
        );

        // 1. Normalize the markup and fingerprint the result.
        let plaintext = normalize(content_html);
        let hash_code = fingerprint(&plaintext);

        tracing::debug!(
            text_length = plaintext.len(),
            hash_code = %hash_code,
            "Content normalized"
        );

        // 2. Cache lookup. Fingerprint equality is only a candidate match;
        //    the stored plaintext decides whether the hit is genuine.
        let cached = self
            .cache
            .lookup(language_accent_code, &hash_code, provider)
            .await?;

        if let Some(entry) = &cached {
            if entry.plaintext == plaintext {
                let audio = self
                    .blob_store
                    .get(&entry.voiceover_filename)
                    .await
                    .map_err(VoiceoverServiceError::from)?;
                self.blob_store
                    .commit(&target_key, &audio, AUDIO_MIMETYPE)
                    .await
                    .map_err(VoiceoverServiceError::from)?;

                tracing::info!(
                    entity_id = entity_id,
                    source_blob = %entry.voiceover_filename,
                    target_blob = %target_key,
                    "Voiceover cache hit - reusing synthesized audio"
                );
                return Ok(entry.audio_offsets.clone());
            }

            tracing::warn!(
                hash_code = %hash_code,
                "Fingerprint collision: cached plaintext differs from candidate"
            );
        }

        // 3. Miss (or collision): synthesize. A failure here leaves the
        //    blob store and cache untouched.
        let speech = self
            .synthesis_repo
            .synthesize(&plaintext, language_accent_code)
            .await?;

        // 4. Commit the audio first; a crash after this point leaves at
        //    worst an orphaned blob, never a cache entry without audio.
        self.blob_store
            .commit(&target_key, &speech.audio, AUDIO_MIMETYPE)
            .await
            .map_err(VoiceoverServiceError::from)?;

        // 5. Cache update: fresh slot or collision reconciliation.
        match cached {
            None => {
                self.cache
                    .store_new(
                        language_accent_code,
                        &plaintext,
                        &target_key,
                        speech.audio_offsets.clone(),
                        provider,
                    )
                    .await?;
            }
            Some(existing) => {
                self.cache
                    .reconcile_on_collision(
                        &existing,
                        &plaintext,
                        &target_key,
                        speech.audio_offsets.clone(),
                    )
                    .await?;
            }
        }

        tracing::info!(
            entity_id = entity_id,
            target_blob = %target_key,
            audio_size_bytes = speech.audio.len(),
            offset_count = speech.audio_offsets.len(),
            "Voiceover regenerated"
        );

        Ok(speech.audio_offsets)
    }
}
