use super::error::VoiceoverServiceError;
use super::model::{generate_cache_id, AudioOffset, CachedVoiceover};
use crate::infrastructure::repositories::CacheStore;
use std::sync::Arc;

/// Content-addressed cache of synthesized voiceovers.
///
/// Each (accent, fingerprint, provider) key owns a single mutable slot.
/// Because fingerprints are an equality proxy and not unique identifiers,
/// a lookup result is only a genuine hit when its stored plaintext matches
/// the candidate text bit-for-bit; the caller is responsible for that
/// verification and for routing mismatches to `reconcile_on_collision`.
///
/// Collision policy: the slot keeps the shorter plaintext, on the guess
/// that shorter strings recur more often across lessons and so maximize
/// future hit rate. This is a heuristic with no correctness guarantee;
/// keying on a longer digest would make collisions negligible and retire
/// the policy altogether.
pub struct VoiceoverCache {
    store: Arc<dyn CacheStore>,
}

impl VoiceoverCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Pure key-value read; no plaintext verification happens here.
    pub async fn lookup(
        &self,
        language_accent_code: &str,
        hash_code: &str,
        provider: &str,
    ) -> Result<Option<CachedVoiceover>, VoiceoverServiceError> {
        let cache_id = generate_cache_id(language_accent_code, hash_code, provider);
        self.store
            .get(&cache_id)
            .await
            .map_err(VoiceoverServiceError::from)
    }

    /// Inserts a new entry, computing the fingerprint from `plaintext`.
    /// The caller guarantees that no entry currently exists at the key.
    pub async fn store_new(
        &self,
        language_accent_code: &str,
        plaintext: &str,
        voiceover_filename: &str,
        audio_offsets: Vec<AudioOffset>,
        provider: &str,
    ) -> Result<CachedVoiceover, VoiceoverServiceError> {
        let entry = CachedVoiceover::new(
            language_accent_code,
            provider,
            plaintext,
            voiceover_filename,
            audio_offsets,
        );

        self.store.put(&entry.cache_id(), &entry).await?;

        tracing::info!(
            cache_id = %entry.cache_id(),
            text_length = plaintext.len(),
            "New voiceover cache entry stored"
        );

        Ok(entry)
    }

    /// Resolves a fingerprint collision: the slot already holds an entry
    /// whose plaintext differs from the candidate's. The candidate takes
    /// over the slot only when its text is strictly shorter; otherwise the
    /// existing entry is left untouched. Returns whether the slot was
    /// updated.
    pub async fn reconcile_on_collision(
        &self,
        existing: &CachedVoiceover,
        candidate_plaintext: &str,
        candidate_filename: &str,
        candidate_offsets: Vec<AudioOffset>,
    ) -> Result<bool, VoiceoverServiceError> {
        if candidate_plaintext.len() >= existing.plaintext.len() {
            tracing::info!(
                cache_id = %existing.cache_id(),
                existing_length = existing.plaintext.len(),
                candidate_length = candidate_plaintext.len(),
                "Fingerprint collision: keeping existing shorter entry"
            );
            return Ok(false);
        }

        // The slot keeps its original key: the fingerprint of the entry is
        // the address, and both texts map to it.
        let mut updated = existing.clone();
        updated.plaintext = candidate_plaintext.to_string();
        updated.voiceover_filename = candidate_filename.to_string();
        updated.audio_offsets = candidate_offsets;
        updated.updated_at = chrono::Utc::now();

        self.store.put(&existing.cache_id(), &updated).await?;

        tracing::info!(
            cache_id = %existing.cache_id(),
            existing_length = existing.plaintext.len(),
            candidate_length = candidate_plaintext.len(),
            "Fingerprint collision: slot overwritten with shorter candidate"
        );

        Ok(true)
    }
}
