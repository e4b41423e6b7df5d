use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::content::fingerprint;

/// A single word-or-punctuation token paired with the millisecond offset at
/// which it is spoken in the synthesized audio. Sequences are ordered by
/// utterance order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioOffset {
    pub token: String,
    pub audio_offset_msecs: f64,
}

impl AudioOffset {
    pub fn new(token: impl Into<String>, audio_offset_msecs: f64) -> Self {
        Self {
            token: token.into(),
            audio_offset_msecs,
        }
    }
}

/// One cached synthesis result: a single mutable slot per
/// (accent, fingerprint, provider) key.
///
/// The stored plaintext is kept so that a lookup can verify a hit
/// bit-for-bit; fingerprint equality alone is never treated as a genuine
/// match. `voiceover_filename` references the committed audio blob, which is
/// owned by the blob store, not by this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedVoiceover {
    pub language_accent_code: String,
    pub provider: String,
    pub hash_code: String,
    pub plaintext: String,
    pub voiceover_filename: String,
    pub audio_offsets: Vec<AudioOffset>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedVoiceover {
    pub fn new(
        language_accent_code: impl Into<String>,
        provider: impl Into<String>,
        plaintext: impl Into<String>,
        voiceover_filename: impl Into<String>,
        audio_offsets: Vec<AudioOffset>,
    ) -> Self {
        let plaintext = plaintext.into();
        let now = Utc::now();
        Self {
            language_accent_code: language_accent_code.into(),
            provider: provider.into(),
            hash_code: fingerprint(&plaintext),
            plaintext,
            voiceover_filename: voiceover_filename.into(),
            audio_offsets,
            created_at: now,
            updated_at: now,
        }
    }

    /// The persistence id for this entry:
    /// `<accent>:<fingerprint-hex>:<provider-id>`.
    pub fn cache_id(&self) -> String {
        generate_cache_id(&self.language_accent_code, &self.hash_code, &self.provider)
    }
}

/// Builds the cache key for a (accent, fingerprint, provider) triple.
pub fn generate_cache_id(language_accent_code: &str, hash_code: &str, provider: &str) -> String {
    format!("{}:{}:{}", language_accent_code, hash_code, provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_id_format() {
        let id = generate_cache_id("en-US", "abc123", "polly");
        assert_eq!(id, "en-US:abc123:polly");
    }

    #[test]
    fn test_new_entry_computes_fingerprint_from_plaintext() {
        let entry = CachedVoiceover::new("en-US", "polly", "Hello world", "e1/audio/v.mp3", vec![]);
        assert_eq!(entry.hash_code, fingerprint("Hello world"));
        assert_eq!(entry.cache_id(), format!("en-US:{}:polly", entry.hash_code));
    }

    #[test]
    fn test_audio_offset_serialization_field_names() {
        let offset = AudioOffset::new("Hello", 125.5);
        let json = serde_json::to_value(&offset).unwrap();
        assert_eq!(json["token"], "Hello");
        assert_eq!(json["audio_offset_msecs"], 125.5);
    }
}
