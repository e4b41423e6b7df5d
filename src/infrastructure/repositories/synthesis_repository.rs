use crate::domain::voiceover::error::SynthesisError;
use crate::domain::voiceover::model::AudioOffset;
use async_trait::async_trait;

/// A successful synthesis: raw MP3 bytes plus word-level timing in
/// utterance order. Degenerate providers may legitimately return an empty
/// or canned timing sequence.
#[derive(Debug, Clone)]
pub struct SynthesizedSpeech {
    pub audio: Vec<u8>,
    pub audio_offsets: Vec<AudioOffset>,
}

/// Repository for speech synthesis operations.
/// Abstracts the underlying provider (AWS Polly in production, local
/// fixtures in development).
///
/// Implementations are responsible for:
/// - Failing fast on missing credentials or unmapped accent codes,
///   before any remote call
/// - Provider-specific voice selection and request markup
/// - Bounding remote calls with a timeout
/// - Collecting per-token timing in milliseconds
#[async_trait]
pub trait SpeechSynthesisRepository: Send + Sync {
    /// Stable identifier recorded in cache keys so entries from different
    /// providers never alias.
    fn provider_id(&self) -> &'static str;

    /// Synthesize normalized text to speech for a given language accent.
    async fn synthesize(
        &self,
        text: &str,
        language_accent_code: &str,
    ) -> Result<SynthesizedSpeech, SynthesisError>;
}
