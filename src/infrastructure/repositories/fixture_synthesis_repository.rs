use super::synthesis_repository::{SpeechSynthesisRepository, SynthesizedSpeech};
use crate::domain::voiceover::error::SynthesisError;
use crate::domain::voiceover::model::AudioOffset;
use async_trait::async_trait;
use std::path::PathBuf;

/// Pre-recorded samples bundled with the repository, keyed by bare
/// language code.
const LANGUAGE_CODE_TO_SAMPLE_FILENAMES: [(&str, &str); 4] = [
    ("ar", "arabic.mp3"),
    ("en", "english.mp3"),
    ("hi", "hindi.mp3"),
    ("pt", "portuguese.mp3"),
];

const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Deterministic offline implementation of the speech synthesis repository.
///
/// Keeps the orchestrator and cache fully testable without the live
/// provider: audio comes from local sample files and timing is a fixed
/// canned sequence.
pub struct FixtureSynthesisRepository {
    samples_dir: PathBuf,
}

impl FixtureSynthesisRepository {
    pub fn new(samples_dir: impl Into<PathBuf>) -> Self {
        Self {
            samples_dir: samples_dir.into(),
        }
    }

    /// The bare language code is everything before the accent suffix,
    /// e.g. `pt-BR` -> `pt`.
    fn language_code_from_accent(language_accent_code: &str) -> &str {
        language_accent_code
            .split('-')
            .next()
            .unwrap_or(language_accent_code)
    }

    fn sample_filename_for(language_accent_code: &str) -> &'static str {
        let language_code = Self::language_code_from_accent(language_accent_code);
        LANGUAGE_CODE_TO_SAMPLE_FILENAMES
            .iter()
            .find(|(code, _)| *code == language_code)
            .or_else(|| {
                LANGUAGE_CODE_TO_SAMPLE_FILENAMES
                    .iter()
                    .find(|(code, _)| *code == DEFAULT_LANGUAGE_CODE)
            })
            .map(|(_, filename)| *filename)
            .unwrap_or("english.mp3")
    }

    fn canned_audio_offsets() -> Vec<AudioOffset> {
        vec![
            AudioOffset::new("This", 0.0),
            AudioOffset::new("is", 100.0),
            AudioOffset::new("a", 200.0),
            AudioOffset::new("test", 300.0),
            AudioOffset::new("text", 400.0),
        ]
    }
}

#[async_trait]
impl SpeechSynthesisRepository for FixtureSynthesisRepository {
    fn provider_id(&self) -> &'static str {
        "fixture"
    }

    async fn synthesize(
        &self,
        _text: &str,
        language_accent_code: &str,
    ) -> Result<SynthesizedSpeech, SynthesisError> {
        let filename = Self::sample_filename_for(language_accent_code);
        let path = self.samples_dir.join(filename);

        let audio = tokio::fs::read(&path).await.map_err(|e| {
            SynthesisError::Failed(format!(
                "failed to read sample voiceover {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::debug!(
            accent = language_accent_code,
            sample = filename,
            audio_size_bytes = audio.len(),
            "Fixture synthesis served pre-recorded sample"
        );

        Ok(SynthesizedSpeech {
            audio,
            audio_offsets: Self::canned_audio_offsets(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample(dir: &std::path::Path, filename: &str, contents: &[u8]) {
        std::fs::write(dir.join(filename), contents).unwrap();
    }

    #[test]
    fn test_language_code_from_accent() {
        assert_eq!(FixtureSynthesisRepository::language_code_from_accent("pt-BR"), "pt");
        assert_eq!(FixtureSynthesisRepository::language_code_from_accent("en"), "en");
    }

    #[test]
    fn test_sample_filename_falls_back_to_english() {
        assert_eq!(FixtureSynthesisRepository::sample_filename_for("hi-IN"), "hindi.mp3");
        assert_eq!(FixtureSynthesisRepository::sample_filename_for("fr-FR"), "english.mp3");
    }

    #[tokio::test]
    async fn test_synthesize_reads_language_sample() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path(), "hindi.mp3", b"hindi-audio");
        let repo = FixtureSynthesisRepository::new(dir.path());

        let speech = repo.synthesize("ignored text", "hi-IN").await.unwrap();
        assert_eq!(speech.audio, b"hindi-audio");
        assert_eq!(speech.audio_offsets.len(), 5);
        assert_eq!(speech.audio_offsets[0], AudioOffset::new("This", 0.0));
        assert_eq!(speech.audio_offsets[4], AudioOffset::new("text", 400.0));
    }

    #[tokio::test]
    async fn test_synthesize_unknown_language_uses_default_sample() {
        let dir = tempfile::tempdir().unwrap();
        write_sample(dir.path(), "english.mp3", b"english-audio");
        let repo = FixtureSynthesisRepository::new(dir.path());

        let speech = repo.synthesize("text", "de-DE").await.unwrap();
        assert_eq!(speech.audio, b"english-audio");
    }

    #[tokio::test]
    async fn test_synthesize_missing_sample_is_structured_failure() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FixtureSynthesisRepository::new(dir.path());

        let err = repo.synthesize("text", "en-US").await.unwrap_err();
        assert!(matches!(err, SynthesisError::Failed(_)));
    }
}
