use super::secrets_repository::SecretsRepository;
use super::synthesis_repository::{SpeechSynthesisRepository, SynthesizedSpeech};
use crate::domain::content::CONTENT_SEGMENT_DELIMITER;
use crate::domain::voiceover::error::SynthesisError;
use crate::domain::voiceover::model::AudioOffset;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, SpeechMarkType, TextType, VoiceId},
    Client as PollyClient,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Credentials that must be resolvable before any remote call is attempted.
const REQUIRED_CREDENTIALS: [&str; 2] = ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"];

/// Arithmetic symbols that mark a text segment as mathematical, so that it
/// is announced with math phrasing rather than read as prose.
const ARITHMETIC_EXPRESSIONS: [&str; 6] = ["+", " - ", "*", " / ", "×", "÷"];

/// AWS Polly implementation of the speech synthesis repository.
///
/// Word-level timing comes from Polly's speech-marks channel: a second
/// synthesis call with JSON output whose marks already carry millisecond
/// offsets.
pub struct PollySynthesisRepository {
    polly_client: Arc<PollyClient>,
    secrets: Arc<dyn SecretsRepository>,
    synthesis_timeout: Duration,
}

/// One line of Polly's newline-delimited JSON speech-mark output.
#[derive(Debug, Deserialize)]
struct SpeechMark {
    time: f64,
    #[serde(rename = "type")]
    mark_type: String,
    value: String,
}

impl PollySynthesisRepository {
    pub fn new(
        polly_client: Arc<PollyClient>,
        secrets: Arc<dyn SecretsRepository>,
        synthesis_timeout: Duration,
    ) -> Self {
        Self {
            polly_client,
            secrets,
            synthesis_timeout,
        }
    }

    /// Select the Polly voice for a language accent code. Unmapped accents
    /// are rejected before any remote call.
    fn voice_for_accent(language_accent_code: &str) -> Option<&'static str> {
        let voice = match language_accent_code {
            "en-US" => "Joanna",
            "en-GB" => "Amy",
            "en-IN" => "Kajal",
            "es-ES" => "Lucia",
            "es-MX" => "Mia",
            "fr-FR" => "Lea",
            "de-DE" => "Vicki",
            "it-IT" => "Bianca",
            "pt-BR" => "Camila",
            "pt-PT" => "Ines",
            "hi-IN" => "Kajal",
            "ar-AE" => "Hala",
            "nl-NL" => "Laura",
            "ja-JP" => "Takumi",
            "ko-KR" => "Seoyeon",
            "zh-CN" => "Zhiyu",
            _ => return None,
        };
        Some(voice)
    }

    /// True when a segment contains arithmetic content.
    fn is_mathematical_text(text: &str) -> bool {
        ARITHMETIC_EXPRESSIONS
            .iter()
            .any(|expression| text.contains(expression))
    }

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;")
    }

    /// Rebuilds the normalized text as SSML: each delimiter-separated
    /// segment is wrapped in a math or prose block, the whole in a language
    /// envelope.
    fn build_ssml(text: &str, language_accent_code: &str) -> String {
        let mut content = String::new();
        for segment in text.split(CONTENT_SEGMENT_DELIMITER) {
            if segment.is_empty() {
                continue;
            }
            let escaped = Self::escape_xml(segment);
            if Self::is_mathematical_text(segment) {
                content.push_str(&format!(
                    "<say-as interpret-as=\"math\">{}</say-as>",
                    escaped
                ));
            } else {
                content.push_str(&format!("<p>{}</p>", escaped));
            }
        }

        format!(
            "<speak><lang xml:lang=\"{}\">{}</lang></speak>",
            language_accent_code, content
        )
    }

    fn check_credentials(&self) -> Result<(), SynthesisError> {
        for name in REQUIRED_CREDENTIALS {
            if self.secrets.get_secret(name).is_none() {
                return Err(SynthesisError::CredentialMissing(format!(
                    "{} is not set",
                    name
                )));
            }
        }
        Ok(())
    }

    async fn bounded<T, F>(&self, future: F) -> Result<T, SynthesisError>
    where
        F: std::future::Future<Output = Result<T, SynthesisError>>,
    {
        tokio::time::timeout(self.synthesis_timeout, future)
            .await
            .map_err(|_| SynthesisError::Timeout(self.synthesis_timeout.as_secs()))?
    }

    /// Synthesize the SSML document to MP3 audio bytes.
    async fn call_polly_audio(&self, ssml: &str, voice: &str) -> Result<Vec<u8>, SynthesisError> {
        let result = self
            .polly_client
            .synthesize_speech()
            .text_type(TextType::Ssml)
            .text(ssml)
            .voice_id(VoiceId::from(voice))
            .output_format(OutputFormat::Mp3)
            .engine(Engine::Neural)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice = voice, "AWS Polly synthesize_speech failed");
                SynthesisError::Failed(format!("AWS Polly error: {}", e))
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            SynthesisError::Failed(format!("failed to read audio stream: {}", e))
        })?;

        Ok(audio_stream.into_bytes().to_vec())
    }

    /// Request word-granularity speech marks for the same SSML document.
    async fn call_polly_speech_marks(
        &self,
        ssml: &str,
        voice: &str,
    ) -> Result<Vec<AudioOffset>, SynthesisError> {
        let result = self
            .polly_client
            .synthesize_speech()
            .text_type(TextType::Ssml)
            .text(ssml)
            .voice_id(VoiceId::from(voice))
            .output_format(OutputFormat::Json)
            .speech_mark_types(SpeechMarkType::Word)
            .engine(Engine::Neural)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, voice = voice, "AWS Polly speech marks request failed");
                SynthesisError::Failed(format!("AWS Polly error: {}", e))
            })?;

        let marks_stream = result.audio_stream.collect().await.map_err(|e| {
            SynthesisError::Failed(format!("failed to read speech marks stream: {}", e))
        })?;

        Ok(Self::parse_speech_marks(&marks_stream.into_bytes()))
    }

    /// Parses Polly's newline-delimited JSON speech marks into ordered
    /// millisecond offsets. Non-word marks and unparseable lines are
    /// skipped.
    fn parse_speech_marks(data: &[u8]) -> Vec<AudioOffset> {
        let text = String::from_utf8_lossy(data);
        text.lines()
            .filter_map(|line| serde_json::from_str::<SpeechMark>(line.trim()).ok())
            .filter(|mark| mark.mark_type == "word")
            .map(|mark| AudioOffset::new(mark.value, mark.time))
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesisRepository for PollySynthesisRepository {
    fn provider_id(&self) -> &'static str {
        "polly"
    }

    async fn synthesize(
        &self,
        text: &str,
        language_accent_code: &str,
    ) -> Result<SynthesizedSpeech, SynthesisError> {
        self.check_credentials()?;

        let voice = Self::voice_for_accent(language_accent_code).ok_or_else(|| {
            SynthesisError::UnsupportedAccent(language_accent_code.to_string())
        })?;

        let ssml = Self::build_ssml(text, language_accent_code);

        tracing::info!(
            accent = language_accent_code,
            voice = voice,
            text_length = text.len(),
            ssml_length = ssml.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let start_time = std::time::Instant::now();
        let audio = self.bounded(self.call_polly_audio(&ssml, voice)).await?;
        let audio_offsets = self
            .bounded(self.call_polly_speech_marks(&ssml, voice))
            .await?;

        tracing::info!(
            provider = "polly",
            latency_ms = start_time.elapsed().as_millis(),
            audio_size_bytes = audio.len(),
            offset_count = audio_offsets.len(),
            "Speech synthesis completed"
        );

        Ok(SynthesizedSpeech {
            audio,
            audio_offsets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_for_accent_known_codes() {
        assert_eq!(PollySynthesisRepository::voice_for_accent("en-US"), Some("Joanna"));
        assert_eq!(PollySynthesisRepository::voice_for_accent("pt-BR"), Some("Camila"));
    }

    #[test]
    fn test_voice_for_accent_unmapped_code() {
        assert_eq!(PollySynthesisRepository::voice_for_accent("xx-YY"), None);
        assert_eq!(PollySynthesisRepository::voice_for_accent("en"), None);
    }

    #[test]
    fn test_is_mathematical_text() {
        assert!(PollySynthesisRepository::is_mathematical_text("2 + 2"));
        assert!(PollySynthesisRepository::is_mathematical_text("10 ÷ 2"));
        assert!(PollySynthesisRepository::is_mathematical_text("a × b"));
        assert!(!PollySynthesisRepository::is_mathematical_text("plain prose"));
        // A hyphenated word is not arithmetic; only a spaced minus is.
        assert!(!PollySynthesisRepository::is_mathematical_text("well-known fact"));
        assert!(PollySynthesisRepository::is_mathematical_text("5 - 3"));
    }

    #[test]
    fn test_build_ssml_wraps_prose_and_math_segments() {
        let text = "An equation; 2 + 2 = 4";
        let ssml = PollySynthesisRepository::build_ssml(text, "en-US");

        assert!(ssml.starts_with("<speak><lang xml:lang=\"en-US\">"));
        assert!(ssml.ends_with("</lang></speak>"));
        assert!(ssml.contains("<p>An equation</p>"));
        assert!(ssml.contains("<say-as interpret-as=\"math\">2 + 2 = 4</say-as>"));
    }

    #[test]
    fn test_build_ssml_escapes_segment_text() {
        let ssml = PollySynthesisRepository::build_ssml("Tom & Jerry <3", "en-US");
        assert!(ssml.contains("Tom &amp; Jerry &lt;3"));
        assert!(!ssml.contains("Tom & Jerry"));
    }

    #[test]
    fn test_parse_speech_marks_filters_word_marks() {
        let data = concat!(
            "{\"time\":6,\"type\":\"sentence\",\"start\":0,\"end\":11,\"value\":\"Hello world\"}\n",
            "{\"time\":6,\"type\":\"word\",\"start\":0,\"end\":5,\"value\":\"Hello\"}\n",
            "{\"time\":374,\"type\":\"word\",\"start\":6,\"end\":11,\"value\":\"world\"}\n",
            "not json at all\n"
        );
        let offsets = PollySynthesisRepository::parse_speech_marks(data.as_bytes());

        assert_eq!(
            offsets,
            vec![
                AudioOffset::new("Hello", 6.0),
                AudioOffset::new("world", 374.0),
            ]
        );
    }

    #[test]
    fn test_parse_speech_marks_empty_input() {
        assert!(PollySynthesisRepository::parse_speech_marks(b"").is_empty());
    }

    /// Secrets double: either every credential resolves or none does.
    struct StaticSecrets(bool);

    impl SecretsRepository for StaticSecrets {
        fn get_secret(&self, _name: &str) -> Option<String> {
            self.0.then(|| "present".to_string())
        }
    }

    fn offline_client() -> Arc<PollyClient> {
        let conf = aws_sdk_polly::Config::builder()
            .behavior_version(aws_sdk_polly::config::BehaviorVersion::latest())
            .build();
        Arc::new(PollyClient::from_conf(conf))
    }

    #[tokio::test]
    async fn test_unmapped_accent_fails_before_any_remote_call() {
        let repo = PollySynthesisRepository::new(
            offline_client(),
            Arc::new(StaticSecrets(true)),
            Duration::from_secs(5),
        );

        let err = repo.synthesize("some text", "xx-YY").await.unwrap_err();
        assert!(matches!(err, SynthesisError::UnsupportedAccent(_)));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_fast() {
        let repo = PollySynthesisRepository::new(
            offline_client(),
            Arc::new(StaticSecrets(false)),
            Duration::from_secs(5),
        );

        let err = repo.synthesize("some text", "en-US").await.unwrap_err();
        assert!(matches!(err, SynthesisError::CredentialMissing(_)));
    }
}
