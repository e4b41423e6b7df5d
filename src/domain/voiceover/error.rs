use crate::error::AppError;

/// Structured failures from a speech synthesis provider. All variants are
/// terminal for the request: the orchestrator never retries and never
/// commits partial state when one of these surfaces.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("synthesis credential is not available: {0}")]
    CredentialMissing(String),
    #[error("no synthesis voice is mapped for language accent code '{0}'")]
    UnsupportedAccent(String),
    #[error("speech synthesis failed: {0}")]
    Failed(String),
    #[error("speech synthesis timed out after {0} seconds")]
    Timeout(u64),
}

#[derive(Debug, thiserror::Error)]
pub enum VoiceoverServiceError {
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for VoiceoverServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => VoiceoverServiceError::Invalid(msg),
            _ => VoiceoverServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<VoiceoverServiceError> for AppError {
    fn from(err: VoiceoverServiceError) -> Self {
        match err {
            VoiceoverServiceError::Synthesis(e) => AppError::SynthesisFailed(e.to_string()),
            VoiceoverServiceError::Invalid(msg) => AppError::BadRequest(msg),
            VoiceoverServiceError::Dependency(msg) => AppError::ExternalService(msg),
            VoiceoverServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
