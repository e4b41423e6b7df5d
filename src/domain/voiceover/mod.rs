pub mod cache;
pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use cache::VoiceoverCache;
pub use error::{SynthesisError, VoiceoverServiceError};
pub use model::{AudioOffset, CachedVoiceover};
pub use service::{VoiceoverService, VoiceoverServiceApi};
