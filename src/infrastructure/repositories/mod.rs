pub mod blob_repository;
pub mod cache_store;
pub mod fixture_synthesis_repository;
pub mod polly_synthesis_repository;
pub mod secrets_repository;
pub mod synthesis_repository;

pub use blob_repository::{BlobStore, FsBlobStore, S3BlobStore};
pub use cache_store::{CacheStore, InMemoryCacheStore, PostgresCacheStore};
pub use fixture_synthesis_repository::FixtureSynthesisRepository;
pub use polly_synthesis_repository::PollySynthesisRepository;
pub use secrets_repository::{EnvSecretsRepository, SecretsRepository};
pub use synthesis_repository::{SpeechSynthesisRepository, SynthesizedSpeech};
