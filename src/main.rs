use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lessonvoice_backend::controllers::voiceover::VoiceoverController;
use lessonvoice_backend::domain::voiceover::{VoiceoverCache, VoiceoverService};
use lessonvoice_backend::infrastructure::config::{Config, LogFormat, SynthesisProvider};
use lessonvoice_backend::infrastructure::db::create_pool;
use lessonvoice_backend::infrastructure::http::start_http_server;
use lessonvoice_backend::infrastructure::repositories::{
    BlobStore, CacheStore, EnvSecretsRepository, FixtureSynthesisRepository, FsBlobStore,
    InMemoryCacheStore, PollySynthesisRepository, PostgresCacheStore, S3BlobStore,
    SpeechSynthesisRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting LessonVoice Backend on {}:{}",
        config.host,
        config.port
    );

    // Voiceover cache store: Postgres when configured, in-memory otherwise
    let pool = match &config.database_url {
        Some(database_url) => {
            let pool = create_pool(database_url).await?;
            tracing::info!("Database connection pool created");
            Some(pool)
        }
        None => {
            tracing::info!("No DATABASE_URL set; using in-memory voiceover cache store");
            None
        }
    };

    let cache_store: Arc<dyn CacheStore> = match &pool {
        Some(pool) => {
            let store = PostgresCacheStore::new(Arc::new(pool.clone()));
            store.ensure_schema().await?;
            tracing::info!("Voiceover cache schema verified");
            Arc::new(store)
        }
        None => Arc::new(InMemoryCacheStore::new()),
    };

    // AWS configuration is shared by Polly and S3
    let needs_aws = config.synthesis_provider == SynthesisProvider::Polly
        || config.s3_audio_bucket.is_some();
    let aws_config = if needs_aws {
        let loaded = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        tracing::info!(region = ?loaded.region(), "AWS configuration loaded");
        Some(loaded)
    } else {
        None
    };

    // Blob store: S3 when a bucket is configured, local filesystem otherwise
    let blob_store: Arc<dyn BlobStore> = match &config.s3_audio_bucket {
        Some(bucket) => {
            let aws_config = aws_config.as_ref().expect("AWS config loaded for S3");
            let s3_client = Arc::new(aws_sdk_s3::Client::new(aws_config));
            tracing::info!(bucket = %bucket, "Using S3 blob store");
            Arc::new(S3BlobStore::new(s3_client, bucket.clone()))
        }
        None => {
            tracing::info!(dir = %config.audio_storage_dir, "Using filesystem blob store");
            Arc::new(FsBlobStore::new(config.audio_storage_dir.clone()))
        }
    };

    // Speech synthesis provider, selected once at startup
    let synthesis_repo: Arc<dyn SpeechSynthesisRepository> = match config.synthesis_provider {
        SynthesisProvider::Polly => {
            let aws_config = aws_config.as_ref().expect("AWS config loaded for Polly");
            let polly_client = Arc::new(aws_sdk_polly::Client::new(aws_config));
            tracing::info!("Using AWS Polly synthesis provider");
            Arc::new(PollySynthesisRepository::new(
                polly_client,
                Arc::new(EnvSecretsRepository),
                Duration::from_secs(config.synthesis_timeout_secs),
            ))
        }
        SynthesisProvider::Fixture => {
            tracing::info!(
                samples = %config.sample_voiceovers_dir,
                "Using fixture synthesis provider"
            );
            Arc::new(FixtureSynthesisRepository::new(
                config.sample_voiceovers_dir.clone(),
            ))
        }
    };

    // === DEPENDENCY INJECTION SETUP ===
    tracing::info!("Instantiating services...");
    let voiceover_service = Arc::new(VoiceoverService::new(
        VoiceoverCache::new(cache_store),
        synthesis_repo,
        blob_store,
    ));

    tracing::info!("Instantiating controllers...");
    let voiceover_controller = Arc::new(VoiceoverController::new(voiceover_service));

    // Start HTTP server with all routes
    let config = Arc::new(config);
    start_http_server(config, Arc::new(pool), voiceover_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lessonvoice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lessonvoice_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
