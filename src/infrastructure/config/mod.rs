use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Voiceover cache persistence; in-memory store when unset
    pub database_url: Option<String>,
    // Audio blob storage; local directory unless an S3 bucket is set
    pub s3_audio_bucket: Option<String>,
    pub audio_storage_dir: String,
    // Speech synthesis
    pub synthesis_provider: SynthesisProvider,
    pub synthesis_timeout_secs: u64,
    pub sample_voiceovers_dir: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    Polly,
    Fixture,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .parse::<String>()
            .map(|s| match s.as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            })?;

        // The live provider is the default only in production; development
        // stays fully offline unless explicitly overridden.
        let default_provider = if environment == Environment::Production {
            "polly"
        } else {
            "fixture"
        };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            s3_audio_bucket: env::var("S3_AUDIO_BUCKET").ok().filter(|s| !s.is_empty()),
            audio_storage_dir: env::var("AUDIO_STORAGE_DIR")
                .unwrap_or_else(|_| "data/audio".to_string()),
            synthesis_provider: env::var("SYNTHESIS_PROVIDER")
                .unwrap_or_else(|_| default_provider.to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "polly" => SynthesisProvider::Polly,
                    _ => SynthesisProvider::Fixture,
                })?,
            synthesis_timeout_secs: env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            sample_voiceovers_dir: env::var("SAMPLE_VOICEOVERS_DIR")
                .unwrap_or_else(|_| "assets/sample_voiceovers".to_string()),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
