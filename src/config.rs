use crate::clients::ClientType;
use crate::core::RetryConfig;
use crate::error::AIError;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Upper bound on questions per quiz.
pub const MAX_QUESTIONS: usize = 10;

/// Topic used when the caller supplies none.
pub const DEFAULT_TOPIC: &str = "General Knowledge";

/// Prompt context used when retrieval finds nothing.
pub const NO_CONTEXT: &str = "No context available";

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables, loading `.env` first
    fn find_key() -> Option<String> {
        // Silently ignore a missing .env file
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME).ok().filter(|k| !k.trim().is_empty())
    }

    /// Like `find_key`, but a missing key is a configuration error
    fn require_key() -> Result<String, AIError> {
        Self::find_key().ok_or_else(|| {
            warn!(key = Self::KEY_NAME, "API key not found in environment or .env");
            AIError::Config(format!("environment variable {} is not set", Self::KEY_NAME))
        })
    }
}

/// Knobs for `QuizGenerator`.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    pub retry: RetryConfig,
    /// Append the JSON schema of `QuizQuestion` to every prompt
    pub schema_guidance: bool,
}

/// Process-level settings read from the environment.
#[derive(Debug, Clone, Default)]
pub struct QuizifyConfig {
    pub client: ClientType,
    pub generator: GeneratorConfig,
    pub transcript_dir: Option<PathBuf>,
}

impl QuizifyConfig {
    /// Read `QUIZIFY_CLIENT`, `QUIZIFY_MAX_ATTEMPTS` and `QUIZIFY_TRANSCRIPT_DIR`.
    ///
    /// Unparseable values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let client = match env::var("QUIZIFY_CLIENT") {
            Ok(raw) => ClientType::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring QUIZIFY_CLIENT");
                ClientType::default()
            }),
            Err(_) => ClientType::default(),
        };

        let retry = match env::var("QUIZIFY_MAX_ATTEMPTS").map(|v| v.parse::<usize>()) {
            Ok(Ok(n)) if n > 0 => RetryConfig::new(n),
            Ok(_) => {
                warn!("QUIZIFY_MAX_ATTEMPTS must be a positive integer, using default");
                RetryConfig::default()
            }
            Err(_) => RetryConfig::default(),
        };

        let transcript_dir = env::var("QUIZIFY_TRANSCRIPT_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        debug!(client = %client, max_attempts = retry.max_attempts, "Loaded configuration from environment");

        Self {
            client,
            generator: GeneratorConfig { retry, schema_guidance: false },
            transcript_dir,
        }
    }
}
