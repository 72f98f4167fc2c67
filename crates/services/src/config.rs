use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_DB_URL: &str = "sqlite://learnflow.sqlite3";
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_FEEDBACK_MS: u64 = 3_000;

/// Connection settings for the chat-completions content backend.
#[derive(Clone)]
pub struct GenerationConfig {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Runtime configuration, read from `LEARNFLOW_*` environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_url: String,
    /// `None` disables content generation.
    pub generation: Option<GenerationConfig>,
    pub feedback_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            generation: None,
            feedback_delay: Duration::from_millis(DEFAULT_FEEDBACK_MS),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment, after loading `.env` if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => warn!(error = %err, "ignoring unreadable .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset. Generation is enabled only when
    /// `LEARNFLOW_AI_API_KEY` is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `LEARNFLOW_AI_BASE_URL` is not an http(s) URL or
    /// `LEARNFLOW_QUIZ_FEEDBACK_MS` is not a whole number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let db_url = get("LEARNFLOW_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_owned());

        let generation = match get("LEARNFLOW_AI_API_KEY") {
            Some(api_key) => {
                let raw = get("LEARNFLOW_AI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_AI_BASE_URL.to_owned());
                let base_url = parse_base_url(&raw)?;
                let model =
                    get("LEARNFLOW_AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_owned());
                Some(GenerationConfig {
                    base_url,
                    api_key,
                    model,
                })
            }
            None => None,
        };

        let feedback_ms = match get("LEARNFLOW_QUIZ_FEEDBACK_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                var: "LEARNFLOW_QUIZ_FEEDBACK_MS",
                raw,
            })?,
            None => DEFAULT_FEEDBACK_MS,
        };

        Ok(Self {
            db_url,
            generation,
            feedback_delay: Duration::from_millis(feedback_ms),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var: "LEARNFLOW_AI_BASE_URL",
        raw: raw.to_owned(),
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.db_url, DEFAULT_DB_URL);
        assert!(cfg.generation.is_none());
        assert_eq!(cfg.feedback_delay, Duration::from_secs(3));
    }

    #[test]
    fn api_key_enables_generation() {
        let cfg = config(&[
            ("LEARNFLOW_AI_API_KEY", "sk-test"),
            ("LEARNFLOW_AI_MODEL", "local-model"),
            ("LEARNFLOW_AI_BASE_URL", "http://localhost:8080/v1"),
        ])
        .unwrap();
        let generation = cfg.generation.unwrap();
        assert_eq!(generation.model, "local-model");
        assert_eq!(generation.base_url.as_str(), "http://localhost:8080/v1");
        assert!(!format!("{generation:?}").contains("sk-test"));
    }

    #[test]
    fn blank_api_key_disables_generation() {
        let cfg = config(&[("LEARNFLOW_AI_API_KEY", "   ")]).unwrap();
        assert!(cfg.generation.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("LEARNFLOW_QUIZ_FEEDBACK_MS", "soon")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            config(&[
                ("LEARNFLOW_AI_API_KEY", "k"),
                ("LEARNFLOW_AI_BASE_URL", "ftp://example.com")
            ]),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
