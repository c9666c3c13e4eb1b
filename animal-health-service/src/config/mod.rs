use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default Gemini REST endpoint.
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default upper bound on a single generation call.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    /// `None` puts the service in fallback mode: no network calls are made.
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Empty means every origin is mirrored back.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl AdvisoryConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AdvisoryConfig {
            common: common_config,
            gemini: GeminiSettings {
                api_key: non_empty(env::var("GEMINI_API_KEY").ok()),
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), is_prod)?,
                text_model: get_env("GENAI_TEXT_MODEL", Some("gemini-pro"), is_prod)?,
                request_timeout_secs: parse_timeout_secs(&get_env(
                    "GENAI_REQUEST_TIMEOUT_SECS",
                    Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
                    is_prod,
                )?)?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default()),
            },
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                otlp_endpoint: non_empty(env::var("OTLP_ENDPOINT").ok()),
            },
        })
    }
}

/// Only an unset or empty variable counts as absent; whitespace is kept.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_timeout_secs(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(AppError::ConfigError(anyhow::anyhow!(
            "GENAI_REQUEST_TIMEOUT_SECS must be greater than zero"
        ))),
        Ok(secs) => Ok(secs),
        Err(e) => Err(AppError::ConfigError(anyhow::anyhow!(
            "GENAI_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}': {}",
            raw,
            e
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if let Some(def) = default {
                Ok(def.to_string())
            } else if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_credentials_count_as_absent() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some("   ".to_string())), Some("   ".to_string()));
        assert_eq!(non_empty(Some("key".to_string())), Some("key".to_string()));
    }

    #[test]
    fn request_timeout_must_be_positive_integer() {
        assert_eq!(parse_timeout_secs("60").unwrap(), 60);
        assert_eq!(parse_timeout_secs(" 5 ").unwrap(), 5);
        assert!(matches!(
            parse_timeout_secs("0"),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            parse_timeout_secs("soon"),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" https://a.example, ,https://b.example "),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn defaults_apply_outside_production() {
        let value = get_env("ANIMAL_HEALTH_TEST_UNSET_KEY", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
        assert!(get_env("ANIMAL_HEALTH_TEST_UNSET_KEY", None, false).is_err());
    }
}
