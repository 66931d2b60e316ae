use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
    pub static_dir: PathBuf,
}

#[derive(Clone, Deserialize)]
pub struct LLMConfig {
    pub google_api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: Option<u64>,
}

// Keep the API key out of startup logs.
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field("google_api_key", &if self.google_api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, applying the same
    /// defaults and parsing rules as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("GEMINI_TIMEOUT_SECS").filter(|s| !s.trim().is_empty()) {
            Some(raw) => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("GEMINI_TIMEOUT_SECS must be a number of seconds, got {:?}", raw))?,
            ),
            None => None,
        };

        let cors_allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "*")
            .collect();

        Ok(Self {
            server: ServerConfig {
                port,
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins,
                static_dir: PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "public".to_string())),
            },
            llm: LLMConfig {
                google_api_key: lookup("GEMINI_API_KEY").unwrap_or_default(),
                model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_base: lookup("GEMINI_API_BASE")
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
                timeout_secs,
            },
        })
    }
}
