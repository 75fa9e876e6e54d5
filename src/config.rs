use std::env;
use std::time::Duration;

use crate::error::{BotError, Result};

pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v2.6";
pub const DEFAULT_WIT_API_BASE: &str = "https://api.wit.ai";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PORT: u16 = 5000;

/// Everything the bot needs at runtime. The library only ever receives this
/// struct; reading the process environment happens in `from_env`.
#[derive(Clone)]
pub struct Config {
    pub page_access_token: String,
    pub verify_token: String,
    /// Enables `X-Hub-Signature-256` checks on inbound webhooks when set.
    pub app_secret: Option<String>,
    /// NLU is skipped entirely when no token is configured.
    pub wit_access_token: Option<String>,
    pub graph_api_base: String,
    pub wit_api_base: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub greeting_text: Option<String>,
    pub get_started_payload: Option<String>,
}

impl Config {
    pub fn new(page_access_token: impl Into<String>, verify_token: impl Into<String>) -> Self {
        Config {
            page_access_token: page_access_token.into(),
            verify_token: verify_token.into(),
            app_secret: None,
            wit_access_token: None,
            graph_api_base: DEFAULT_GRAPH_API_BASE.to_string(),
            wit_api_base: DEFAULT_WIT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
            greeting_text: None,
            get_started_payload: None,
        }
    }

    /// One pooled HTTP client with the configured timeout, shared by every
    /// outbound caller.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let page_access_token =
            get("PAGE_ACCESS_TOKEN").ok_or(BotError::MissingEnv("PAGE_ACCESS_TOKEN"))?;
        let verify_token = get("VERIFY_TOKEN").ok_or(BotError::MissingEnv("VERIFY_TOKEN"))?;

        let mut config = Config::new(page_access_token, verify_token);
        config.app_secret = get("APP_SECRET");
        config.wit_access_token = get("WIT_ACCESS_TOKEN");
        config.greeting_text = get("GREETING_TEXT");
        config.get_started_payload = get("GET_STARTED_PAYLOAD");

        if let Some(base) = get("GRAPH_API_BASE") {
            config.graph_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(base) = get("WIT_API_BASE") {
            config.wit_api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = get("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| BotError::Config(format!("HTTP_TIMEOUT_SECS is not a number: {}", secs)))?;
            if secs == 0 {
                return Err(BotError::Config("HTTP_TIMEOUT_SECS must be positive".to_string()));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .map_err(|_| BotError::Config(format!("PORT is not a valid port: {}", port)))?;
        }

        Ok(config)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("page_access_token", &"[REDACTED]")
            .field("verify_token", &"[REDACTED]")
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[REDACTED]"))
            .field("wit_access_token", &self.wit_access_token.as_ref().map(|_| "[REDACTED]"))
            .field("graph_api_base", &self.graph_api_base)
            .field("wit_api_base", &self.wit_api_base)
            .field("request_timeout", &self.request_timeout)
            .field("port", &self.port)
            .field("greeting_text", &self.greeting_text)
            .field("get_started_payload", &self.get_started_payload)
            .finish()
    }
}
