use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
