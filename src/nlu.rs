//! Wit.ai classification. Anything that goes wrong yields an empty result.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{BotError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub entity: Option<String>,
    pub value: Option<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.entity.is_none() && self.value.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct WitResponse {
    #[serde(default)]
    entities: Map<String, Value>,
}

#[derive(Clone)]
pub struct NluClient {
    client: Client,
    access_token: Option<String>,
    base_url: String,
}

impl NluClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        NluClient {
            client,
            access_token: config.wit_access_token.clone(),
            base_url: config.wit_api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
    }

    /// Returns the first entity and its first value, or an empty result.
    pub async fn classify(&self, text: &str) -> Classification {
        let Some(token) = self.access_token.as_deref() else {
            debug!("NLU disabled, skipping classification");
            return Classification::default();
        };

        match self.query(token, text).await {
            Ok(response) => {
                let classification = first_entity(&response.entities);
                debug!("Classified {:?} as {:?}", text, classification);
                classification
            }
            Err(e) => {
                warn!("NLU classification failed: {}", e);
                Classification::default()
            }
        }
    }

    async fn query(&self, token: &str, text: &str) -> Result<WitResponse> {
        let url = format!("{}/message", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api { status, body });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn first_entity(entities: &Map<String, Value>) -> Classification {
    let Some((name, candidates)) = entities.iter().next() else {
        return Classification::default();
    };

    let value = candidates
        .as_array()
        .and_then(|c| c.first())
        .and_then(|c| c.get("value"))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });

    Classification {
        entity: Some(name.clone()),
        value,
    }
}
