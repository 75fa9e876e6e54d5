//! Messenger Platform client.
//!
//! Every operation is one POST. Failures are logged and dropped: callers never
//! see an error from a send.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::types::{
    Button, GenericElement, MessengerProfile, OutgoingMessage, PersistentMenu, QuickReply,
    SendRequest, SenderAction, ThreadSetting,
};

const MESSAGES_ENDPOINT: &str = "/me/messages";
const THREAD_SETTINGS_ENDPOINT: &str = "/me/thread_settings";
const MESSENGER_PROFILE_ENDPOINT: &str = "/me/messenger_profile";

#[derive(Clone)]
pub struct SendClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl SendClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    pub fn with_client(config: &Config, client: Client) -> Self {
        SendClient {
            client,
            access_token: config.page_access_token.clone(),
            base_url: config.graph_api_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_text(&self, recipient: &str, text: &str) {
        info!("Sending message to {}: {}", recipient, text);
        let request = SendRequest::message(recipient, OutgoingMessage::text(text));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn send_image(&self, recipient: &str, image_url: &str) {
        info!("Sending image to {}: {}", recipient, image_url);
        let request = SendRequest::message(recipient, OutgoingMessage::image(image_url));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn send_generic(&self, recipient: &str, elements: &[GenericElement]) {
        info!("Sending {} generic elements to {}", elements.len(), recipient);
        let request = SendRequest::message(recipient, OutgoingMessage::generic(elements));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn send_buttons(&self, recipient: &str, title: &str, buttons: &[Button]) {
        info!("Sending buttons to {}: {}", recipient, title);
        let request = SendRequest::message(recipient, OutgoingMessage::buttons(title, buttons));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn send_quick_replies(&self, recipient: &str, text: &str, replies: &[QuickReply]) {
        info!("Sending quick replies to {}: {}", recipient, text);
        let request = SendRequest::message(recipient, OutgoingMessage::quick_replies(text, replies));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn set_typing_indicator(&self, recipient: &str, on: bool) {
        debug!("Typing {} for {}", if on { "on" } else { "off" }, recipient);
        let request = SendRequest::sender_action(recipient, SenderAction::typing(on));
        self.deliver(MESSAGES_ENDPOINT, &request).await;
    }

    pub async fn set_greeting(&self, text: &str) {
        info!("Setting greeting text: {}", text);
        self.deliver(THREAD_SETTINGS_ENDPOINT, &ThreadSetting::greeting(text))
            .await;
    }

    pub async fn set_get_started_payload(&self, payload: &str) {
        info!("Setting get started payload: {}", payload);
        self.deliver(MESSENGER_PROFILE_ENDPOINT, &MessengerProfile::get_started(payload))
            .await;
    }

    /// Legacy thread settings variant of [`SendClient::set_get_started_payload`].
    pub async fn set_get_started_thread_payload(&self, payload: &str) {
        info!("Setting get started thread payload: {}", payload);
        self.deliver(THREAD_SETTINGS_ENDPOINT, &ThreadSetting::get_started(payload))
            .await;
    }

    pub async fn set_persistent_menu(&self, menu: &PersistentMenu) {
        info!("Setting persistent menu with {} items", menu.call_to_actions.len());
        self.deliver(MESSENGER_PROFILE_ENDPOINT, &MessengerProfile::persistent_menu(menu))
            .await;
    }

    pub async fn remove_persistent_menu(&self) {
        info!("Removing persistent menu");
        self.deliver(THREAD_SETTINGS_ENDPOINT, &ThreadSetting::clear_menu())
            .await;
    }

    async fn deliver<T: Serialize>(&self, endpoint: &str, body: &T) {
        if let Err(e) = self.post(endpoint, body).await {
            match e {
                BotError::Api { status, body } => {
                    error!("Messenger API error on {}: {}", endpoint, status.as_u16());
                    error!("{}", body);
                }
                other => error!("Messenger request to {} failed: {}", endpoint, other),
            }
        }
    }

    async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", &self.access_token)])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Api { status, body });
        }

        Ok(())
    }
}
