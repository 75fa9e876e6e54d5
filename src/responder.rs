use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::nlu::NluClient;
use crate::send::SendClient;
use crate::types::QuickReply;
use crate::webhook::MessagingEvent;

pub const WELCOME_TEXT: &str = "Hi! Ask me anything, or pick an option below.";
pub const FALLBACK_TEXT: &str = "Sorry, I didn't catch that.";

/// Turns inbound messaging events into replies.
#[derive(Clone)]
pub struct Responder {
    send: SendClient,
    nlu: NluClient,
    get_started_payload: Option<String>,
}

impl Responder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(config, config.http_client()?))
    }

    /// Both the Messenger and Wit.ai calls go through `client`.
    pub fn with_client(config: &Config, client: reqwest::Client) -> Self {
        Responder {
            send: SendClient::with_client(config, client.clone()),
            nlu: NluClient::with_client(config, client),
            get_started_payload: config.get_started_payload.clone(),
        }
    }

    pub fn send_client(&self) -> &SendClient {
        &self.send
    }

    pub async fn handle_event(&self, event: &MessagingEvent) {
        let Some(sender_id) = event.sender.as_ref().map(|s| s.id.as_str()) else {
            debug!("Ignoring event without sender");
            return;
        };

        if let Some(postback) = &event.postback {
            self.handle_payload(sender_id, &postback.payload).await;
            return;
        }

        let Some(message) = &event.message else {
            debug!("Ignoring non-message event from {}", sender_id);
            return;
        };

        if message.is_echo {
            return;
        }

        if let Some(quick_reply) = &message.quick_reply {
            self.handle_payload(sender_id, &quick_reply.payload).await;
            return;
        }

        match message.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => self.handle_text(sender_id, text).await,
            _ => debug!("Ignoring message without text from {}", sender_id),
        }
    }

    async fn handle_text(&self, sender_id: &str, text: &str) {
        info!("Message from {}: {}", sender_id, text);

        self.send.set_typing_indicator(sender_id, true).await;

        let classification = self.nlu.classify(text).await;
        let reply = match (&classification.entity, &classification.value) {
            (Some(entity), Some(value)) => format!("{}: {}", entity, value),
            _ => FALLBACK_TEXT.to_string(),
        };

        self.send.send_text(sender_id, &reply).await;
        self.send.set_typing_indicator(sender_id, false).await;
    }

    async fn handle_payload(&self, sender_id: &str, payload: &str) {
        info!("Payload from {}: {}", sender_id, payload);

        if self.get_started_payload.as_deref() == Some(payload) {
            let replies = [
                QuickReply::text("Help", "HELP"),
                QuickReply::location("SHARE_LOCATION"),
            ];
            self.send
                .send_quick_replies(sender_id, WELCOME_TEXT, &replies)
                .await;
        } else {
            self.send
                .send_text(sender_id, &format!("Received: {}", payload))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn responder_for(server: &MockServer, wit: bool) -> Responder {
        let mut config = Config::new("page-token", "verify");
        config.graph_api_base = server.uri();
        config.wit_api_base = server.uri();
        config.get_started_payload = Some("GET_STARTED".to_string());
        if wit {
            config.wit_access_token = Some("wit-token".to_string());
        }
        Responder::new(&config).unwrap()
    }

    fn event(value: serde_json::Value) -> MessagingEvent {
        serde_json::from_value(value).unwrap()
    }

    async fn expect_message(server: &MockServer, body: serde_json::Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .and(body_json(body))
            .respond_with(ResponseTemplate::new(200))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_text_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": {"location": [{"value": "Malaysia"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        expect_message(
            &server,
            json!({"recipient": {"id": "u1"}, "sender_action": "typing_on"}),
            1,
        )
        .await;
        expect_message(
            &server,
            json!({"recipient": {"id": "u1"}, "message": {"text": "location: Malaysia"}}),
            1,
        )
        .await;
        expect_message(
            &server,
            json!({"recipient": {"id": "u1"}, "sender_action": "typing_off"}),
            1,
        )
        .await;

        responder_for(&server, true)
            .handle_event(&event(json!({
                "sender": {"id": "u1"},
                "message": {"mid": "m1", "text": "I live in Malaysia"}
            })))
            .await;
    }

    #[tokio::test]
    async fn test_fallback_without_nlu() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        responder_for(&server, false)
            .handle_event(&event(json!({
                "sender": {"id": "u1"},
                "message": {"text": "hello"}
            })))
            .await;

        let requests = server.received_requests().await.unwrap();
        let bodies: Vec<serde_json::Value> = requests
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[1]["message"]["text"], FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_shared_client_serves_both_apis() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/message"))
            .and(header("x-bot-client", "shared"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": {"intent": [{"value": "hello"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .and(header("x-bot-client", "shared"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3)
            .mount(&server)
            .await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-bot-client", reqwest::header::HeaderValue::from_static("shared"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap();

        let mut config = Config::new("page-token", "verify");
        config.graph_api_base = server.uri();
        config.wit_api_base = server.uri();
        config.wit_access_token = Some("wit-token".to_string());

        Responder::with_client(&config, client)
            .handle_event(&event(json!({
                "sender": {"id": "u1"},
                "message": {"text": "hello"}
            })))
            .await;
    }

    #[tokio::test]
    async fn test_entity_without_value_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/message"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": {"greeting": []}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/me/messages"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        responder_for(&server, true)
            .handle_event(&event(json!({
                "sender": {"id": "u1"},
                "message": {"text": "hey there"}
            })))
            .await;

        let bodies: Vec<serde_json::Value> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/me/messages")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[1]["message"]["text"], FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn test_get_started_postback_sends_welcome() {
        let server = MockServer::start().await;
        expect_message(
            &server,
            json!({
                "recipient": {"id": "u2"},
                "message": {
                    "text": WELCOME_TEXT,
                    "quick_replies": [
                        {"content_type": "text", "title": "Help", "payload": "HELP"},
                        {"content_type": "location", "payload": "SHARE_LOCATION"}
                    ]
                }
            }),
            1,
        )
        .await;

        responder_for(&server, false)
            .handle_event(&event(json!({
                "sender": {"id": "u2"},
                "postback": {"title": "Get Started", "payload": "GET_STARTED"}
            })))
            .await;
    }

    #[tokio::test]
    async fn test_quick_reply_payload_is_echoed() {
        let server = MockServer::start().await;
        expect_message(
            &server,
            json!({"recipient": {"id": "u3"}, "message": {"text": "Received: HELP"}}),
            1,
        )
        .await;

        responder_for(&server, true)
            .handle_event(&event(json!({
                "sender": {"id": "u3"},
                "message": {"text": "Help", "quick_reply": {"payload": "HELP"}}
            })))
            .await;
    }

    #[tokio::test]
    async fn test_ignored_events_send_nothing() {
        let server = MockServer::start().await;
        let responder = responder_for(&server, true);

        responder
            .handle_event(&event(json!({"message": {"text": "no sender"}})))
            .await;
        responder
            .handle_event(&event(json!({
                "sender": {"id": "page"},
                "message": {"text": "echo", "is_echo": true}
            })))
            .await;
        responder
            .handle_event(&event(json!({
                "sender": {"id": "u4"},
                "delivery": {"mids": ["m1"], "watermark": 1}
            })))
            .await;
        responder
            .handle_event(&event(json!({"sender": {"id": "u4"}, "message": {"text": "   "}})))
            .await;

        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
