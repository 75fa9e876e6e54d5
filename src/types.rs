//! Wire shapes for the Messenger Send, Thread Settings and Messenger Profile
//! APIs. Optional fields are skipped rather than sent as `null`.

use serde::Serialize;

/// Prefix the platform expands with the viewer's name.
pub const GREETING_PREFIX: &str = "Hi {{user_full_name}}!";

fn is_none_or_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    WebUrl,
    Postback,
}

/// A template button. `url` belongs to web_url buttons, `payload` to postback
/// buttons; nothing enforces that when the struct is built by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: ButtonKind,
    #[serde(rename = "title", skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub payload: Option<String>,
}

impl Button {
    pub fn web_url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Button {
            kind: ButtonKind::WebUrl,
            label: label.into(),
            url: Some(url.into()),
            payload: None,
        }
    }

    pub fn postback(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Button {
            kind: ButtonKind::Postback,
            label: label.into(),
            url: None,
            payload: Some(payload.into()),
        }
    }
}

/// One card of a generic template.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenericElement {
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub item_url: Option<String>,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub image_url: Option<String>,
    pub buttons: Vec<Button>,
}

impl GenericElement {
    pub fn new(title: impl Into<String>) -> Self {
        GenericElement {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn item_url(mut self, item_url: impl Into<String>) -> Self {
        self.item_url = Some(item_url.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReply {
    pub content_type: ContentType,
    #[serde(rename = "title", skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub payload: String,
    #[serde(skip_serializing_if = "is_none_or_empty")]
    pub image_url: Option<String>,
}

impl QuickReply {
    pub fn text(label: impl Into<String>, payload: impl Into<String>) -> Self {
        QuickReply {
            content_type: ContentType::Text,
            label: label.into(),
            payload: payload.into(),
            image_url: None,
        }
    }

    pub fn location(payload: impl Into<String>) -> Self {
        QuickReply {
            content_type: ContentType::Location,
            label: String::new(),
            payload: payload.into(),
            image_url: None,
        }
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub id: String,
}

/// Body of a POST to `/me/messages`.
#[derive(Debug, Serialize)]
pub struct SendRequest {
    pub recipient: Recipient,
    #[serde(flatten)]
    pub body: SendBody,
}

impl SendRequest {
    pub fn message(recipient: &str, message: OutgoingMessage) -> Self {
        SendRequest {
            recipient: Recipient {
                id: recipient.to_string(),
            },
            body: SendBody::Message(message),
        }
    }

    pub fn sender_action(recipient: &str, action: SenderAction) -> Self {
        SendRequest {
            recipient: Recipient {
                id: recipient.to_string(),
            },
            body: SendBody::SenderAction(action),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendBody {
    Message(OutgoingMessage),
    SenderAction(SenderAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
}

impl SenderAction {
    pub fn typing(on: bool) -> Self {
        if on {
            SenderAction::TypingOn
        } else {
            SenderAction::TypingOff
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct OutgoingMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReply>>,
}

impl OutgoingMessage {
    pub fn text(text: &str) -> Self {
        OutgoingMessage {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn image(url: &str) -> Self {
        OutgoingMessage {
            attachment: Some(Attachment::Image(MediaPayload {
                url: url.to_string(),
            })),
            ..Default::default()
        }
    }

    pub fn generic(elements: &[GenericElement]) -> Self {
        OutgoingMessage {
            attachment: Some(Attachment::Template(Template::Generic {
                elements: elements.to_vec(),
            })),
            ..Default::default()
        }
    }

    pub fn buttons(text: &str, buttons: &[Button]) -> Self {
        OutgoingMessage {
            attachment: Some(Attachment::Template(Template::Button {
                text: text.to_string(),
                buttons: buttons.to_vec(),
            })),
            ..Default::default()
        }
    }

    /// The `quick_replies` array is always sent, even when empty.
    pub fn quick_replies(text: &str, replies: &[QuickReply]) -> Self {
        OutgoingMessage {
            text: Some(text.to_string()),
            quick_replies: Some(replies.to_vec()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Attachment {
    Image(MediaPayload),
    Template(Template),
}

#[derive(Debug, Serialize)]
pub struct MediaPayload {
    pub url: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum Template {
    Generic { elements: Vec<GenericElement> },
    Button { text: String, buttons: Vec<Button> },
}

/// Body of a POST to `/me/thread_settings`.
#[derive(Debug, Serialize)]
#[serde(tag = "setting_type", rename_all = "snake_case")]
pub enum ThreadSetting {
    Greeting {
        greeting: GreetingText,
    },
    CallToActions {
        thread_state: ThreadState,
        call_to_actions: Vec<CallToAction>,
    },
}

impl ThreadSetting {
    pub fn greeting(text: &str) -> Self {
        ThreadSetting::Greeting {
            greeting: GreetingText {
                text: format!("{} {}", GREETING_PREFIX, text),
            },
        }
    }

    pub fn get_started(payload: &str) -> Self {
        ThreadSetting::CallToActions {
            thread_state: ThreadState::NewThread,
            call_to_actions: vec![CallToAction {
                payload: payload.to_string(),
            }],
        }
    }

    pub fn clear_menu() -> Self {
        ThreadSetting::CallToActions {
            thread_state: ThreadState::ExistingThread,
            call_to_actions: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GreetingText {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    NewThread,
    ExistingThread,
}

#[derive(Debug, Serialize)]
pub struct CallToAction {
    pub payload: String,
}

/// Body of a POST to `/me/messenger_profile`.
#[derive(Debug, Default, Serialize)]
pub struct MessengerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_started: Option<GetStarted>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_menu: Option<Vec<PersistentMenu>>,
}

impl MessengerProfile {
    pub fn get_started(payload: &str) -> Self {
        MessengerProfile {
            get_started: Some(GetStarted {
                payload: payload.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn persistent_menu(menu: &PersistentMenu) -> Self {
        MessengerProfile {
            persistent_menu: Some(vec![menu.clone()]),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetStarted {
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistentMenu {
    pub locale: String,
    pub composer_input_disabled: bool,
    pub call_to_actions: Vec<MenuItem>,
}

impl PersistentMenu {
    pub fn new(call_to_actions: Vec<MenuItem>) -> Self {
        PersistentMenu {
            locale: "default".to_string(),
            composer_input_disabled: false,
            call_to_actions,
        }
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn composer_input_disabled(mut self, disabled: bool) -> Self {
        self.composer_input_disabled = disabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MenuItem {
    Postback {
        title: String,
        payload: String,
    },
    WebUrl {
        title: String,
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        webview_height_ratio: Option<WebviewHeightRatio>,
    },
    Nested {
        title: String,
        call_to_actions: Vec<MenuItem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WebviewHeightRatio {
    Compact,
    Tall,
    Full,
}
