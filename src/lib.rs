//! Messenger bot glue: builds Send API payloads, posts them, and optionally
//! classifies inbound text with Wit.ai.

pub mod config;
pub mod error;
pub mod nlu;
pub mod responder;
pub mod send;
pub mod types;
pub mod webhook;

pub use config::Config;
pub use error::{BotError, Result};
pub use nlu::{Classification, NluClient};
pub use responder::Responder;
pub use send::SendClient;
pub use types::{Button, ButtonKind, ContentType, GenericElement, MenuItem, PersistentMenu, QuickReply};
