//! Chat transcript and attachment types.
//!
//! The transcript is one of the autosaved profile fields, so these types
//! serialize exactly as they are stored: `{ "role": "user", "text": "..." }`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a chat message.
///
/// `Model` is the assistant; the name matches the generative-language API's
/// role vocabulary so transcripts can be sent without remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(ChatRole::User),
            "model" | "assistant" => Ok(ChatRole::Model),
            other => Err(format!("invalid chat role: '{other}'")),
        }
    }
}

/// A single message in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Greeting every new transcript starts with.
pub const GREETING: &str = "Hi! I'm your AI Assistant. I can help with study plans, sleep tracking, or if you're feeling stressed. How are you today?";

/// The transcript a fresh profile starts with.
pub fn initial_transcript() -> Vec<ChatMessage> {
    vec![ChatMessage::model(GREETING)]
}

/// How an attachment is forwarded to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentCategory {
    Image,
    Pdf,
    Text,
    Other,
}

impl AttachmentCategory {
    /// Classify a file by MIME type, falling back to the extension for
    /// markdown files that browsers report without a text MIME type.
    pub fn classify(file_name: &str, mime_type: &str) -> Self {
        if mime_type.starts_with("image/") {
            AttachmentCategory::Image
        } else if mime_type == "application/pdf" {
            AttachmentCategory::Pdf
        } else if mime_type.starts_with("text/") || file_name.ends_with(".md") {
            AttachmentCategory::Text
        } else {
            AttachmentCategory::Other
        }
    }
}

/// A file attached to an outgoing chat message.
///
/// For image and PDF attachments `data` is a data URL
/// (`data:<mime>;base64,<payload>`); for text attachments it is the file
/// content itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data: String,
    pub category: AttachmentCategory,
}
