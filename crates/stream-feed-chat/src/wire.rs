//! Payload types of one completion-stream event.
//!
//! Only the fields the assembler reads are modelled; everything else in the payload is ignored.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChunkPayload {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub delta: Option<Delta>,
    /// Any non-null value ends the message. Usually a string such as `"stop"`.
    #[serde(default)]
    pub finish_reason: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl Choice {
    /// Finish reason as text, if this choice ends the message.
    pub fn finish(&self) -> Option<String> {
        match self.finish_reason.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
