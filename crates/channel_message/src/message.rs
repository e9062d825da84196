use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Postback payload the platform sends when a user presses "Get Started".
pub const GET_STARTED_PAYLOAD: &str = "__ALREADY_GOT_STARTED__";

/// A normalized incoming message, already stripped of the platform webhook envelope.
///
/// ```json
/// { "message": { "text": "yes", "quick_reply": { "payload": "__ab12…__" } },
///   "postback": { "payload": "__ALREADY_GOT_STARTED__" } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct IncomingMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct MessageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReplySelection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Postback {
    pub payload: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QuickReplySelection {
    pub payload: String,
}

impl IncomingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            message: Some(MessageBody {
                text: Some(text.into()),
                quick_reply: None,
            }),
            postback: None,
        }
    }

    pub fn postback(payload: impl Into<String>) -> Self {
        Self {
            message: None,
            postback: Some(Postback {
                payload: payload.into(),
                title: None,
            }),
        }
    }

    pub fn quick_reply(payload: impl Into<String>) -> Self {
        Self::default().with_quick_reply(payload)
    }

    pub fn get_started() -> Self {
        Self::postback(GET_STARTED_PAYLOAD)
    }

    /// Attach a quick-reply selection, keeping any text already present.
    pub fn with_quick_reply(mut self, payload: impl Into<String>) -> Self {
        let body = self.message.get_or_insert_with(MessageBody::default);
        body.quick_reply = Some(QuickReplySelection {
            payload: payload.into(),
        });
        self
    }

    pub fn postback_payload(&self) -> Option<&str> {
        self.postback.as_ref().map(|p| p.payload.as_str())
    }

    pub fn quick_reply_payload(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.quick_reply.as_ref())
            .map(|q| q.payload.as_str())
    }

    pub fn is_get_started(&self) -> bool {
        self.postback_payload() == Some(GET_STARTED_PAYLOAD)
    }
}
