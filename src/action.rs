// src/action.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::node::NodeRef;

/// The closed set of things a node can send.
///
/// The snake_case name doubles as the action's type tag, and `send_<tag>` is
/// the name of the `SendContext` operation that performs it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
    Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Text,
    Image,
    Audio,
    Video,
    File,
    ButtonTemplate,
    QuickReplies,
}

impl ActionKind {
    /// `text` → `send_text`, `button_template` → `send_button_template`
    pub fn operation_name(&self) -> String {
        format!("send_{self}")
    }

    /// Whether this kind carries descriptors that may point at other nodes.
    pub fn carries_links(&self) -> bool {
        matches!(self, ActionKind::ButtonTemplate | ActionKind::QuickReplies)
    }
}

/// Where a button or quick reply leads: a literal payload, or another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Payload(String),
    Node(NodeRef),
}

impl From<NodeRef> for Link {
    fn from(node: NodeRef) -> Self {
        Link::Node(node)
    }
}

impl From<&NodeRef> for Link {
    fn from(node: &NodeRef) -> Self {
        Link::Node(node.clone())
    }
}

impl From<&str> for Link {
    fn from(payload: &str) -> Self {
        Link::Payload(payload.to_string())
    }
}

impl From<String> for Link {
    fn from(payload: String) -> Self {
        Link::Payload(payload)
    }
}

/// One outbound send instruction.
///
/// `P` is what link-bearing descriptors carry: a [`Link`] while the graph is
/// being built, the literal payload `String` once it has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action<P> {
    Text { text: String },
    Image { url: String },
    Audio { url: String },
    Video { url: String },
    File { url: String },
    ButtonTemplate { text: String, buttons: Vec<Button<P>> },
    QuickReplies { text: String, quick_replies: Vec<QuickReply<P>> },
}

/// Action as written by graph authors.
pub type NodeAction = Action<Link>;
/// Action as handed to a `SendContext`: every link is a literal payload.
pub type ResolvedAction = Action<String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button<P> {
    Postback { title: String, payload: P },
    WebUrl { title: String, url: String },
    PhoneNumber { title: String, payload: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuickReplyKind {
    #[default]
    Text,
    UserPhoneNumber,
    UserEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QuickReply<P> {
    #[serde(default)]
    pub content_type: QuickReplyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<P>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl<P> Action<P> {
    pub fn text(text: impl Into<String>) -> Self {
        Action::Text { text: text.into() }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Action::Image { url: url.into() }
    }

    pub fn button_template(text: impl Into<String>, buttons: Vec<Button<P>>) -> Self {
        Action::ButtonTemplate {
            text: text.into(),
            buttons,
        }
    }

    pub fn quick_replies(text: impl Into<String>, quick_replies: Vec<QuickReply<P>>) -> Self {
        Action::QuickReplies {
            text: text.into(),
            quick_replies,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Text { .. } => ActionKind::Text,
            Action::Image { .. } => ActionKind::Image,
            Action::Audio { .. } => ActionKind::Audio,
            Action::Video { .. } => ActionKind::Video,
            Action::File { .. } => ActionKind::File,
            Action::ButtonTemplate { .. } => ActionKind::ButtonTemplate,
            Action::QuickReplies { .. } => ActionKind::QuickReplies,
        }
    }

    /// Every link carried by this action, in declaration order.
    pub fn links(&self) -> Vec<&P> {
        match self {
            Action::ButtonTemplate { buttons, .. } => buttons
                .iter()
                .filter_map(|b| match b {
                    Button::Postback { payload, .. } => Some(payload),
                    _ => None,
                })
                .collect(),
            Action::QuickReplies { quick_replies, .. } => quick_replies
                .iter()
                .filter_map(|q| q.payload.as_ref())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Build a new action with every link passed through `f`.
    ///
    /// `self` is left untouched; the first error from `f` aborts the mapping.
    pub fn try_map_links<Q, E>(
        &self,
        mut f: impl FnMut(&P) -> Result<Q, E>,
    ) -> Result<Action<Q>, E> {
        Ok(match self {
            Action::Text { text } => Action::Text { text: text.clone() },
            Action::Image { url } => Action::Image { url: url.clone() },
            Action::Audio { url } => Action::Audio { url: url.clone() },
            Action::Video { url } => Action::Video { url: url.clone() },
            Action::File { url } => Action::File { url: url.clone() },
            Action::ButtonTemplate { text, buttons } => Action::ButtonTemplate {
                text: text.clone(),
                buttons: buttons
                    .iter()
                    .map(|b| b.try_map_link(&mut f))
                    .collect::<Result<_, _>>()?,
            },
            Action::QuickReplies {
                text,
                quick_replies,
            } => Action::QuickReplies {
                text: text.clone(),
                quick_replies: quick_replies
                    .iter()
                    .map(|q| q.try_map_link(&mut f))
                    .collect::<Result<_, _>>()?,
            },
        })
    }
}

impl<P> Button<P> {
    pub fn postback(title: impl Into<String>, payload: impl Into<P>) -> Self {
        Button::Postback {
            title: title.into(),
            payload: payload.into(),
        }
    }

    pub fn web_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Button::WebUrl {
            title: title.into(),
            url: url.into(),
        }
    }

    pub fn phone_number(title: impl Into<String>, number: impl Into<String>) -> Self {
        Button::PhoneNumber {
            title: title.into(),
            payload: number.into(),
        }
    }

    fn try_map_link<Q, E>(
        &self,
        f: &mut impl FnMut(&P) -> Result<Q, E>,
    ) -> Result<Button<Q>, E> {
        Ok(match self {
            Button::Postback { title, payload } => Button::Postback {
                title: title.clone(),
                payload: f(payload)?,
            },
            Button::WebUrl { title, url } => Button::WebUrl {
                title: title.clone(),
                url: url.clone(),
            },
            Button::PhoneNumber { title, payload } => Button::PhoneNumber {
                title: title.clone(),
                payload: payload.clone(),
            },
        })
    }
}

impl<P> QuickReply<P> {
    pub fn text(title: impl Into<String>, payload: impl Into<P>) -> Self {
        Self {
            content_type: QuickReplyKind::Text,
            title: Some(title.into()),
            payload: Some(payload.into()),
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    fn try_map_link<Q, E>(
        &self,
        f: &mut impl FnMut(&P) -> Result<Q, E>,
    ) -> Result<QuickReply<Q>, E> {
        Ok(QuickReply {
            content_type: self.content_type,
            title: self.title.clone(),
            payload: self.payload.as_ref().map(|p| f(p)).transpose()?,
            image_url: self.image_url.clone(),
        })
    }
}
