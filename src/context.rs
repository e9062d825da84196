use std::collections::HashSet;

use strum::IntoEnumIterator;
use thiserror::Error;

use crate::action::{Action, ActionKind, Button, QuickReply, ResolvedAction};

/// The send operations a context actually implements.
///
/// Checked against every node when the graph is built, so an action the
/// context can not perform is reported at setup instead of mid-conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capabilities {
    kinds: HashSet<ActionKind>,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            kinds: ActionKind::iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(kinds: impl IntoIterator<Item = ActionKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn with(mut self, kind: ActionKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    pub fn supports(&self, kind: ActionKind) -> bool {
        self.kinds.contains(&kind)
    }
}

#[derive(Debug, Error)]
#[error("context does not implement `{}`", .0.operation_name())]
pub struct UnsupportedOperation(pub ActionKind);

/// The outbound side of a conversation, one operation per [`ActionKind`].
///
/// Every operation defaults to failing with [`UnsupportedOperation`];
/// implementors override the ones they list in [`SendContext::capabilities`].
pub trait SendContext {
    fn capabilities() -> Capabilities
    where
        Self: Sized;

    fn send_text(&mut self, _text: &str) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::Text).into())
    }

    fn send_image(&mut self, _url: &str) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::Image).into())
    }

    fn send_audio(&mut self, _url: &str) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::Audio).into())
    }

    fn send_video(&mut self, _url: &str) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::Video).into())
    }

    fn send_file(&mut self, _url: &str) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::File).into())
    }

    fn send_button_template(
        &mut self,
        _text: &str,
        _buttons: &[Button<String>],
    ) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::ButtonTemplate).into())
    }

    fn send_quick_replies(
        &mut self,
        _text: &str,
        _quick_replies: &[QuickReply<String>],
    ) -> anyhow::Result<()> {
        Err(UnsupportedOperation(ActionKind::QuickReplies).into())
    }
}

/// Perform one resolved action on `ctx`.
pub fn send_action<C: SendContext + ?Sized>(
    ctx: &mut C,
    action: &ResolvedAction,
) -> anyhow::Result<()> {
    match action {
        Action::Text { text } => ctx.send_text(text),
        Action::Image { url } => ctx.send_image(url),
        Action::Audio { url } => ctx.send_audio(url),
        Action::Video { url } => ctx.send_video(url),
        Action::File { url } => ctx.send_file(url),
        Action::ButtonTemplate { text, buttons } => ctx.send_button_template(text, buttons),
        Action::QuickReplies {
            text,
            quick_replies,
        } => ctx.send_quick_replies(text, quick_replies),
    }
}
