use std::io::Write;

use serde_json::{Value, json};

use crate::action::{ActionKind, Button, QuickReply};
use crate::context::{Capabilities, SendContext};

/// A `SendContext` that writes every send as one JSON line, e.g.
/// `{"operation":"send_text","args":{"text":"Hi"}}`.
pub struct ConsoleContext<W> {
    out: W,
}

impl<W: Write> ConsoleContext<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, kind: ActionKind, args: Value) -> anyhow::Result<()> {
        let line = json!({ "operation": kind.operation_name(), "args": args });
        writeln!(self.out, "{line}")?;
        Ok(())
    }
}

impl<W: Write> SendContext for ConsoleContext<W> {
    fn capabilities() -> Capabilities {
        Capabilities::all()
    }

    fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.emit(ActionKind::Text, json!({ "text": text }))
    }

    fn send_image(&mut self, url: &str) -> anyhow::Result<()> {
        self.emit(ActionKind::Image, json!({ "url": url }))
    }

    fn send_audio(&mut self, url: &str) -> anyhow::Result<()> {
        self.emit(ActionKind::Audio, json!({ "url": url }))
    }

    fn send_video(&mut self, url: &str) -> anyhow::Result<()> {
        self.emit(ActionKind::Video, json!({ "url": url }))
    }

    fn send_file(&mut self, url: &str) -> anyhow::Result<()> {
        self.emit(ActionKind::File, json!({ "url": url }))
    }

    fn send_button_template(&mut self, text: &str, buttons: &[Button<String>]) -> anyhow::Result<()> {
        self.emit(
            ActionKind::ButtonTemplate,
            json!({ "text": text, "buttons": buttons }),
        )
    }

    fn send_quick_replies(
        &mut self,
        text: &str,
        quick_replies: &[QuickReply<String>],
    ) -> anyhow::Result<()> {
        self.emit(
            ActionKind::QuickReplies,
            json!({ "text": text, "quick_replies": quick_replies }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::context::send_action;

    fn lines(ctx: ConsoleContext<Vec<u8>>) -> Vec<Value> {
        String::from_utf8(ctx.into_inner())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_send() {
        let mut ctx = ConsoleContext::new(Vec::new());
        send_action(&mut ctx, &Action::text("Hi")).unwrap();
        send_action(&mut ctx, &Action::image("https://x/cat.png")).unwrap();

        assert_eq!(
            lines(ctx),
            vec![
                json!({ "operation": "send_text", "args": { "text": "Hi" } }),
                json!({ "operation": "send_image", "args": { "url": "https://x/cat.png" } }),
            ]
        );
    }

    #[test]
    fn test_quick_replies_serialized_with_payloads() {
        let mut ctx = ConsoleContext::new(Vec::new());
        send_action(
            &mut ctx,
            &Action::quick_replies("Pick", vec![QuickReply::text("One", "__k__")]),
        )
        .unwrap();

        assert_eq!(
            lines(ctx),
            vec![json!({
                "operation": "send_quick_replies",
                "args": {
                    "text": "Pick",
                    "quick_replies": [
                        { "content_type": "text", "title": "One", "payload": "__k__" }
                    ]
                }
            })]
        );
    }

    #[test]
    fn test_supports_every_kind() {
        use strum::IntoEnumIterator;
        let caps = ConsoleContext::<Vec<u8>>::capabilities();
        assert!(ActionKind::iter().all(|k| caps.supports(k)));
    }
}
