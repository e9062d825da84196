// src/dispatcher.rs

use std::sync::Arc;

use channel_message::{GET_STARTED_PAYLOAD, IncomingMessage};
use serde::Serialize;
use tracing::{debug, error};

use crate::action::ActionKind;
use crate::builder::Handler;
use crate::context::{SendContext, send_action};
use crate::graph::GraphView;
use crate::node::Node;
use crate::registry::NodeRegistry;

/// What the payload-extraction rules make of an incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted<'m> {
    /// A get-started postback, and a get-started handler is registered.
    GetStarted,
    Payload(&'m str),
    Nothing,
}

/// Apply the payload priority rules to `msg`.
///
/// The get-started sentinel only short-circuits when a handler exists for it;
/// otherwise it is an ordinary (unroutable) postback payload. A quick-reply
/// payload always overrides the postback payload, even when it is empty.
pub fn extract_payload(msg: &IncomingMessage, get_started_registered: bool) -> Extracted<'_> {
    let mut payload = None;

    if let Some(postback) = msg.postback_payload() {
        if get_started_registered && postback == GET_STARTED_PAYLOAD {
            return Extracted::GetStarted;
        }
        payload = Some(postback);
    }

    if let Some(quick_reply) = msg.quick_reply_payload() {
        payload = Some(quick_reply);
    }

    match payload {
        Some(p) if !p.is_empty() => Extracted::Payload(p),
        _ => Extracted::Nothing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    GetStarted,
    Matched { node: String, key: String },
    Unmatched { payload: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendFailure {
    /// position of the failed action in the node
    pub index: usize,
    pub kind: ActionKind,
    pub error: String,
}

/// Summary of one dispatch. Hosts are free to ignore it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub outcome: DispatchOutcome,
    /// kinds of the actions that were sent successfully, in order
    pub sent: Vec<ActionKind>,
    pub failures: Vec<SendFailure>,
    pub unhandled_called: bool,
}

impl DispatchReport {
    fn new(outcome: DispatchOutcome) -> Self {
        Self {
            outcome,
            sent: Vec::new(),
            failures: Vec::new(),
            unhandled_called: false,
        }
    }
}

/// The frozen dialogue graph plus its hooks, ready to receive messages.
///
/// Read-only after [`crate::DialogBuilder::build`]; cheap to clone and safe
/// to share between threads.
pub struct Dispatcher<C> {
    registry: Arc<NodeRegistry<String>>,
    get_started: Option<Handler<C>>,
    unhandled: Option<Handler<C>>,
}

impl<C> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            get_started: self.get_started.clone(),
            unhandled: self.unhandled.clone(),
        }
    }
}

impl<C: SendContext> Dispatcher<C> {
    pub(crate) fn new(
        registry: NodeRegistry<String>,
        get_started: Option<Handler<C>>,
        unhandled: Option<Handler<C>>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            get_started,
            unhandled,
        }
    }

    /// Route one message and run whatever it leads to.
    ///
    /// A handled get-started postback ends dispatch right after its handler.
    /// Every other message, matched or not, is then passed to the unhandled
    /// handler if one is registered.
    #[tracing::instrument(skip_all)]
    pub fn dispatch(&self, ctx: &mut C, msg: &IncomingMessage) -> DispatchReport {
        let payload = match extract_payload(msg, self.get_started.is_some()) {
            Extracted::GetStarted => {
                debug!("get-started postback");
                if let Some(handler) = &self.get_started {
                    handler(ctx, msg);
                }
                return DispatchReport::new(DispatchOutcome::GetStarted);
            }
            Extracted::Payload(payload) => Some(payload),
            Extracted::Nothing => None,
        };

        let mut report = match payload.and_then(|p| self.registry.lookup(p)) {
            Some(node) => self.run_node(ctx, node),
            None => {
                debug!(?payload, "no node for payload");
                DispatchReport::new(DispatchOutcome::Unmatched {
                    payload: payload.map(str::to_string),
                })
            }
        };

        if let Some(handler) = &self.unhandled {
            handler(ctx, msg);
            report.unhandled_called = true;
        }
        report
    }

    fn run_node(&self, ctx: &mut C, node: &Node<String>) -> DispatchReport {
        debug!(node = node.name(), "routing to node");
        let mut report = DispatchReport::new(DispatchOutcome::Matched {
            node: node.name().to_string(),
            key: node.key().to_string(),
        });

        for (index, action) in node.actions().iter().enumerate() {
            let kind = action.kind();
            match send_action(ctx, action) {
                Ok(()) => report.sent.push(kind),
                Err(e) => {
                    error!(
                        node = node.name(),
                        operation = %kind.operation_name(),
                        "send failed: {e:#}"
                    );
                    report.failures.push(SendFailure {
                        index,
                        kind,
                        error: format!("{e:#}"),
                    });
                }
            }
        }
        report
    }

    /// Turn the dispatcher into a plain message handler for a host framework.
    pub fn into_handler(self) -> impl Fn(&mut C, &IncomingMessage) + Send + Sync + 'static
    where
        C: 'static,
    {
        move |ctx: &mut C, msg: &IncomingMessage| {
            self.dispatch(ctx, msg);
        }
    }

    pub fn node(&self, key: &str) -> Option<&Node<String>> {
        self.registry.lookup(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<String>> {
        self.registry.iter()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn has_get_started_handler(&self) -> bool {
        self.get_started.is_some()
    }

    pub fn has_unhandled_handler(&self) -> bool {
        self.unhandled.is_some()
    }

    pub fn graph(&self) -> GraphView {
        GraphView::from_registry(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_started_needs_handler() {
        let msg = IncomingMessage::get_started();
        assert_eq!(extract_payload(&msg, true), Extracted::GetStarted);
        assert_eq!(
            extract_payload(&msg, false),
            Extracted::Payload(GET_STARTED_PAYLOAD)
        );
    }

    #[test]
    fn test_postback_payload() {
        let msg = IncomingMessage::postback("PB");
        assert_eq!(extract_payload(&msg, true), Extracted::Payload("PB"));
    }

    #[test]
    fn test_quick_reply_overrides_postback() {
        let msg = IncomingMessage::postback("PB").with_quick_reply("QR");
        assert_eq!(extract_payload(&msg, false), Extracted::Payload("QR"));
    }

    #[test]
    fn test_get_started_wins_over_quick_reply() {
        let msg = IncomingMessage::get_started().with_quick_reply("QR");
        assert_eq!(extract_payload(&msg, true), Extracted::GetStarted);
        assert_eq!(extract_payload(&msg, false), Extracted::Payload("QR"));
    }

    #[test]
    fn test_empty_or_missing_payload_is_nothing() {
        assert_eq!(extract_payload(&IncomingMessage::text("hi"), true), Extracted::Nothing);
        assert_eq!(extract_payload(&IncomingMessage::default(), true), Extracted::Nothing);
        assert_eq!(extract_payload(&IncomingMessage::postback(""), true), Extracted::Nothing);
        // an empty quick reply still overrides the postback
        let msg = IncomingMessage::postback("PB").with_quick_reply("");
        assert_eq!(extract_payload(&msg, true), Extracted::Nothing);
    }
}
