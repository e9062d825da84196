use std::sync::Arc;

use channel_message::IncomingMessage;
use tracing::{info, warn};

use crate::action::{Link, NodeAction};
use crate::context::SendContext;
use crate::dispatcher::Dispatcher;
use crate::error::DialogError;
use crate::node::{Node, NodeRef};
use crate::registry::NodeRegistry;

/// A lifecycle callback: receives the outbound context and the incoming message.
pub type Handler<C> = Arc<dyn Fn(&mut C, &IncomingMessage) + Send + Sync>;

/// Collects nodes and hooks, then freezes them into a [`Dispatcher`].
///
/// Nodes may link to nodes that are created later (including cycles): a
/// [`NodeRef`] is just the derived key, and links are only checked and
/// resolved in [`DialogBuilder::build`].
pub struct DialogBuilder<C> {
    get_started: Option<Handler<C>>,
    unhandled: Option<Handler<C>>,
    registry: NodeRegistry<Link>,
}

impl<C> Default for DialogBuilder<C> {
    fn default() -> Self {
        Self {
            get_started: None,
            unhandled: None,
            registry: NodeRegistry::new(),
        }
    }
}

impl<C: SendContext> DialogBuilder<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get_started<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut C, &IncomingMessage) + Send + Sync + 'static,
    {
        if self.get_started.is_some() {
            warn!("Replacing get-started handler");
        }
        self.get_started = Some(Arc::new(handler));
        self
    }

    pub fn on_unhandled<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut C, &IncomingMessage) + Send + Sync + 'static,
    {
        if self.unhandled.is_some() {
            warn!("Replacing unhandled handler");
        }
        self.unhandled = Some(Arc::new(handler));
        self
    }

    /// Reference a node by name, whether or not it has been created yet.
    pub fn node_ref(&self, name: &str) -> NodeRef {
        NodeRef::new(name)
    }

    pub fn create_node(
        &mut self,
        name: &str,
        actions: Vec<NodeAction>,
    ) -> Result<NodeRef, DialogError> {
        let node = Node::new(name, actions);
        let node_ref = node.node_ref();
        self.registry.insert(node)?;
        Ok(node_ref)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Check every node against `C`'s capabilities, resolve every link to the
    /// key of its target, and hand back the frozen dispatcher.
    pub fn build(self) -> Result<Dispatcher<C>, DialogError> {
        let capabilities = C::capabilities();
        let registry = &self.registry;

        let resolved = registry.try_map_nodes(|node| {
            for action in node.actions() {
                if !capabilities.supports(action.kind()) {
                    return Err(DialogError::UnsupportedAction {
                        node: node.name().to_string(),
                        kind: action.kind(),
                    });
                }
            }
            node.try_map_actions(|action| {
                action.try_map_links(|link| match link {
                    Link::Payload(payload) => Ok(payload.clone()),
                    Link::Node(target) if registry.contains(target.key()) => {
                        Ok(target.key().to_string())
                    }
                    Link::Node(target) => Err(DialogError::UnresolvedReference {
                        node: node.name().to_string(),
                        target: target.name().to_string(),
                    }),
                })
            })
        })?;

        info!("Built dialogue graph with {} nodes", resolved.len());
        Ok(Dispatcher::new(resolved, self.get_started, self.unhandled))
    }
}
