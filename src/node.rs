use std::fmt;

use crate::action::Action;
use crate::key::derive_key;

/// Handle to a node, usable before the node itself exists.
///
/// Only the key matters for routing; the name is kept for error messages.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeRef {
    key: String,
    name: String,
}

impl NodeRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: derive_key(&name),
            name,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.name).finish()
    }
}

/// A named point in the dialogue graph. Immutable once registered.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<P> {
    key: String,
    name: String,
    actions: Vec<Action<P>>,
}

impl<P> Node<P> {
    pub fn new(name: impl Into<String>, actions: Vec<Action<P>>) -> Self {
        let name = name.into();
        Self {
            key: derive_key(&name),
            name,
            actions,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action<P>] {
        &self.actions
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            key: self.key.clone(),
            name: self.name.clone(),
        }
    }

    /// Rebuild this node with every action mapped through `f`, keeping key and name.
    pub(crate) fn try_map_actions<Q, E>(
        &self,
        mut f: impl FnMut(&Action<P>) -> Result<Action<Q>, E>,
    ) -> Result<Node<Q>, E> {
        Ok(Node {
            key: self.key.clone(),
            name: self.name.clone(),
            actions: self.actions.iter().map(&mut f).collect::<Result<_, _>>()?,
        })
    }
}
