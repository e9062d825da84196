use std::collections::HashMap;

use tracing::info;

use crate::error::DialogError;
use crate::node::Node;

/// Key → node map. A key can be registered once; the first node wins.
#[derive(Debug, Clone)]
pub struct NodeRegistry<P> {
    nodes: HashMap<String, Node<P>>,
    /// registration order, for stable iteration
    order: Vec<String>,
}

impl<P> Default for NodeRegistry<P> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<P> NodeRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node<P>) -> Result<(), DialogError> {
        if self.nodes.contains_key(node.key()) {
            return Err(DialogError::DuplicateNode {
                name: node.name().to_string(),
                key: node.key().to_string(),
            });
        }
        info!("Registered node: {}", node.name());
        self.order.push(node.key().to_string());
        self.nodes.insert(node.key().to_string(), node);
        Ok(())
    }

    pub fn lookup(&self, key: &str) -> Option<&Node<P>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Node<P>> {
        self.order.iter().filter_map(|key| self.nodes.get(key))
    }

    /// Build a new registry with every node mapped through `f`, keeping order.
    pub(crate) fn try_map_nodes<Q, E>(
        &self,
        mut f: impl FnMut(&Node<P>) -> Result<Node<Q>, E>,
    ) -> Result<NodeRegistry<Q>, E> {
        let mut nodes = HashMap::with_capacity(self.nodes.len());
        for node in self.iter() {
            let mapped = f(node)?;
            nodes.insert(mapped.key().to_string(), mapped);
        }
        Ok(NodeRegistry {
            nodes,
            order: self.order.clone(),
        })
    }
}
