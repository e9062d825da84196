use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::{
    Direction,
    graph::NodeIndex,
    prelude::StableDiGraph,
};

use crate::registry::NodeRegistry;

/// Directed view of a resolved dialogue graph: one vertex per node (weighted
/// by name), one edge per button or quick reply whose payload is a node key.
#[derive(Debug, Clone)]
pub struct GraphView {
    graph: StableDiGraph<String, ()>,
    index_of: HashMap<String, NodeIndex>,
}

impl GraphView {
    pub fn from_registry(registry: &NodeRegistry<String>) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index_of = HashMap::new();

        for node in registry.iter() {
            let idx = graph.add_node(node.name().to_string());
            index_of.insert(node.key().to_string(), idx);
        }

        for node in registry.iter() {
            let from = index_of[node.key()];
            for action in node.actions() {
                for payload in action.links() {
                    if let Some(&to) = index_of.get(payload.as_str()) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }

        Self { graph, index_of }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Names of the nodes directly linked from the node with `key`, sorted.
    pub fn successors(&self, key: &str) -> Vec<String> {
        let Some(&start) = self.index_of.get(key) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(start, Direction::Outgoing)
            .map(|ix| self.graph[ix].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Names of the nodes a user can never reach starting from `key`, sorted.
    ///
    /// An unknown start key makes every node unreachable.
    pub fn unreachable_from(&self, key: &str) -> Vec<String> {
        let mut reachable = HashSet::new();
        if let Some(&start) = self.index_of.get(key) {
            let mut stack = vec![start];
            while let Some(n) = stack.pop() {
                if reachable.insert(n) {
                    stack.extend(self.graph.neighbors_directed(n, Direction::Outgoing));
                }
            }
        }

        self.graph
            .node_indices()
            .filter(|ix| !reachable.contains(ix))
            .map(|ix| self.graph[ix].clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, Button, QuickReply};
    use crate::key::derive_key;
    use crate::node::Node;

    fn registry() -> NodeRegistry<String> {
        let mut reg: NodeRegistry<String> = NodeRegistry::new();
        reg.insert(Node::new(
            "start",
            vec![Action::button_template(
                "go",
                vec![
                    Button::postback("a", derive_key("a")),
                    Button::web_url("site", "https://example.com"),
                ],
            )],
        ))
        .unwrap();
        reg.insert(Node::new(
            "a",
            vec![Action::quick_replies(
                "back?",
                vec![
                    QuickReply::text("start", derive_key("start")),
                    QuickReply::text("raw", "NOT_A_NODE"),
                ],
            )],
        ))
        .unwrap();
        reg.insert(Node::new("island", vec![Action::text("alone")]))
            .unwrap();
        reg
    }

    #[test]
    fn test_edges_follow_node_payloads_only() {
        let view = GraphView::from_registry(&registry());
        assert_eq!(view.node_count(), 3);
        assert_eq!(view.edge_count(), 2);
        assert!(view.has_cycles());
        assert_eq!(view.successors(&derive_key("start")), vec!["a"]);
        assert!(view.successors("unknown").is_empty());
    }

    #[test]
    fn test_unreachable() {
        let view = GraphView::from_registry(&registry());
        assert_eq!(view.unreachable_from(&derive_key("start")), vec!["island"]);
        assert_eq!(view.unreachable_from(&derive_key("island")), vec!["a", "start"]);
        assert_eq!(view.unreachable_from("nope").len(), 3);
    }

    #[test]
    fn test_acyclic() {
        let mut reg: NodeRegistry<String> = NodeRegistry::new();
        reg.insert(Node::new(
            "x",
            vec![Action::button_template("t", vec![Button::postback("y", derive_key("y"))])],
        ))
        .unwrap();
        reg.insert(Node::new("y", vec![])).unwrap();
        assert!(!GraphView::from_registry(&reg).has_cycles());
    }
}
