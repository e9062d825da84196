// src/definition.rs

use std::{collections::HashSet, fs, path::Path};

use channel_message::IncomingMessage;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    action::{Action, Link, ResolvedAction},
    builder::DialogBuilder,
    context::{SendContext, send_action},
    error::DialogError,
    key::derive_key,
    node::NodeRef,
};

/// A link as written in a definition file: `{"to": "<node name>"}` or a
/// literal payload string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LinkSpec {
    Node { to: String },
    Payload(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NodeDefinition {
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action<LinkSpec>>,
}

/// A whole dialogue graph in JSON.
///
/// ```json
/// {
///   "get_started": "welcome",
///   "nodes": [
///     { "name": "welcome", "actions": [
///         { "type": "text", "text": "Hi!" },
///         { "type": "quick_replies", "text": "Want more?",
///           "quick_replies": [ { "title": "Yes", "payload": { "to": "more" } } ] }
///     ] },
///     { "name": "more", "actions": [ { "type": "text", "text": "More." } ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GraphDefinition {
    /// node whose actions answer the get-started postback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_started: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
}

impl GraphDefinition {
    pub fn from_json(json: &str) -> Result<Self, DialogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DialogError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let definition = Self::from_json(&json)?;
        info!(
            "Loaded {} node definitions from {}",
            definition.nodes.len(),
            path.display()
        );
        Ok(definition)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), DialogError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get_started_key(&self) -> Option<String> {
        self.get_started.as_deref().map(derive_key)
    }

    /// Register every node of this definition on a fresh builder.
    ///
    /// All names are known up front, so links may point forwards or form
    /// cycles; a link to a name that is not defined fails with
    /// [`DialogError::UnknownNode`]. When `get_started` is set, the
    /// get-started handler sends that node's actions.
    pub fn to_builder<C: SendContext>(&self) -> Result<DialogBuilder<C>, DialogError> {
        let names: HashSet<&str> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        let mut builder = DialogBuilder::new();

        for node in &self.nodes {
            let actions = node
                .actions
                .iter()
                .map(|action| {
                    action.try_map_links(|link| match link {
                        LinkSpec::Payload(payload) => Ok(Link::Payload(payload.clone())),
                        LinkSpec::Node { to } if names.contains(to.as_str()) => {
                            Ok(Link::Node(NodeRef::new(to)))
                        }
                        LinkSpec::Node { to } => Err(DialogError::UnknownNode {
                            node: node.name.clone(),
                            target: to.clone(),
                        }),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            builder.create_node(&node.name, actions)?;
        }

        if let Some(start) = &self.get_started {
            let node = self
                .nodes
                .iter()
                .find(|n| &n.name == start)
                .ok_or_else(|| DialogError::UnknownNode {
                    node: "get_started".to_string(),
                    target: start.clone(),
                })?;
            let actions: Vec<ResolvedAction> = node
                .actions
                .iter()
                .map(|action| {
                    action.try_map_links(|link| {
                        Ok::<_, DialogError>(match link {
                            LinkSpec::Payload(payload) => payload.clone(),
                            LinkSpec::Node { to } => derive_key(to),
                        })
                    })
                })
                .collect::<Result<_, _>>()?;
            let name = node.name.clone();

            builder.on_get_started(move |ctx: &mut C, _msg: &IncomingMessage| {
                for action in &actions {
                    if let Err(e) = send_action(ctx, action) {
                        error!(node = %name, "get-started send failed: {e:#}");
                    }
                }
            });
        }

        Ok(builder)
    }
}
