use thiserror::Error;

use crate::action::ActionKind;

/// Errors raised while setting up a dialogue graph.
///
/// Dispatch never produces these: an unknown payload is ordinary control flow.
#[derive(Debug, Error)]
pub enum DialogError {
    #[error("can not create node with duplicate name `{name}` (key {key})")]
    DuplicateNode { name: String, key: String },

    #[error("node `{node}` links to `{target}`, which was never created")]
    UnresolvedReference { node: String, target: String },

    #[error("node `{node}` uses `{kind}`, which the context can not send")]
    UnsupportedAction { node: String, kind: ActionKind },

    #[error("node `{node}` refers to unknown node `{target}`")]
    UnknownNode { node: String, target: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
