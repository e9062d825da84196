//! Payload-routed dialogue graphs for messaging bots.
//!
//! Nodes are registered on a [`DialogBuilder`], may link to each other (in
//! any order, cycles included) through buttons and quick replies, and are
//! frozen into a [`Dispatcher`] that routes each incoming message to the node
//! its payload names.
//!
//! ```no_run
//! use dialog_graph::{Action, Button, Capabilities, DialogBuilder, IncomingMessage, SendContext};
//!
//! struct Bot;
//! impl SendContext for Bot {
//!     fn capabilities() -> Capabilities { Capabilities::all() }
//! }
//!
//! let mut builder = DialogBuilder::<Bot>::new();
//! let menu = builder.node_ref("menu");
//! builder.create_node("hello", vec![
//!     Action::button_template("Hi!", vec![Button::postback("Menu", &menu)]),
//! ])?;
//! builder.create_node("menu", vec![Action::text("Here is the menu")])?;
//! builder.on_unhandled(|_bot, msg| tracing::info!(?msg, "unhandled"));
//!
//! let dispatcher = builder.build()?;
//! dispatcher.dispatch(&mut Bot, &IncomingMessage::postback(menu.key()));
//! # Ok::<(), dialog_graph::DialogError>(())
//! ```

pub mod action;
pub mod builder;
pub mod config;
pub mod console;
pub mod context;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod graph;
pub mod key;
pub mod logger;
pub mod node;
pub mod registry;

pub use action::{Action, ActionKind, Button, Link, NodeAction, QuickReply, QuickReplyKind, ResolvedAction};
pub use builder::{DialogBuilder, Handler};
pub use channel_message::{GET_STARTED_PAYLOAD, IncomingMessage};
pub use context::{Capabilities, SendContext, UnsupportedOperation, send_action};
pub use dispatcher::{DispatchOutcome, DispatchReport, Dispatcher, Extracted, SendFailure, extract_payload};
pub use error::DialogError;
pub use key::{derive_key, is_node_key};
pub use node::{Node, NodeRef};
