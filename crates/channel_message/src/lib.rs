pub mod message;

pub use message::{
    GET_STARTED_PAYLOAD, IncomingMessage, MessageBody, Postback, QuickReplySelection,
};
