mod message;
mod message_log;

pub use message::*;
pub use message_log::*;
