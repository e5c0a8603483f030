use tokio::sync::oneshot;

use crate::error::SendError;
use crate::message::Message;

/// Requests from the presentation layer to the coordinator task.
#[derive(Debug)]
pub enum RoomCommand {
    Send {
        text: String,
        reply: oneshot::Sender<Result<Message, SendError>>,
    },
    Leave,
}
