mod peer_connection_context;
mod room_command;
mod room_coordinator;
mod room_session;
mod session_event;

pub use peer_connection_context::*;
pub use room_command::*;
pub use room_coordinator::*;
pub use room_session::*;
pub use session_event::*;
