mod signal_event;
mod signaling_client;
mod signaling_output;

pub use signal_event::*;
pub use signaling_client::*;
pub use signaling_output::*;
