mod data_channel_session;

pub use data_channel_session::*;
