mod ice_candidate_buffer;

pub use ice_candidate_buffer::*;
