pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_3: &str = "stun:stun.stunprotocol.org:3478";

/// Label of the single text channel both peers talk over.
pub const CHAT_CHANNEL_LABEL: &str = "chat";
