use crate::channel::Channel;

/// Direction and addressing of a remote procedure call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcKind {
    /// Client to server
    Server,
    /// Server to every observer
    Observers,
    /// Server to one chosen connection
    Target,
}

/// Per-method RPC settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcOptions {
    /// Server RPCs are only run when sent by the owning connection
    pub require_ownership: bool,
    /// Observers RPCs keep their last payload for observers that join later
    pub buffer_last: bool,
    pub channel: Channel,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            require_ownership: true,
            buffer_last: false,
            channel: Channel::Reliable,
        }
    }
}

impl RpcOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_ownership(mut self, require: bool) -> Self {
        self.require_ownership = require;
        self
    }

    pub fn buffer_last(mut self, buffer: bool) -> Self {
        self.buffer_last = buffer;
        self
    }

    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}
