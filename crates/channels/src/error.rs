use thiserror::Error;

use crate::Destination;

/// Errors raised when handing an envelope to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The channel no longer accepts envelopes.
    #[error("Channel {channel} is closed")]
    Closed { channel: Destination },

    /// The channel is at capacity.
    #[error("Channel {channel} is full (capacity {capacity})")]
    Full {
        channel: Destination,
        capacity: usize,
    },

    /// The channel's receiver was already taken.
    #[error("Channel {channel} already has a subscriber")]
    AlreadySubscribed { channel: Destination },
}

impl ChannelError {
    /// Returns the channel the error refers to.
    pub fn channel(&self) -> Destination {
        match self {
            ChannelError::Closed { channel }
            | ChannelError::Full { channel, .. }
            | ChannelError::AlreadySubscribed { channel } => *channel,
        }
    }
}

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
