//! Error types for the mothership core.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (with the `defmt` feature) for efficient
//! on-target logging.

use thiserror::Error as ThisError;

/// Top-level error type used by the session loop and the firmware glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The co-processor link failed or reported the broker as gone.
    #[error("link: {0}")]
    Link(#[from] LinkError),

    /// An outbound message was refused or could not be sent.
    #[error("publish: {0}")]
    Publish(#[from] PublishError),

    /// Flash read/write/erase failed.
    #[error("configuration storage failed")]
    Storage,
}

/// Why an inbound envelope was dropped at the router boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RouteError {
    /// Payload is not JSON, lacks a required field, carries a field of the
    /// wrong type, or a field exceeds its capacity.
    #[error("malformed payload")]
    Malformed,

    /// Valid envelope aimed at another device.
    #[error("not addressed to this device")]
    NotAddressed,

    /// A question this device sent itself.
    #[error("sent by this device")]
    OwnMessage,

    /// A question with nothing to choose from.
    #[error("question has no options")]
    EmptyOptions,

    /// Topic has no action on this device.
    #[error("no action defined for topic")]
    Unhandled,
}

/// Failures reported by the network collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Connection to the broker is gone.
    #[error("disconnected")]
    Disconnected,

    /// Outbound queue is full.
    #[error("outbound queue full")]
    Busy,
}

/// Failures of the publish gatekeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PublishError {
    /// Topic is not on the outbound allow-list.
    #[error("topic is not on the publish allow-list")]
    NotAllowed,

    /// Payload did not fit the serialization buffer.
    #[error("payload could not be encoded")]
    Encode,

    #[error("{0}")]
    Link(#[from] LinkError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeartbeatError {
    #[error("heartbeat frequency {0} Hz is out of range")]
    FrequencyOutOfRange(u8),
}

/// Persisted configuration could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Line (1-based) has no `=` separator.
    #[error("line {0} is not a key=value pair")]
    MalformedLine(usize),

    /// Line (1-based) holds a value longer than the storage slot.
    #[error("value on line {0} is too long")]
    ValueTooLong(usize),
}
