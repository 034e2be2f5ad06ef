//! Network boundary - topics, envelopes and the transport trait.
//!
//! ## Components
//!
//! - **Topic**: the closed set of topics this device subscribes to
//! - **Network**: transport implemented by the co-processor link (firmware)
//!   and by recording fakes (tests)
//! - **Gatekeeper**: the only path for outbound traffic
//! - **payload**: JSON bodies of the topics the device understands
//! - **frame**: line codec spoken with the co-processor

pub mod frame;
pub mod payload;
pub mod publish;

use heapless::{String, Vec};

use crate::config::{NAME_LEN, PAYLOAD_LEN};
use crate::error::LinkError;
use crate::text::bounded;

/// Topics the device subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Topic {
    LightMsg,
    Time,
    Test,
    GetConfig,
    Msg,
    YouThere,
    Here,
    Question,
    Response,
    Squeeze,
}

impl Topic {
    /// Subscribed on every (re)connect, in this order.
    pub const SUBSCRIBED: [Topic; 10] = [
        Topic::LightMsg,
        Topic::Time,
        Topic::Test,
        Topic::GetConfig,
        Topic::Msg,
        Topic::YouThere,
        Topic::Here,
        Topic::Question,
        Topic::Response,
        Topic::Squeeze,
    ];

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Topic::LightMsg => "lightMsg",
            Topic::Time => "time",
            Topic::Test => "test",
            Topic::GetConfig => "getConfig",
            Topic::Msg => "msg",
            Topic::YouThere => "youThere",
            Topic::Here => "here",
            Topic::Question => "question",
            Topic::Response => "response",
            Topic::Squeeze => "squeeze",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::SUBSCRIBED.into_iter().find(|topic| topic.name() == name)
    }
}

/// Topic names the device may publish on.
pub const ALLOWED_OUTBOUND: [&str; 7] =
    ["config", "time", "msg", "here", "youThere", "response", "squeeze"];

/// Inbound topic name and payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    topic: String<NAME_LEN>,
    payload: Vec<u8, PAYLOAD_LEN>,
}

impl Envelope {
    /// `None` if either part exceeds its buffer.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self {
            topic: bounded(topic)?,
            payload: Vec::from_slice(payload).ok()?,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Publish/subscribe transport.
///
/// Any `Err` means the session is gone; the caller reconnects with
/// [`Network::connect`], which also drops previous subscriptions.
pub trait Network {
    fn connect(&mut self) -> Result<(), LinkError>;

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), LinkError>;

    /// Next received envelope, without waiting.
    fn poll_incoming(&mut self) -> Result<Option<Envelope>, LinkError>;
}
