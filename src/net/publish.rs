//! Publish gatekeeper.
//!
//! Every outbound message passes through [`Gatekeeper`], which refuses
//! topics outside [`ALLOWED_OUTBOUND`] before anything reaches the
//! transport.

use serde::Serialize;

use super::{Envelope, Network, ALLOWED_OUTBOUND};
use crate::config::PAYLOAD_LEN;
use crate::error::{LinkError, PublishError};

pub struct Gatekeeper<N> {
    network: N,
}

impl<N: Network> Gatekeeper<N> {
    pub fn new(network: N) -> Self {
        Self { network }
    }

    pub fn is_allowed(topic: &str) -> bool {
        ALLOWED_OUTBOUND.iter().any(|allowed| *allowed == topic)
    }

    fn check(topic: &str) -> Result<(), PublishError> {
        if Self::is_allowed(topic) {
            Ok(())
        } else {
            warn!("publish: refusing topic {}", topic);
            Err(PublishError::NotAllowed)
        }
    }

    /// Forward raw bytes if `topic` is allow-listed.
    pub fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        Self::check(topic)?;
        self.network.publish(topic, payload)?;
        debug!("publish: {} ({} bytes)", topic, payload.len());
        Ok(())
    }

    /// Serialize `value` as JSON and forward it if `topic` is allow-listed.
    pub fn publish_json<T: Serialize>(&mut self, topic: &str, value: &T) -> Result<(), PublishError> {
        Self::check(topic)?;
        let mut buf = [0u8; PAYLOAD_LEN];
        let len = serde_json_core::to_slice(value, &mut buf).map_err(|_| PublishError::Encode)?;
        self.publish(topic, &buf[..len])
    }

    pub fn connect(&mut self) -> Result<(), LinkError> {
        self.network.connect()
    }

    pub fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        self.network.subscribe(topic)
    }

    pub fn poll_incoming(&mut self) -> Result<Option<Envelope>, LinkError> {
        self.network.poll_incoming()
    }
}
