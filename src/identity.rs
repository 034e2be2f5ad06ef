//! Who this device is on the network.
//!
//! Built once at startup from the chip's unique id and the configured
//! display name, then handed out by reference.

use core::fmt::Write;

use heapless::String;

use crate::config::{BROADCAST_ID, CLIENT_ID_PREFIX};
use crate::text::{truncated, Name};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    client_id: Name,
    hardware_id: String<32>,
    display_name: Name,
}

impl Identity {
    pub fn new(unique_id: &[u8], display_name: &str) -> Self {
        let mut hardware_id: String<32> = String::new();
        for byte in unique_id {
            if write!(hardware_id, "{:02x}", byte).is_err() {
                break;
            }
        }

        let mut client_id = Name::new();
        let _ = client_id.push_str(CLIENT_ID_PREFIX);
        for c in hardware_id.chars() {
            if client_id.push(c).is_err() {
                break;
            }
        }

        Self {
            client_id,
            hardware_id,
            display_name: truncated(display_name),
        }
    }

    /// `mothership_` followed by the lowercase hex unique id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Lowercase hex of the chip's unique id.
    pub fn hardware_id(&self) -> &str {
        &self.hardware_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// True iff `client_id` is the broadcast id, this device's client id,
    /// or its display name.
    pub fn is_addressed_to_me(&self, client_id: &str) -> bool {
        client_id == BROADCAST_ID
            || client_id == self.client_id.as_str()
            || client_id == self.display_name.as_str()
    }

    /// True if `sender` names this device.
    pub fn is_self(&self, sender: &str) -> bool {
        sender == self.display_name.as_str() || sender == self.client_id.as_str()
    }
}
