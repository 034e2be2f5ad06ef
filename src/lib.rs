//! Host-testable core of the mothership messaging terminal.
//!
//! Everything that does not touch a peripheral lives here: quadrature
//! decoding, button debouncing, the dialog and menu state machines, the
//! inbound message router, the heartbeat controller and the publish
//! gatekeeper. The embedded binary (`src/main.rs`, `embedded` feature)
//! supplies the hardware collaborators through the [`ui::Display`],
//! [`input::InputSource`] and [`net::Network`] traits.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main].
//! This crate never allocates; all text is held in `heapless` strings.

#![cfg_attr(not(test), no_std)]

// Lets the shared test fakes name this crate the way `tests/` does.
#[cfg(test)]
extern crate self as mothership;

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod heartbeat;
pub mod identity;
pub mod inbox;
pub mod input;
pub mod net;
pub mod router;
pub mod setup;
pub mod terminal;
pub mod text;
pub mod ui;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
pub(crate) mod testing;

pub use config::DeviceConfig;
pub use error::{ConfigError, Error, HeartbeatError, LinkError, PublishError, RouteError};
pub use heartbeat::{Heartbeat, Schedule};
pub use identity::Identity;
pub use inbox::{Message, UnreadQueue};
pub use input::encoder::Encoder;
pub use input::{
    Button, Direction, InputEvent, InputSource, Panel, RawLevels, SampledInput, Sampler,
};
pub use net::publish::Gatekeeper;
pub use net::{Envelope, Network, Topic};
pub use terminal::{Context, Terminal};
pub use text::{Name, Text};
pub use ui::dialog::DialogResult;
pub use ui::menu::{MenuAction, MenuNavigator};
pub use ui::Display;
