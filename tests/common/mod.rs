//! Fakes shared by the unit tests and the end-to-end tests.
//!
//! The library mounts this file as `crate::testing` under `cfg(test)`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use mothership::text::truncated;
use mothership::{
    Context, DeviceConfig, Display, Envelope, Heartbeat, Identity, InputEvent, InputSource,
    LinkError, Name, Network, Terminal, Text,
};

/// Replays a fixed list of events.
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
    pub idles: usize,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            idles: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    fn idle(&mut self) {
        self.idles += 1;
    }

    fn wait_event(&mut self) -> InputEvent {
        self.events
            .pop_front()
            .expect("dialog waited for input past the end of the script")
    }
}

/// Records every presented frame as a list of `(y, text)` rows.
#[derive(Default)]
pub struct FrameLog {
    pending: Vec<(i32, String)>,
    pub frames: Vec<Vec<(i32, String)>>,
}

impl FrameLog {
    /// Row texts of frame `index`.
    pub fn text(&self, index: usize) -> Vec<&str> {
        self.frames[index].iter().map(|(_, t)| t.as_str()).collect()
    }

    pub fn last_text(&self) -> Vec<&str> {
        match self.frames.len() {
            0 => Vec::new(),
            n => self.text(n - 1),
        }
    }
}

impl Display for FrameLog {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_text(&mut self, text: &str, y: i32) {
        self.pending.push((y, text.to_string()));
    }

    fn present(&mut self) {
        self.frames.push(self.pending.clone());
    }
}

#[derive(Default)]
struct BrokerState {
    connects: usize,
    subscriptions: Vec<String>,
    published: Vec<(String, String)>,
    incoming: VecDeque<Result<Envelope, LinkError>>,
    fail_connect: bool,
    fail_publish: bool,
}

/// Broker stand-in. Clones share one state: the terminal owns one handle
/// and the test keeps another to feed traffic and inspect what went out.
#[derive(Clone, Default)]
pub struct RecordingNetwork {
    state: Rc<RefCell<BrokerState>>,
}

impl RecordingNetwork {
    pub fn deliver(&self, topic: &str, json: &str) {
        let envelope = Envelope::new(topic, json.as_bytes()).expect("test envelope fits");
        self.state.borrow_mut().incoming.push_back(Ok(envelope));
    }

    pub fn drop_connection(&self) {
        self.state
            .borrow_mut()
            .incoming
            .push_back(Err(LinkError::Disconnected));
    }

    pub fn fail_connect(&self, fail: bool) {
        self.state.borrow_mut().fail_connect = fail;
    }

    pub fn fail_publish(&self, fail: bool) {
        self.state.borrow_mut().fail_publish = fail;
    }

    pub fn connects(&self) -> usize {
        self.state.borrow().connects
    }

    pub fn subscriptions(&self) -> Vec<String> {
        self.state.borrow().subscriptions.clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.state.borrow().published.clone()
    }

    pub fn published_on(&self, topic: &str) -> Vec<String> {
        self.state
            .borrow()
            .published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Network for RecordingNetwork {
    fn connect(&mut self) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        state.connects += 1;
        if state.fail_connect {
            return Err(LinkError::Disconnected);
        }
        state.subscriptions.clear();
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), LinkError> {
        self.state.borrow_mut().subscriptions.push(topic.to_string());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), LinkError> {
        let mut state = self.state.borrow_mut();
        if state.fail_publish {
            return Err(LinkError::Disconnected);
        }
        let body = String::from_utf8(payload.to_vec()).expect("payloads are UTF-8");
        state.published.push((topic.to_string(), body));
        Ok(())
    }

    fn poll_incoming(&mut self) -> Result<Option<Envelope>, LinkError> {
        self.state.borrow_mut().incoming.pop_front().transpose()
    }
}

pub type TestTerminal<'a> = Terminal<'a, FrameLog, ScriptedInput, RecordingNetwork>;

/// Long-lived state a [`Terminal`] borrows, plus the broker handle.
pub struct Fixture {
    pub identity: Identity,
    pub config: DeviceConfig,
    pub heartbeat: Heartbeat,
    pub contacts: Vec<Name>,
    pub canned_messages: Vec<Text>,
    pub network: RecordingNetwork,
}

impl Fixture {
    /// "Scotty" on `10.0.0.2`, unique id `0a0b`, two contacts and two
    /// canned messages.
    pub fn new() -> Self {
        let mut fx = Self::empty_lists();
        fx.contacts = vec![truncated("Bob"), truncated("Ann")];
        fx.canned_messages = vec![truncated("Hello"), truncated("On my way")];
        fx
    }

    pub fn empty_lists() -> Self {
        let mut config = DeviceConfig::default();
        config.username = truncated("Scotty");
        config.mqtt_server = truncated("10.0.0.2");
        Self {
            identity: Identity::new(&[0x0a, 0x0b], &config.username),
            config,
            heartbeat: Heartbeat::new(1),
            contacts: Vec::new(),
            canned_messages: Vec::new(),
            network: RecordingNetwork::default(),
        }
    }

    pub fn context(&self) -> Context<'_> {
        Context {
            identity: &self.identity,
            config: &self.config,
            heartbeat: &self.heartbeat,
            contacts: &self.contacts,
            canned_messages: &self.canned_messages,
        }
    }

    /// A terminal wired to [`Fixture::network`].
    pub fn terminal(&self, script: impl IntoIterator<Item = InputEvent>) -> TestTerminal<'_> {
        Terminal::new(
            self.context(),
            FrameLog::default(),
            ScriptedInput::new(script),
            self.network.clone(),
        )
    }

    pub fn envelope(&self, topic: &str, json: &str) -> Envelope {
        Envelope::new(topic, json.as_bytes()).expect("test envelope fits")
    }
}
