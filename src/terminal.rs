//! The session loop.
//!
//! [`Terminal`] owns the display, the input source and the publish
//! gatekeeper, and alternates between routing one inbound envelope and
//! handling one input event. Losing the link drops back to the connect
//! path, which re-subscribes from scratch.

use crate::config::DeviceConfig;
use crate::error::{Error, LinkError, PublishError};
use crate::heartbeat::{ConfigSnapshot, Heartbeat};
use crate::identity::Identity;
use crate::inbox::UnreadQueue;
use crate::input::{Button, Direction, InputEvent, InputSource};
use crate::net::payload::DirectMessageOut;
use crate::net::publish::Gatekeeper;
use crate::net::{Network, Topic};
use crate::text::{Name, Text};
use crate::ui::dialog::{ask_yes_no, compose_text, pick_or_compose, DialogResult};
use crate::ui::menu::{MenuAction, MenuNavigator};
use crate::ui::{show_lines, show_message, Display};

/// Read-only state shared with the rest of the firmware.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub identity: &'a Identity,
    pub config: &'a DeviceConfig,
    pub heartbeat: &'a Heartbeat,
    /// Recipients offered by the Send action.
    pub contacts: &'a [Name],
    /// Prepared messages offered when not writing a new one.
    pub canned_messages: &'a [Text],
}

pub struct Terminal<'a, D, I, N> {
    pub(crate) ctx: Context<'a>,
    pub(crate) display: D,
    pub(crate) input: I,
    pub(crate) gatekeeper: Gatekeeper<N>,
    pub(crate) inbox: UnreadQueue,
    menu: MenuNavigator,
    connected: bool,
}

impl<'a, D: Display, I: InputSource, N: Network> Terminal<'a, D, I, N> {
    pub fn new(ctx: Context<'a>, display: D, input: I, network: N) -> Self {
        Self {
            ctx,
            display,
            input,
            gatekeeper: Gatekeeper::new(network),
            inbox: UnreadQueue::new(),
            menu: MenuNavigator::new(),
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn inbox(&self) -> &UnreadQueue {
        &self.inbox
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Open the broker session, subscribe and announce the configuration.
    pub fn connect(&mut self) -> Result<(), Error> {
        let server = self.ctx.config.mqtt_server.as_str();
        show_lines(&mut self.display, &["Connecting to", "MQTT Server:", server]);

        self.gatekeeper.connect()?;
        for topic in Topic::SUBSCRIBED {
            self.gatekeeper.subscribe(topic.name())?;
        }
        info!("session: connected to {}", server);
        show_lines(&mut self.display, &["Connected!", "Mothership", "Synced!"]);

        self.publish_config()?;
        self.connected = true;
        self.menu.render(&mut self.display);
        Ok(())
    }

    /// One pass of the main loop.
    pub fn run_once(&mut self) {
        if !self.connected {
            if let Err(e) = self.connect() {
                warn!("session: connect failed: {}", e);
                self.input.idle();
            }
            return;
        }

        match self.gatekeeper.poll_incoming() {
            Ok(Some(envelope)) => self.route(&envelope),
            Ok(None) => {}
            Err(e) => {
                self.connection_lost(e);
                return;
            }
        }
        if !self.connected {
            return;
        }

        match self.input.poll_event() {
            Some(event) => self.handle_input(event),
            None => self.input.idle(),
        }
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.run_once();
        }
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Press(Button::Left) | InputEvent::Turn(Direction::CounterClockwise) => {
                self.menu.left(&mut self.display)
            }
            InputEvent::Press(Button::Right) | InputEvent::Turn(Direction::Clockwise) => {
                self.menu.right(&mut self.display)
            }
            InputEvent::Press(Button::Select) => {
                let action = self.menu.select();
                self.perform(action);
            }
            _ => {}
        }
    }

    /// Run a menu action to completion.
    pub fn perform(&mut self, action: MenuAction) {
        match action {
            MenuAction::Send => {
                if let Err(e) = self.send_message() {
                    self.publish_failed(e);
                }
            }
            MenuAction::Messages => self.show_oldest_message(),
            MenuAction::Info => self.show_info(),
        }
    }

    fn send_message(&mut self) -> Result<(), PublishError> {
        let message = if ask_yes_no(&mut self.display, &mut self.input, "New Message?") {
            DialogResult::ComposedText(compose_text(&mut self.display, &mut self.input, "Message:"))
        } else {
            pick_or_compose(
                &mut self.display,
                &mut self.input,
                "Message:",
                self.ctx.canned_messages,
            )
        };
        let recipient = pick_or_compose(
            &mut self.display,
            &mut self.input,
            "User:",
            self.ctx.contacts,
        );

        self.gatekeeper.publish_json(
            "msg",
            &DirectMessageOut {
                client_id: recipient.as_str(),
                user_from: self.ctx.identity.display_name(),
                message: message.as_str(),
            },
        )?;
        info!("session: message sent to {}", recipient.as_str());
        show_lines(&mut self.display, &["Message", "Published!"]);
        Ok(())
    }

    fn show_oldest_message(&mut self) {
        match self.inbox.pop_oldest() {
            Some(message) => show_message(&mut self.display, &message.from, &message.body),
            None => show_lines(&mut self.display, &["No messages"]),
        }
    }

    fn show_info(&mut self) {
        let identity = self.ctx.identity;
        show_lines(
            &mut self.display,
            &[
                identity.display_name(),
                self.ctx.config.mqtt_server.as_str(),
                identity.hardware_id(),
            ],
        );
    }

    pub(crate) fn publish_config(&mut self) -> Result<(), PublishError> {
        let snapshot = ConfigSnapshot {
            client_id: self.ctx.identity.client_id(),
            username: self.ctx.identity.display_name(),
            server: self.ctx.config.mqtt_server.as_str(),
            hz: self.ctx.heartbeat.frequency_hz(),
        };
        self.ctx.heartbeat.publish_config(&mut self.gatekeeper, &snapshot)
    }

    /// Log a failed publish; a link failure ends the session.
    pub(crate) fn publish_failed(&mut self, e: PublishError) {
        match e {
            PublishError::Link(link) => self.connection_lost(link),
            other => warn!("session: publish failed: {}", other),
        }
    }

    fn connection_lost(&mut self, e: LinkError) {
        warn!("session: connection lost: {}", e);
        self.connected = false;
        show_lines(
            &mut self.display,
            &["Connection lost", self.ctx.config.mqtt_server.as_str()],
        );
    }
}
