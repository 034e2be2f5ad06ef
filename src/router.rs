//! Inbound message router.
//!
//! Decodes an [`Envelope`] into a closed [`Inbound`] value and applies it
//! to the terminal. Anything malformed, misaddressed or unhandled is
//! logged and dropped here; device state is only touched once a payload
//! has fully decoded.

use core::fmt::Write;

use heapless::String;
use serde::Deserialize;

use crate::config::TEXT_LEN;
use crate::error::RouteError;
use crate::identity::Identity;
use crate::inbox::Message;
use crate::input::InputSource;
use crate::net::payload::{
    AddressedPayload, DirectMessagePayload, QuestionPayload, ResponseOut, ResponsePayload,
    TimePayload,
};
use crate::net::{Envelope, Network, Topic};
use crate::terminal::Terminal;
use crate::ui::dialog::choose_option;
use crate::ui::{show_lines, show_long_text, show_message, Display};

/// A decoded envelope the device acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Time(TimePayload),
    GetConfig(AddressedPayload),
    Question(QuestionPayload),
    Response(ResponsePayload),
    Msg(DirectMessagePayload),
    Test,
}

/// Deserialize with JSON string escapes resolved. No single string field
/// unescapes to more than [`TEXT_LEN`] bytes.
fn parse<'a, T: Deserialize<'a>>(payload: &'a [u8]) -> Result<T, RouteError> {
    let mut unescaped = [0u8; TEXT_LEN];
    serde_json_core::from_slice_escaped(payload, &mut unescaped)
        .map(|(value, _)| value)
        .map_err(|_| RouteError::Malformed)
}

/// Decode `payload` according to `topic`.
pub fn decode(topic: &str, payload: &[u8]) -> Result<Inbound, RouteError> {
    match Topic::from_name(topic) {
        Some(Topic::Time) => parse(payload).map(Inbound::Time),
        Some(Topic::GetConfig) => parse(payload).map(Inbound::GetConfig),
        Some(Topic::Question) => parse(payload).map(Inbound::Question),
        Some(Topic::Response) => parse(payload).map(Inbound::Response),
        Some(Topic::Msg) => parse(payload).map(Inbound::Msg),
        Some(Topic::Test) => Ok(Inbound::Test),
        Some(Topic::LightMsg | Topic::YouThere | Topic::Here | Topic::Squeeze) | None => {
            Err(RouteError::Unhandled)
        }
    }
}

fn addressed(identity: &Identity, client_id: &str) -> Result<(), RouteError> {
    if identity.is_addressed_to_me(client_id) {
        Ok(())
    } else {
        Err(RouteError::NotAddressed)
    }
}

impl<D: Display, I: InputSource, N: Network> Terminal<'_, D, I, N> {
    /// Apply one inbound envelope. Never fails; rejected envelopes are
    /// logged.
    pub fn route(&mut self, envelope: &Envelope) {
        let topic = envelope.topic();
        match decode(topic, envelope.payload()).and_then(|inbound| self.dispatch(inbound)) {
            Ok(()) => debug!("router: handled {}", topic),
            Err(RouteError::Unhandled) => info!("router: no action for topic {}", topic),
            Err(e) => warn!("router: dropping {}: {}", topic, e),
        }
    }

    fn dispatch(&mut self, inbound: Inbound) -> Result<(), RouteError> {
        let identity = self.ctx.identity;
        match inbound {
            Inbound::Time(time) => {
                let applied = u8::try_from(time.hz_multi)
                    .ok()
                    .and_then(|hz| self.ctx.heartbeat.reconfigure(hz).ok());
                if applied.is_none() {
                    debug!("router: ignoring hzMulti {}", time.hz_multi);
                }
            }
            Inbound::GetConfig(request) => {
                addressed(identity, &request.client_id)?;
                if let Err(e) = self.publish_config() {
                    self.publish_failed(e);
                }
            }
            Inbound::Question(question) => self.answer(question)?,
            Inbound::Response(response) => {
                addressed(identity, &response.client_id)?;
                self.inbox
                    .push(Message::new(response.user_from, response.response.clone()));
                let mut line: String<{ TEXT_LEN * 2 + 6 }> = String::new();
                let _ = write!(line, "Q:{} R:{}", response.question, response.response);
                show_long_text(&mut self.display, &line);
            }
            Inbound::Msg(message) => {
                addressed(identity, &message.client_id)?;
                show_message(&mut self.display, &message.user_from, &message.message);
                self.inbox
                    .push(Message::new(message.user_from, message.message));
            }
            Inbound::Test => info!("router: test received"),
        }
        Ok(())
    }

    /// Ask the user a remote question and publish their answer.
    fn answer(&mut self, question: QuestionPayload) -> Result<(), RouteError> {
        let identity = self.ctx.identity;
        addressed(identity, &question.client_id)?;
        if identity.is_self(&question.user_from) {
            return Err(RouteError::OwnMessage);
        }
        if question.options.is_empty() {
            return Err(RouteError::EmptyOptions);
        }

        // Held only while the user answers; a full queue keeps its contents.
        let queued = self
            .inbox
            .try_push(Message::new(
                question.user_from.clone(),
                question.question.clone(),
            ))
            .is_ok();
        if !queued {
            debug!("router: inbox full, not queueing question");
        }
        let choice = choose_option(
            &mut self.display,
            &mut self.input,
            &question.question,
            question.options.as_slice(),
        );
        let Some(choice) = choice else {
            if queued {
                self.inbox.take_newest();
            }
            return Err(RouteError::EmptyOptions);
        };

        let sent = self.gatekeeper.publish_json(
            "response",
            &ResponseOut {
                client_id: question.user_from.as_str(),
                user_from: identity.display_name(),
                question: question.question.as_str(),
                response: choice,
            },
        );
        if queued {
            self.inbox.take_newest();
        }
        match sent {
            Ok(()) => show_lines(&mut self.display, &["Response Sent!"]),
            Err(e) => self.publish_failed(e),
        }
        Ok(())
    }
}
