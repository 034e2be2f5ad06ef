//! JSON bodies exchanged over MQTT.
//!
//! Inbound bodies own their text in fixed-capacity strings, so an
//! over-long field fails deserialization like any other malformed field.
//! Outbound bodies borrow.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::config::MAX_OPTIONS;
use crate::text::{Name, Text};

/// `time`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TimePayload {
    #[serde(rename = "hzMulti")]
    pub hz_multi: i64,
}

/// `getConfig`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AddressedPayload {
    pub client_id: Name,
}

/// `question`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct QuestionPayload {
    pub client_id: Name,
    pub user_from: Name,
    pub question: Text,
    pub options: Vec<Name, MAX_OPTIONS>,
}

/// `response`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ResponsePayload {
    pub client_id: Name,
    pub user_from: Name,
    pub question: Text,
    pub response: Text,
}

/// `msg`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DirectMessagePayload {
    pub client_id: Name,
    pub user_from: Name,
    pub message: Text,
}

/// Outbound `response`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseOut<'a> {
    pub client_id: &'a str,
    pub user_from: &'a str,
    pub question: &'a str,
    pub response: &'a str,
}

/// Outbound `msg`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DirectMessageOut<'a> {
    pub client_id: &'a str,
    pub user_from: &'a str,
    pub message: &'a str,
}
