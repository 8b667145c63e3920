//! Inbound hardware events
//!
//! An input handler reports back to the skill with named events. Each event
//! carries the raw button actions that satisfied it, and the whole report
//! names the request that started the input handler so stale reports can be
//! told apart from current ones.

use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::device::{DeviceId, Role};

/// Identifier of a platform request
///
/// The request that starts an input handler also identifies that input
/// handler: every event it reports carries the same id back.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct RequestId(String);

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Position of a device in the roll call check-in sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ordinal {
    /// First device to check in
    First,
    /// Second device to check in
    Second,
    /// Third device to check in
    Third,
    /// Fourth device to check in
    Fourth,
}

impl Ordinal {
    /// Every ordinal in check-in order
    pub const ALL: [Ordinal; 4] = [
        Ordinal::First,
        Ordinal::Second,
        Ordinal::Third,
        Ordinal::Fourth,
    ];

    /// The role assigned by this check-in
    pub fn role(self) -> Role {
        match self {
            Ordinal::First => Role::FIRST,
            Ordinal::Second => Role::SECOND,
            Ordinal::Third => Role::THIRD,
            Ordinal::Fourth => Role::FOURTH,
        }
    }

    /// Word used in proxy, recognizer and event names
    ///
    /// The hardware contract spells the fourth ordinal "forth".
    fn word(self) -> &'static str {
        match self {
            Ordinal::First => "first",
            Ordinal::Second => "second",
            Ordinal::Third => "third",
            Ordinal::Fourth => "forth",
        }
    }

    /// Proxy name standing in for the not yet known device
    pub fn proxy(self) -> String {
        format!("{}_button", self.word())
    }

    /// Name of the recognizer matching this check-in
    pub fn recognizer(self) -> String {
        format!("roll_call_{}_button_recognizer", self.word())
    }

    /// Name of the event reported when this device checks in
    pub fn event_name(self) -> String {
        format!("{}_button_checked_in", self.word())
    }
}

/// Name of an event reported by an input handler
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
    /// A roll call recognizer matched
    CheckedIn(Ordinal),
    /// A button went down during a round
    ButtonDown,
    /// The input handler ran out of time
    Timeout,
    /// Anything this game never declares
    Unknown(String),
}

impl EventName {
    /// Name of the round's button-down event
    pub const BUTTON_DOWN: &'static str = "button_down_event";
    /// Name of the built-in timeout event
    pub const TIMEOUT: &'static str = "timeout";
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        match name.as_str() {
            EventName::BUTTON_DOWN => EventName::ButtonDown,
            EventName::TIMEOUT => EventName::Timeout,
            "fourth_button_checked_in" => EventName::CheckedIn(Ordinal::Fourth),
            other => Ordinal::ALL
                .into_iter()
                .find(|ordinal| ordinal.event_name() == other)
                .map_or(EventName::Unknown(name), EventName::CheckedIn),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName::from(name.to_owned())
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        name.to_string()
    }
}

impl Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventName::CheckedIn(ordinal) => f.write_str(&ordinal.event_name()),
            EventName::ButtonDown => f.write_str(EventName::BUTTON_DOWN),
            EventName::Timeout => f.write_str(EventName::TIMEOUT),
            EventName::Unknown(name) => f.write_str(name),
        }
    }
}

/// Physical button action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    /// The button was pressed
    Down,
    /// The button was released
    Up,
}

/// One raw button action observed by the input handler
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputEvent {
    /// Device that produced the action
    pub gadget_id: DeviceId,
    /// What the button did
    pub action: ButtonAction,
    /// Platform timestamp of the action
    pub timestamp: Option<String>,
}

impl InputEvent {
    /// A button-down action on `gadget_id`
    pub fn down(gadget_id: impl Into<DeviceId>) -> Self {
        Self {
            gadget_id: gadget_id.into(),
            action: ButtonAction::Down,
            timestamp: None,
        }
    }
}

/// A named event together with the actions that satisfied it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    /// Which declared event fired
    pub name: EventName,
    /// Actions reported with the event, oldest first
    #[serde(default)]
    pub input_events: Vec<InputEvent>,
}

impl GameEvent {
    /// Creates an event reporting `input_events`
    pub fn new(name: impl Into<EventName>, input_events: Vec<InputEvent>) -> Self {
        Self {
            name: name.into(),
            input_events,
        }
    }

    /// Devices that pressed down, oldest first, without repeats
    pub fn pressed_devices(&self) -> Vec<&DeviceId> {
        self.input_events
            .iter()
            .filter(|event| event.action == ButtonAction::Down)
            .map(|event| &event.gadget_id)
            .unique()
            .collect_vec()
    }
}

/// A report from a running input handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputHandlerEvent {
    /// The request that started the reporting input handler
    pub originating_request_id: RequestId,
    /// Events fired since the previous report
    pub events: Vec<GameEvent>,
}
