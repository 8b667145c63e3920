//! Hardware directives
//!
//! Handlers never talk to the hardware directly. They append [`Directive`]
//! values to the response, in execution order, and the transport serializes
//! them into whatever schema the hardware channel expects. Two commands
//! exist: start an input handler, and set a light animation.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    animation::{Animation, LightScheme, Trigger},
    device::DeviceId,
    event::ButtonAction,
};

/// Name of the built-in recognizer satisfied when an input handler expires
pub const TIMED_OUT_RECOGNIZER: &str = "timed out";

/// Where a recognizer pattern must sit within the observed actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Pattern must match the latest actions
    End,
}

/// One step of a recognizer pattern
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternStep {
    /// Devices or proxies the step accepts; any device when absent
    pub gadget_ids: Option<Vec<String>>,
    /// Action the step accepts; any action when absent
    pub action: Option<ButtonAction>,
}

impl PatternStep {
    /// A button-down by any device
    pub fn any_down() -> Self {
        Self {
            gadget_ids: None,
            action: Some(ButtonAction::Down),
        }
    }

    /// A button-down by the device behind `proxy`
    pub fn down_by(proxy: impl Into<String>) -> Self {
        Self {
            gadget_ids: Some(vec![proxy.into()]),
            action: Some(ButtonAction::Down),
        }
    }
}

/// A pattern matcher over the stream of button actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recognizer {
    /// Recognizer type; patterns are always plain matches here
    #[serde(rename = "type")]
    kind: RecognizerKind,
    /// Whether unrelated actions may interleave with the pattern
    pub fuzzy: bool,
    /// Where the pattern must sit
    pub anchor: Anchor,
    /// Steps that must be observed in order
    pub pattern: Vec<PatternStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RecognizerKind {
    Match,
}

impl Recognizer {
    /// A match recognizer anchored at the latest action
    pub fn matching(fuzzy: bool, pattern: Vec<PatternStep>) -> Self {
        Self {
            kind: RecognizerKind::Match,
            fuzzy,
            anchor: Anchor::End,
            pattern,
        }
    }
}

/// What an event reports back when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reports {
    /// Only the actions that satisfied the recognizers
    Matches,
    /// Every action since the input handler started
    History,
}

/// A named event fired when all of its recognizers are satisfied
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSpec {
    /// Recognizers that must all be satisfied
    pub meets: Vec<String>,
    /// What the event carries back
    pub reports: Reports,
    /// Whether firing this event closes the input handler
    pub should_end_input_handler: bool,
    /// How often the event may fire; unlimited when absent
    pub maximum_invocations: Option<u32>,
}

impl EventSpec {
    /// Event fired when the input handler expires
    pub fn timed_out() -> Self {
        Self {
            meets: vec![TIMED_OUT_RECOGNIZER.to_owned()],
            reports: Reports::History,
            should_end_input_handler: true,
            maximum_invocations: None,
        }
    }
}

/// A timed input collection window
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHandler {
    /// How long the window stays open
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    /// Placeholder names for devices not known in advance
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<String>,
    /// Named recognizers
    pub recognizers: BTreeMap<String, Recognizer>,
    /// Named events reported back to the skill
    pub events: BTreeMap<String, EventSpec>,
}

impl InputHandler {
    /// An empty window lasting `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            proxies: Vec::new(),
            recognizers: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }

    /// Declares a proxy
    #[must_use]
    pub fn proxy(mut self, name: impl Into<String>) -> Self {
        self.proxies.push(name.into());
        self
    }

    /// Declares a recognizer
    #[must_use]
    pub fn recognizer(mut self, name: impl Into<String>, recognizer: Recognizer) -> Self {
        self.recognizers.insert(name.into(), recognizer);
        self
    }

    /// Declares an event
    #[must_use]
    pub fn event(mut self, name: impl Into<String>, event: EventSpec) -> Self {
        self.events.insert(name.into(), event);
        self
    }
}

/// A light animation bound to devices and a trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLight {
    /// Devices to animate; every connected device when empty
    pub target_gadgets: Vec<DeviceId>,
    /// When the animation plays
    pub trigger: Trigger,
    /// What plays
    pub animation: Animation,
}

/// A command for the hardware channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    /// Opens an input collection window, superseding any open one
    #[serde(rename = "GameEngine.StartInputHandler")]
    StartInputHandler(InputHandler),
    /// Sets a light animation
    #[serde(rename = "GadgetController.SetLight")]
    SetLight(SetLight),
}

impl Directive {
    /// Sets `animation` for `trigger` on `targets` (all devices when empty)
    pub fn set_light(targets: &[DeviceId], trigger: Trigger, animation: Animation) -> Self {
        Directive::SetLight(SetLight {
            target_gadgets: targets.to_vec(),
            trigger,
            animation,
        })
    }

    /// One directive per trigger of `scheme`: idle, then button down, then
    /// button up
    pub fn set_scheme(targets: &[DeviceId], scheme: &LightScheme) -> Vec<Self> {
        scheme
            .iter()
            .map(|(trigger, animation)| Directive::set_light(targets, trigger, *animation))
            .collect()
    }

    /// The window opened by this directive, if it opens one
    pub fn input_handler(&self) -> Option<&InputHandler> {
        match self {
            Directive::StartInputHandler(handler) => Some(handler),
            Directive::SetLight(_) => None,
        }
    }

    /// The light set by this directive, if it sets one
    pub fn light(&self) -> Option<&SetLight> {
        match self {
            Directive::SetLight(light) => Some(light),
            Directive::StartInputHandler(_) => None,
        }
    }
}
