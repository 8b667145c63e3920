//! Light animation descriptors
//!
//! The hardware-specific animation payload is produced outside this crate.
//! What the game decides is only *which* animation each device should play:
//! a kind, a number of cycles, a color and a duration. This module holds
//! those descriptors together with the fixed animations used by roll call
//! and by play rounds.

use std::{fmt::Display, time::Duration};

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};

/// Colors a device light can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Player color
    Blue,
    /// Player color
    Red,
    /// Player color
    Green,
    /// Player color
    Yellow,
    /// Neutral highlight
    White,
    /// Light off
    Black,
}

impl Color {
    /// Colors handed out to players at the start of each round
    pub const PLAYER_COLORS: [Color; 4] = [Color::Blue, Color::Red, Color::Green, Color::Yellow];

    /// Lowercase name of the color, as spoken and as understood by the
    /// animation generator
    pub fn name(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of an animation over its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    /// Constant color for the whole duration
    Solid,
    /// Ramp from off up to the color
    FadeIn,
    /// Ramp from the color down to off
    FadeOut,
    /// Transition from the current color to the target color
    Fade,
    /// Repeated slow fade in and out
    Breathe,
}

/// A single animation as handed to the animation generator
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// Shape of the animation
    pub kind: AnimationKind,
    /// How many times the animation repeats
    pub cycles: u32,
    /// Color shown by the animation
    pub color: Color,
    /// Length of one cycle
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    #[serde(rename = "duration_ms")]
    pub duration: Duration,
}

impl Animation {
    const fn new(kind: AnimationKind, cycles: u32, color: Color, duration_ms: u64) -> Self {
        Self {
            kind,
            cycles,
            color,
            duration: Duration::from_millis(duration_ms),
        }
    }

    /// Constant color
    pub const fn solid(cycles: u32, color: Color, duration_ms: u64) -> Self {
        Self::new(AnimationKind::Solid, cycles, color, duration_ms)
    }

    /// Ramp up to a color
    pub const fn fade_in(cycles: u32, color: Color, duration_ms: u64) -> Self {
        Self::new(AnimationKind::FadeIn, cycles, color, duration_ms)
    }

    /// Ramp down from a color
    pub const fn fade_out(cycles: u32, color: Color, duration_ms: u64) -> Self {
        Self::new(AnimationKind::FadeOut, cycles, color, duration_ms)
    }

    /// One transition to a color
    pub const fn fade(color: Color, duration_ms: u64) -> Self {
        Self::new(AnimationKind::Fade, 1, color, duration_ms)
    }

    /// Breathing pulse in a color
    pub const fn breathe(cycles: u32, color: Color, duration_ms: u64) -> Self {
        Self::new(AnimationKind::Breathe, cycles, color, duration_ms)
    }
}

/// The moment at which a device plays an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Trigger {
    /// Played while the button is untouched
    #[serde(rename = "none")]
    Idle,
    /// Played when the button goes down
    #[serde(rename = "buttonDown")]
    ButtonDown,
    /// Played when the button comes back up
    #[serde(rename = "buttonUp")]
    ButtonUp,
}

/// One animation per trigger
pub type LightScheme = EnumMap<Trigger, Animation>;

/// Button animations the hardware falls back to outside the game
pub const DEFAULT_BUTTON_DOWN: Animation = Animation::solid(1, Color::Blue, 300);
/// See [`DEFAULT_BUTTON_DOWN`]
pub const DEFAULT_BUTTON_UP: Animation = Animation::solid(1, Color::Black, 100);

/// Animations played while devices check in
pub mod roll_call {
    use super::{Animation, Color};

    /// Idle light of a device that has just checked in
    pub const CHECK_IN_IDLE: Animation = Animation::solid(1, Color::Green, 8000);
    /// Flash on press during roll call
    pub const CHECK_IN_DOWN: Animation = Animation::solid(1, Color::Green, 1000);
    /// Light on release during roll call
    pub const CHECK_IN_UP: Animation = Animation::solid(1, Color::White, 4000);
    /// Idle light once every required device checked in
    pub const COMPLETE: Animation = Animation::fade_in(1, Color::Green, 5000);
    /// Idle light when roll call runs out of time
    pub const TIMEOUT: Animation = Animation::fade(Color::Black, 1000);
}

/// Animations played during a round
pub mod round {
    use super::{Animation, Color, LightScheme, Trigger};
    use enum_map::enum_map;

    /// Idle light once a round is over
    pub const FINISHED: Animation = Animation::fade_out(1, Color::White, 2000);

    /// The lights a player's device shows for the whole round
    pub fn player_scheme(color: Color) -> LightScheme {
        enum_map! {
            Trigger::Idle => Animation::breathe(30, color, 450),
            Trigger::ButtonDown => Animation::solid(1, color, 2000),
            Trigger::ButtonUp => Animation::solid(1, color, 200),
        }
    }
}

/// Button down and up animations reset to the hardware defaults, with the
/// given idle animation
pub fn reset_scheme(idle: Animation) -> LightScheme {
    enum_map! {
        Trigger::Idle => idle,
        Trigger::ButtonDown => DEFAULT_BUTTON_DOWN,
        Trigger::ButtonUp => DEFAULT_BUTTON_UP,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_player_colors_are_distinct() {
        let colors = Color::PLAYER_COLORS;
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_player_scheme_uses_color_for_every_trigger() {
        let scheme = round::player_scheme(Color::Yellow);
        for (_, animation) in &scheme {
            assert_eq!(animation.color, Color::Yellow);
        }
        assert_eq!(scheme[Trigger::Idle].kind, AnimationKind::Breathe);
        assert_eq!(scheme[Trigger::ButtonDown].duration, Duration::from_millis(2000));
    }

    #[test]
    fn test_reset_scheme_restores_defaults() {
        let scheme = reset_scheme(roll_call::TIMEOUT);
        assert_eq!(scheme[Trigger::Idle], roll_call::TIMEOUT);
        assert_eq!(scheme[Trigger::ButtonDown], DEFAULT_BUTTON_DOWN);
        assert_eq!(scheme[Trigger::ButtonUp], DEFAULT_BUTTON_UP);
    }

    #[test]
    fn test_animation_serialization() {
        let json = serde_json::to_value(Animation::breathe(30, Color::Red, 450)).unwrap();
        assert_eq!(json["kind"], "breathe");
        assert_eq!(json["color"], "red");
        assert_eq!(json["cycles"], 30);
        assert_eq!(json["duration_ms"], 450);
    }

    #[test]
    fn test_trigger_serialization() {
        assert_eq!(serde_json::to_string(&Trigger::Idle).unwrap(), "\"none\"");
        assert_eq!(
            serde_json::to_string(&Trigger::ButtonDown).unwrap(),
            "\"buttonDown\""
        );
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::Green.to_string(), "green");
    }
}
