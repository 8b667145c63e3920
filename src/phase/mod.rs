//! Game phases
//!
//! A game runs through two phases. Roll call discovers the devices taking
//! part and gives each a stable role; rounds then deal colors and score
//! presses until the players quit. Each phase exposes one handler per
//! event its input handler can report. Handlers never fail: whatever
//! arrives, they return a complete [`crate::context::Context`].

pub mod roll_call;
pub mod round;

use crate::{
    animation::{Animation, reset_scheme},
    device::DeviceId,
    directive::Directive,
};

/// Spoken form of a small device count
fn count_word(count: usize) -> String {
    match count {
        1 => "one".to_owned(),
        2 => "two".to_owned(),
        3 => "three".to_owned(),
        4 => "four".to_owned(),
        n => n.to_string(),
    }
}

/// Idle animation `idle` plus default button animations on `targets`
///
/// An empty `targets` addresses every connected device, so the hardware is
/// left in a known state even when no device was enrolled.
fn reset_lights(targets: &[DeviceId], idle: Animation) -> Vec<Directive> {
    Directive::set_scheme(targets, &reset_scheme(idle))
}
