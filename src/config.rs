//! Game configuration
//!
//! A deployment tunes the game through [`Config`]: how many devices roll
//! call waits for, how long each input handler stays open, and how presses
//! beyond the number of devices are scored. Configurations arrive as JSON
//! (durations in milliseconds) and are checked with `garde` before use.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{constants, scoreboard::ScoringPolicy};

type ValidationResult = garde::Result;

/// Validates that a duration falls within the given millisecond bounds
fn validate_duration<const MIN_MS: u64, const MAX_MS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    if (u128::from(MIN_MS)..=u128::from(MAX_MS)).contains(&val.as_millis()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_MS}ms,{MAX_MS}ms]",
        )))
    }
}

fn validate_roll_call_timeout(val: &Duration) -> ValidationResult {
    validate_duration::<
        { constants::roll_call::MIN_TIMEOUT_MS },
        { constants::roll_call::MAX_TIMEOUT_MS },
    >("roll_call_timeout", val)
}

fn validate_round_timeout(val: &Duration) -> ValidationResult {
    validate_duration::<{ constants::round::MIN_TIMEOUT_MS }, { constants::round::MAX_TIMEOUT_MS }>(
        "round_timeout",
        val,
    )
}

/// Tunable parameters of a game session
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Number of devices roll call enrolls before play can begin
    #[garde(range(min = constants::roll_call::MIN_DEVICES, max = constants::roll_call::MAX_DEVICES))]
    pub required_devices: usize,
    /// How long the roll call input handler waits for check-ins
    #[garde(custom(|v, _| validate_roll_call_timeout(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub roll_call_timeout: Duration,
    /// How long each play round collects button presses
    #[garde(custom(|v, _| validate_round_timeout(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub round_timeout: Duration,
    /// How awards are floored once presses outnumber devices
    #[garde(skip)]
    pub scoring: ScoringPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_devices: constants::roll_call::DEFAULT_REQUIRED_DEVICES,
            roll_call_timeout: Duration::from_millis(constants::roll_call::DEFAULT_TIMEOUT_MS),
            round_timeout: Duration::from_millis(constants::round::DEFAULT_TIMEOUT_MS),
            scoring: ScoringPolicy::default(),
        }
    }
}
