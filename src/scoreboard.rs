//! Per-round color assignment and scoring
//!
//! At the start of every round each device in play is dealt a distinct
//! color, and every accepted press is awarded points according to how many
//! presses were already scored that round: the first press earns the most.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{animation::Color, device::DeviceId};

/// How an award is floored once presses outnumber devices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringPolicy {
    /// Late presses keep losing points and may go negative
    #[default]
    AllowNegative,
    /// Late presses never score below zero
    ClampAtZero,
}

impl ScoringPolicy {
    /// Points for a press in a round with `slots` devices after
    /// `already_scored` presses were scored
    pub fn award(self, slots: usize, already_scored: usize) -> i64 {
        let award = slots as i64 - already_scored as i64;
        match self {
            ScoringPolicy::AllowNegative => award,
            ScoringPolicy::ClampAtZero => award.max(0),
        }
    }
}

/// A device's standing in the current round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// The device in play
    pub device: DeviceId,
    /// Color dealt to the device this round
    pub color: Color,
    /// Points accumulated this round
    pub score: i64,
}

/// Colors and scores of the devices in the current round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// One entry per device, in role order
    entries: Vec<ScoreEntry>,
    /// Presses scored so far this round
    presses_scored: usize,
}

impl Scoreboard {
    /// Deals each of `devices` a distinct color from a fresh random
    /// permutation of the player colors
    ///
    /// At most as many devices as there are player colors take part; any
    /// devices beyond that are left out.
    pub fn deal(devices: &[DeviceId], rng: &mut fastrand::Rng) -> Self {
        let mut colors = Color::PLAYER_COLORS;
        rng.shuffle(&mut colors);

        Self {
            entries: devices
                .iter()
                .zip(colors)
                .map(|(device, color)| ScoreEntry {
                    device: device.clone(),
                    color,
                    score: 0,
                })
                .collect_vec(),
            presses_scored: 0,
        }
    }

    /// Entries in role order
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Number of devices in the round
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no device is in the round
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Presses scored so far this round
    pub fn presses_scored(&self) -> usize {
        self.presses_scored
    }

    /// Entry of `device`, if it is in the round
    pub fn entry(&self, device: &DeviceId) -> Option<&ScoreEntry> {
        self.entries.iter().find(|entry| &entry.device == device)
    }

    /// Scores a press by `device`
    ///
    /// Returns the points awarded, or `None` without changing anything when
    /// the device is not in the round.
    pub fn record_press(&mut self, device: &DeviceId, policy: ScoringPolicy) -> Option<i64> {
        let award = policy.award(self.entries.len(), self.presses_scored);
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.device == device)?;

        entry.score += award;
        self.presses_scored += 1;

        Some(award)
    }
}
