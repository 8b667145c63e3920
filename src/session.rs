//! Session state
//!
//! A [`Session`] lives exactly as long as one conversation with the skill.
//! It is the only channel through which roll call hands devices over to the
//! play rounds. Handlers receive it by mutable reference, one request at a
//! time, and grouped fields are only changed through the methods here.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::{
    device::{DeviceId, EnrollError, Role, Roster},
    event::RequestId,
    leaderboard::Leaderboard,
    scoreboard::Scoreboard,
};

/// Phase of the conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Devices are checking in
    #[default]
    RollCall,
    /// Rounds are being played
    Play,
    /// A round finished and the skill asked whether to quit
    Exit,
}

/// Outcome of a successful check-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enrollment {
    /// Role given to the device
    pub role: Role,
    /// Whether this check-in completed roll call
    pub complete: bool,
}

/// Everything the skill remembers during one conversation
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Current phase
    pub mode: Mode,
    /// Devices enrolled by roll call
    roster: Roster,
    /// Whether roll call enrolled every required device
    roll_call_complete: bool,
    /// Request that started the input handler events are accepted from
    pending_input_handler: Option<RequestId>,
    /// Colors and scores of the round being played
    pub scoreboard: Option<Scoreboard>,
    /// Whether a yes/no answer is awaited
    pub expecting_end_confirmation: bool,
    /// Totals over the finished rounds
    pub leaderboard: Leaderboard,
}

impl Session {
    /// Devices enrolled by roll call
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Number of devices enrolled so far
    pub fn registered_count(&self) -> usize {
        self.roster.len()
    }

    /// Whether roll call enrolled every required device
    pub fn roll_call_complete(&self) -> bool {
        self.roll_call_complete
    }

    /// Forgets every enrolled device and restarts enrollment
    pub fn reset_roll_call(&mut self) {
        self.roster.clear();
        self.roll_call_complete = false;
        self.expecting_end_confirmation = false;
    }

    /// Enrolls `device` as `role`
    ///
    /// Roll call completes once `required` devices are enrolled; it can
    /// complete only once per reset.
    ///
    /// # Errors
    ///
    /// Propagates [`EnrollError`] from the roster, leaving the session as it
    /// was.
    pub fn enroll(
        &mut self,
        role: Role,
        device: DeviceId,
        required: usize,
    ) -> Result<Enrollment, EnrollError> {
        let role = self.roster.enroll(role, device)?;
        let complete = !self.roll_call_complete && self.roster.len() >= required;
        if complete {
            self.roll_call_complete = true;
        }
        Ok(Enrollment { role, complete })
    }

    /// Adds the scores of the current round to the leaderboard
    pub fn tally_round(&mut self) {
        if let Some(scoreboard) = &self.scoreboard {
            self.leaderboard.add_round(&self.roster, scoreboard);
        }
    }

    /// Records that the input handler started by `request_id` is the one
    /// events are accepted from
    pub fn open_window(&mut self, request_id: RequestId) {
        self.pending_input_handler = Some(request_id);
    }

    /// Stops accepting events from any input handler
    pub fn close_window(&mut self) {
        self.pending_input_handler = None;
    }

    /// The request whose input handler events are accepted from
    pub fn pending_input_handler(&self) -> Option<&RequestId> {
        self.pending_input_handler.as_ref()
    }

    /// Whether an event from the input handler started by `request_id`
    /// belongs to the current window
    pub fn is_current_window(&self, request_id: &RequestId) -> bool {
        self.pending_input_handler.as_ref() == Some(request_id)
    }
}
