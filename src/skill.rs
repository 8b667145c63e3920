//! Request dispatch
//!
//! [`Skill`] is the single entry point of the crate. The transport hands it
//! one typed [`Request`] at a time; the skill checks that hardware reports
//! belong to the input handler it is waiting on, routes each report to the
//! handler for the current phase and answers the yes/no questions that end
//! each phase.

use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    constants::speech,
    context::Context,
    event::{EventName, GameEvent, InputHandlerEvent, RequestId},
    persistence::{ScoreRecord, ScoreStore, UserId},
    phase::{roll_call, round},
    session::{Mode, Session},
};

/// Requests the transport delivers to the skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
pub enum Request {
    /// The players opened the skill
    Launch {
        /// Identifier of the launch request
        request_id: RequestId,
    },
    /// A running input handler reported events
    #[from]
    InputHandlerEvent(InputHandlerEvent),
    /// The players asked to start a round
    StartRound {
        /// Identifier of the request, which also identifies the round's
        /// input handler
        request_id: RequestId,
    },
    /// The players answered a yes/no question
    Confirm {
        /// Identifier of the request, which identifies any input handler
        /// started in response
        request_id: RequestId,
        /// Whether the answer was yes
        yes: bool,
    },
    /// The platform closed the conversation
    SessionEnded,
}

/// One conversation with the skill
#[derive(Debug, Clone)]
pub struct Skill {
    config: Config,
    user: UserId,
    session: Session,
    rng: fastrand::Rng,
}

impl Skill {
    /// Creates a skill for `user` with a fresh session
    ///
    /// # Errors
    ///
    /// Returns the validation report if `config` is out of bounds.
    pub fn new(config: Config, user: UserId) -> Result<Self, garde::Report> {
        config.validate()?;
        Ok(Self {
            config,
            user,
            session: Session::default(),
            rng: fastrand::Rng::new(),
        })
    }

    /// Replaces the color shuffle's random source
    #[must_use]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// Continues the conversation held in `session`
    #[must_use]
    pub fn resume(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// The conversation state, to be stored by the transport between
    /// requests
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handles one request and returns the response to send
    ///
    /// Input handler reports are only processed while they come from the
    /// input handler the session is waiting on; anything older is dropped
    /// with an empty response. Every other request is answered according
    /// to the current [`Mode`].
    ///
    /// # Arguments
    ///
    /// * `request` - The request delivered by the transport
    /// * `store` - Backend for the scores kept between sessions
    ///
    /// # Returns
    ///
    /// The speech, directives and session flags to send back. Handling never
    /// fails: `store` is only touched when the skill launches and when the
    /// players quit after a round, and its failures are logged without
    /// reaching the players.
    ///
    /// # Type Parameters
    ///
    /// * `S` - Type implementing the ScoreStore trait
    pub fn receive<S: ScoreStore>(&mut self, request: Request, store: &mut S) -> Context {
        match request {
            Request::Launch { request_id } => self.launch(request_id, store),
            Request::InputHandlerEvent(report) => self.receive_report(&report),
            Request::StartRound { request_id } => match self.session.mode {
                Mode::Play => round::start(
                    &mut self.session,
                    &self.config,
                    request_id,
                    &mut self.rng,
                ),
                Mode::Exit => self.keep_playing(request_id),
                Mode::RollCall => {
                    let mut ctx = Context::default();
                    ctx.say("Let's finish checking in the buttons first.");
                    if self.session.expecting_end_confirmation {
                        ctx.say("Would you like more time to press the buttons?");
                        ctx.reprompt("Say yes to go back and add buttons, or no to exit now.");
                        ctx.open_microphone = true;
                    }
                    ctx
                }
            },
            Request::Confirm { .. } if !self.session.expecting_end_confirmation => {
                debug!(mode = ?self.session.mode, "confirmation without a pending question");
                let mut ctx = Context::default();
                ctx.say("Sorry, I didn't get that.");
                ctx.open_microphone = self.session.pending_input_handler().is_none();
                ctx
            }
            Request::Confirm { request_id, yes } => match (self.session.mode, yes) {
                (Mode::RollCall, true) => {
                    let mut ctx = Context::default();
                    ctx.say("Ok. Press the buttons you want to play with.");
                    ctx.say(speech::WAITING_AUDIO);
                    ctx.merge(roll_call::start(&mut self.session, &self.config, request_id));
                    ctx
                }
                (Mode::Exit, true) => self.quit(store),
                (Mode::Exit, false) => self.keep_playing(request_id),
                (_, false) => Self::goodbye(),
                (Mode::Play, true) => {
                    let mut ctx = Context::default();
                    ctx.say("Sorry, I didn't get that.");
                    ctx.open_microphone = true;
                    ctx
                }
            },
            Request::SessionEnded => {
                info!(rounds = self.session.leaderboard.rounds(), "session ended");
                self.session = Session::default();
                Context {
                    end_session: true,
                    ..Context::default()
                }
            }
        }
    }

    fn launch<S: ScoreStore>(&mut self, request_id: RequestId, store: &S) -> Context {
        info!(user = %self.user, "launch");
        self.session = Session::default();

        let mut ctx = Context::default();
        ctx.say(format!("Welcome to {}.", speech::SKILL_NAME));
        match store.load(&self.user) {
            Ok(Some(record)) => {
                if let Some(winner) = record.winner() {
                    ctx.say(format!(
                        "Last time, button {} won with {} points.",
                        winner.role, winner.score
                    ));
                }
            }
            Ok(None) => {}
            Err(e) => warn!(user = %self.user, error = %e, "could not load previous scores"),
        }
        ctx.say("Press the buttons you want to play with.");
        ctx.say(speech::WAITING_AUDIO);
        ctx.merge(roll_call::start(&mut self.session, &self.config, request_id));
        ctx
    }

    /// Routes every event of `report` while its input handler is current
    fn receive_report(&mut self, report: &InputHandlerEvent) -> Context {
        let mut ctx = Context::default();

        for event in &report.events {
            if !self.session.is_current_window(&report.originating_request_id) {
                info!(
                    origin = %report.originating_request_id,
                    current = ?self.session.pending_input_handler(),
                    event = %event.name,
                    "dropping event from stale input handler"
                );
                break;
            }
            ctx.merge(self.receive_event(event));
        }

        ctx
    }

    fn receive_event(&mut self, event: &GameEvent) -> Context {
        match (self.session.mode, &event.name) {
            (Mode::RollCall, EventName::CheckedIn(ordinal)) => {
                roll_call::check_in(&mut self.session, &self.config, *ordinal, event)
            }
            (Mode::RollCall, EventName::Timeout) => {
                roll_call::timeout(&mut self.session, &self.config)
            }
            (Mode::Play, EventName::ButtonDown) => {
                round::button_pressed(&mut self.session, &self.config, event)
            }
            (Mode::Play, EventName::Timeout) => round::timeout(&mut self.session),
            (mode, name) => {
                warn!(?mode, %name, "event not handled in this mode");
                Context::default()
            }
        }
    }

    /// Starts another round after the players declined to quit
    fn keep_playing(&mut self, request_id: RequestId) -> Context {
        self.session.mode = Mode::Play;
        round::start(&mut self.session, &self.config, request_id, &mut self.rng)
    }

    /// Saves the game's totals and ends the conversation
    fn quit<S: ScoreStore>(&mut self, store: &mut S) -> Context {
        let record = ScoreRecord::from_session(&self.session);
        info!(user = %self.user, rounds = record.rounds, "saving scores");
        if let Err(e) = store.save(&self.user, record) {
            warn!(user = %self.user, error = %e, "could not save scores");
        }
        self.session.expecting_end_confirmation = false;

        let mut ctx = Self::goodbye();
        ctx.output_speech.insert(0, "Thanks for playing!".to_owned());
        ctx
    }

    fn goodbye() -> Context {
        let mut ctx = Context::default();
        ctx.say("Goodbye.");
        ctx.end_session = true;
        ctx
    }
}
