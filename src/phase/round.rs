//! Timed scoring rounds
//!
//! A round deals every device in play a color, lights it up and opens an
//! input handler that reports each button-down as it happens. The first
//! press of a round earns as many points as there are devices, every later
//! press one point less. When the input handler expires the scores are read
//! out and the players are asked whether to quit.

use heck::ToTitleCase;
use tracing::{debug, info, warn};

use crate::{
    animation::{self, Color, Trigger},
    config::Config,
    constants::{roll_call::MAX_DEVICES, speech},
    context::Context,
    directive::{Directive, EventSpec, InputHandler, PatternStep, Recognizer, Reports},
    event::{EventName, GameEvent, RequestId},
    scoreboard::Scoreboard,
    session::{Mode, Session},
};

use super::reset_lights;

/// Name of the recognizer matching any button-down
const BUTTON_DOWN_RECOGNIZER: &str = "button_down_recognizer";

fn round_input_handler(config: &Config) -> InputHandler {
    InputHandler::new(config.round_timeout)
        .recognizer(
            BUTTON_DOWN_RECOGNIZER,
            Recognizer::matching(false, vec![PatternStep::any_down()]),
        )
        .event(
            EventName::BUTTON_DOWN,
            EventSpec {
                meets: vec![BUTTON_DOWN_RECOGNIZER.to_owned()],
                reports: Reports::Matches,
                should_end_input_handler: false,
                maximum_invocations: None,
            },
        )
        .event(EventName::TIMEOUT, EventSpec::timed_out())
}

/// Light directives for every device of `scoreboard`
///
/// Emitted trigger by trigger: all idle animations first, then all
/// button-down, then all button-up.
fn player_lights(scoreboard: &Scoreboard) -> Vec<Directive> {
    let schemes = scoreboard
        .entries()
        .iter()
        .map(|entry| (entry.device.clone(), animation::round::player_scheme(entry.color)))
        .collect::<Vec<_>>();

    [Trigger::Idle, Trigger::ButtonDown, Trigger::ButtonUp]
        .into_iter()
        .flat_map(|trigger| {
            schemes.iter().map(move |(device, scheme)| {
                Directive::set_light(std::slice::from_ref(device), trigger, scheme[trigger])
            })
        })
        .collect()
}

/// Starts a round with the enrolled devices
///
/// Deals fresh colors from `rng`, replacing any previous round's
/// scoreboard, and opens the round's input handler under `request_id`.
/// At most four devices take part, the most recently enrolled ones.
///
/// # Arguments
///
/// * `session` - The conversation; gets the new scoreboard and window
/// * `config` - Supplies the round timeout
/// * `request_id` - The request starting the round's input handler
/// * `rng` - Random source for the color shuffle
///
/// # Returns
///
/// The input handler directive, one light directive per device and
/// trigger, and the go signal
pub fn start(
    session: &mut Session,
    config: &Config,
    request_id: RequestId,
    rng: &mut fastrand::Rng,
) -> Context {
    let scoreboard = Scoreboard::deal(session.roster().last(MAX_DEVICES), rng);
    info!(
        devices = scoreboard.len(),
        round = session.leaderboard.rounds() + 1,
        %request_id,
        "starting round"
    );

    let mut ctx = Context::default();
    ctx.push(Directive::StartInputHandler(round_input_handler(config)));
    ctx.extend(player_lights(&scoreboard));
    ctx.say("Ok. Each player, hit your color..");
    ctx.say(speech::WAITING_AUDIO);
    ctx.open_microphone = false;

    session.scoreboard = Some(scoreboard);
    session.expecting_end_confirmation = false;
    session.open_window(request_id);
    ctx
}

/// Handles a button-down reported during a round
///
/// Only the first device in the event is scored. Devices that were not
/// enrolled by roll call get a notice and leave the scores alone.
///
/// # Arguments
///
/// * `session` - The conversation holding the round's scoreboard
/// * `config` - Supplies the scoring policy
/// * `event` - The `button_down_event`, carrying the press
pub fn button_pressed(session: &mut Session, config: &Config, event: &GameEvent) -> Context {
    let mut ctx = Context::default();
    ctx.open_microphone = false;

    let Some(device) = event.pressed_devices().first().copied().cloned() else {
        debug!("button-down event reported no press");
        return ctx;
    };

    let role = session.roster().role_of(&device);
    let award = match (role, session.scoreboard.as_mut()) {
        (Some(role), Some(scoreboard)) => scoreboard
            .record_press(&device, config.scoring)
            .map(|award| (role, award)),
        _ => None,
    };

    match award {
        Some((role, award)) => {
            info!(%device, %role, award, "press scored");
            ctx.say(format!("Button {role}."));
        }
        None => {
            warn!(%device, "press by unregistered button");
            ctx.say("Unregistered button.");
            ctx.say("Only buttons registered during roll call are in play.");
        }
    }
    ctx.say(speech::WAITING_AUDIO);
    ctx
}

/// Spoken line announcing one device's result
fn score_line(color: Color, score: i64) -> String {
    format!("{} player won {score} points.", color.name().to_title_case())
}

/// Ends the round when its input handler expires
///
/// Reads out every device's score in scoreboard order, adds the round to
/// the leaderboard and asks whether the players want to quit.
pub fn timeout(session: &mut Session) -> Context {
    let mut ctx = Context::default();

    ctx.say("Round over. The scores are as follows:");
    if let Some(scoreboard) = &session.scoreboard {
        ctx.output_speech.extend(
            scoreboard
                .entries()
                .iter()
                .map(|entry| score_line(entry.color, entry.score)),
        );
    }
    ctx.say("That concludes the round, would you like to quit?");
    ctx.reprompt("Would you like to exit?");
    ctx.reprompt("Say Yes to exit, or No to keep going.");
    ctx.extend(reset_lights(
        session.roster().devices(),
        animation::round::FINISHED,
    ));
    ctx.open_microphone = true;

    session.tally_round();
    session.expecting_end_confirmation = true;
    session.mode = Mode::Exit;
    session.close_window();

    info!(rounds = session.leaderboard.rounds(), "round over");
    ctx
}
