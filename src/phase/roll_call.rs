//! Roll call: device enrollment
//!
//! Roll call opens an input handler that recognizes the first, second, ...
//! distinct device to go down, using proxies because the identifiers are
//! not known in advance. Each check-in gives the reporting device the next
//! role. Check-ins must arrive in recognizer order; anything else is a
//! duplicate or out-of-order delivery and is dropped without a word. Once
//! the configured number of devices has checked in the session moves on to
//! play.

use itertools::Itertools;
use tracing::{debug, info};

use crate::{
    animation::{self, DEFAULT_BUTTON_DOWN, DEFAULT_BUTTON_UP, Trigger},
    config::Config,
    constants::speech,
    context::Context,
    directive::{Directive, EventSpec, InputHandler, PatternStep, Recognizer, Reports},
    event::{EventName, GameEvent, Ordinal, RequestId},
    session::{Mode, Session},
};

use super::{count_word, reset_lights};

/// The input handler listening for `required` devices to check in
///
/// Each ordinal's recognizer extends the previous one by one more distinct
/// device, every check-in event fires at most once, and the last required
/// check-in closes the input handler.
fn roll_call_input_handler(config: &Config) -> InputHandler {
    let ordinals = Ordinal::ALL
        .into_iter()
        .take(config.required_devices)
        .collect_vec();

    ordinals
        .iter()
        .enumerate()
        .fold(
            InputHandler::new(config.roll_call_timeout),
            |handler, (i, ordinal)| {
                let pattern = ordinals[..=i]
                    .iter()
                    .map(|o| PatternStep::down_by(o.proxy()))
                    .collect_vec();

                handler
                    .proxy(ordinal.proxy())
                    .recognizer(ordinal.recognizer(), Recognizer::matching(i > 0, pattern))
                    .event(
                        ordinal.event_name(),
                        EventSpec {
                            meets: vec![ordinal.recognizer()],
                            reports: Reports::Matches,
                            should_end_input_handler: i + 1 == ordinals.len(),
                            maximum_invocations: Some(1),
                        },
                    )
            },
        )
        .event(EventName::TIMEOUT, EventSpec::timed_out())
}

/// Starts (or restarts) roll call
///
/// Forgets any enrolled device, opens the check-in input handler under
/// `request_id` and switches every device to the check-in animations. The
/// microphone stays closed: the skill waits for buttons, not speech.
///
/// # Arguments
///
/// * `session` - The conversation; its roster and flags are reset
/// * `config` - Supplies the number of devices to wait for and the timeout
/// * `request_id` - The request starting the input handler, which every
///   check-in report will carry back
///
/// # Returns
///
/// The input handler directive followed by the check-in button animations
pub fn start(session: &mut Session, config: &Config, request_id: RequestId) -> Context {
    info!(required = config.required_devices, %request_id, "starting roll call");

    session.reset_roll_call();
    session.mode = Mode::RollCall;
    session.scoreboard = None;
    session.open_window(request_id);

    let mut ctx = Context::default();
    ctx.push(Directive::StartInputHandler(roll_call_input_handler(config)));
    ctx.push(Directive::set_light(
        &[],
        Trigger::ButtonDown,
        animation::roll_call::CHECK_IN_DOWN,
    ));
    ctx.push(Directive::set_light(
        &[],
        Trigger::ButtonUp,
        animation::roll_call::CHECK_IN_UP,
    ));
    ctx.open_microphone = false;
    ctx
}

/// Handles the check-in of the device reported for `ordinal`
///
/// Applies only when exactly the preceding roles are taken; otherwise the
/// event is accepted and nothing changes. The reporting device is the first
/// device in the event that holds no role yet.
///
/// The check-in that fills the last required role also completes roll
/// call: the session moves to [`Mode::Play`], the input handler window is
/// closed and the players are asked to start.
///
/// # Arguments
///
/// * `session` - The conversation the device is enrolled into
/// * `config` - Supplies the number of required devices
/// * `ordinal` - Which check-in event fired
/// * `event` - The event, carrying the button-downs that matched
///
/// # Returns
///
/// The greeting for the new device, or an empty context if the check-in
/// was discarded
pub fn check_in(
    session: &mut Session,
    config: &Config,
    ordinal: Ordinal,
    event: &GameEvent,
) -> Context {
    let mut ctx = Context::default();
    let role = ordinal.role();

    if role.number() > config.required_devices
        || session.registered_count() + 1 != role.number()
    {
        debug!(
            %role,
            registered = session.registered_count(),
            "ignoring out-of-order check-in"
        );
        return ctx;
    }

    let Some(device) = event
        .pressed_devices()
        .into_iter()
        .find(|device| !session.roster().contains(device))
        .cloned()
    else {
        debug!(%role, "check-in reported no new device");
        return ctx;
    };

    let enrollment = match session.enroll(role, device.clone(), config.required_devices) {
        Ok(enrollment) => enrollment,
        Err(e) => {
            debug!(%role, error = %e, "check-in discarded");
            return ctx;
        }
    };

    info!(role = %enrollment.role, %device, "button checked in");
    ctx.say(format!("Hello, button {}.", enrollment.role));
    ctx.push(Directive::set_light(
        std::slice::from_ref(&device),
        Trigger::Idle,
        animation::roll_call::CHECK_IN_IDLE,
    ));

    if enrollment.complete {
        complete(session, &mut ctx);
    } else {
        ctx.say(speech::WAITING_AUDIO);
        ctx.open_microphone = false;
    }

    ctx
}

/// Hands an enrolled roster over to play
fn complete(session: &mut Session, ctx: &mut Context) {
    let devices = session.roster().devices().to_vec();
    info!(devices = devices.len(), "roll call complete");

    session.mode = Mode::Play;
    session.close_window();

    ctx.say(speech::BREAK);
    ctx.say(format!(
        "Awesome. I've registered {}.",
        pluralizer::pluralize("button", isize::try_from(devices.len()).unwrap_or(isize::MAX), true)
    ));
    ctx.say("When everyone is ready, say start.");
    ctx.reprompt("Say start to begin the first round.");

    ctx.push(Directive::set_light(
        &devices,
        Trigger::Idle,
        animation::roll_call::COMPLETE,
    ));
    ctx.push(Directive::set_light(
        &devices,
        Trigger::ButtonDown,
        DEFAULT_BUTTON_DOWN,
    ));
    ctx.push(Directive::set_light(
        &devices,
        Trigger::ButtonUp,
        DEFAULT_BUTTON_UP,
    ));
    ctx.open_microphone = true;
}

/// Handles roll call running out of time before every device checked in
///
/// Asks whether the players want more time and fades out whatever devices
/// did check in. The mode is left alone; the answer decides what follows.
pub fn timeout(session: &mut Session, config: &Config) -> Context {
    info!(
        registered = session.registered_count(),
        required = config.required_devices,
        "roll call timed out"
    );

    session.expecting_end_confirmation = true;
    session.close_window();

    let mut ctx = Context::default();
    ctx.say(format!(
        "For this skill we need {} buttons.",
        count_word(config.required_devices)
    ));
    ctx.say("Would you like more time to press the buttons?");
    ctx.reprompt("Say yes to go back and add buttons, or no to exit now.");
    ctx.extend(reset_lights(
        session.roster().devices(),
        animation::roll_call::TIMEOUT,
    ));
    ctx.open_microphone = true;
    ctx
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        device::{DeviceId, Role},
        event::InputEvent,
    };

    fn checked_in(ordinal: Ordinal, devices: &[&str]) -> GameEvent {
        GameEvent::new(
            EventName::CheckedIn(ordinal),
            devices.iter().map(|d| InputEvent::down(*d)).collect(),
        )
    }

    fn started(config: &Config) -> Session {
        let mut session = Session::default();
        start(&mut session, config, "req-roll-call".into());
        session
    }

    #[test]
    fn test_start_resets_session() {
        let config = Config::default();
        let mut session = Session::default();
        session.enroll(Role::FIRST, "old".into(), 2).unwrap();
        session.expecting_end_confirmation = true;
        session.mode = Mode::Exit;

        let ctx = start(&mut session, &config, "req-1".into());

        assert_eq!(session.registered_count(), 0);
        assert!(!session.roll_call_complete());
        assert!(!session.expecting_end_confirmation);
        assert_eq!(session.mode, Mode::RollCall);
        assert!(session.is_current_window(&"req-1".into()));
        assert!(!ctx.open_microphone);
    }

    #[test]
    fn test_start_declares_check_in_events() {
        let config = Config {
            required_devices: 4,
            ..Config::default()
        };
        let mut session = Session::default();
        let ctx = start(&mut session, &config, "req-1".into());

        let handler = ctx.directives[0].input_handler().unwrap();
        assert_eq!(handler.timeout, config.roll_call_timeout);
        assert_eq!(
            handler.proxies,
            vec!["first_button", "second_button", "third_button", "forth_button"]
        );
        assert_eq!(handler.recognizers.len(), 4);
        assert_eq!(
            handler.recognizers["roll_call_third_button_recognizer"]
                .pattern
                .len(),
            3
        );
        assert!(!handler.recognizers["roll_call_first_button_recognizer"].fuzzy);
        assert!(handler.recognizers["roll_call_second_button_recognizer"].fuzzy);

        assert_eq!(handler.events.len(), 5);
        assert!(!handler.events["third_button_checked_in"].should_end_input_handler);
        assert!(handler.events["forth_button_checked_in"].should_end_input_handler);
        assert_eq!(
            handler.events["first_button_checked_in"].maximum_invocations,
            Some(1)
        );
        assert!(handler.events["timeout"].should_end_input_handler);

        let triggers: Vec<_> = ctx.directives[1..]
            .iter()
            .filter_map(Directive::light)
            .map(|l| (l.trigger, l.animation))
            .collect();
        assert_eq!(
            triggers,
            vec![
                (Trigger::ButtonDown, animation::roll_call::CHECK_IN_DOWN),
                (Trigger::ButtonUp, animation::roll_call::CHECK_IN_UP),
            ]
        );
    }

    #[test]
    fn test_default_config_listens_for_two_devices() {
        let config = Config::default();
        let mut session = Session::default();
        let ctx = start(&mut session, &config, "req-1".into());

        let handler = ctx.directives[0].input_handler().unwrap();
        assert_eq!(handler.proxies, vec!["first_button", "second_button"]);
        assert!(handler.events["second_button_checked_in"].should_end_input_handler);
        assert!(!handler.events.contains_key("third_button_checked_in"));
    }

    #[test]
    fn test_first_check_in() {
        let config = Config::default();
        let mut session = started(&config);

        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["A"]),
        );

        assert_eq!(session.registered_count(), 1);
        assert_eq!(session.roster().device(Role::FIRST), Some(&DeviceId::from("A")));
        assert_eq!(ctx.output_speech[0], "Hello, button 1.");
        assert!(!ctx.open_microphone);
        assert_eq!(session.mode, Mode::RollCall);

        let light = ctx.directives[0].light().unwrap();
        assert_eq!(light.target_gadgets, vec![DeviceId::from("A")]);
        assert_eq!(light.trigger, Trigger::Idle);
        assert_eq!(light.animation, animation::roll_call::CHECK_IN_IDLE);
    }

    #[test]
    fn test_two_devices_complete_roll_call() {
        let config = Config::default();
        let mut session = started(&config);

        check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["A"]),
        );
        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::Second,
            &checked_in(Ordinal::Second, &["A", "B"]),
        );

        assert_eq!(
            session.roster().devices(),
            &[DeviceId::from("A"), DeviceId::from("B")]
        );
        assert!(session.roll_call_complete());
        assert_eq!(session.mode, Mode::Play);
        assert!(session.pending_input_handler().is_none());
        assert!(ctx.open_microphone);
        assert_eq!(ctx.output_speech[0], "Hello, button 2.");
        assert!(ctx.speech().contains("I've registered 2 buttons."));

        let idle = ctx
            .directives
            .iter()
            .filter_map(Directive::light)
            .find(|l| l.animation == animation::roll_call::COMPLETE)
            .unwrap();
        assert_eq!(idle.target_gadgets.len(), 2);
    }

    #[test]
    fn test_strict_order_enrollment_up_to_four() {
        let config = Config {
            required_devices: 4,
            ..Config::default()
        };
        let mut session = started(&config);
        let ids = ["A", "B", "C", "D"];

        for (k, ordinal) in Ordinal::ALL.into_iter().enumerate() {
            check_in(&mut session, &config, ordinal, &checked_in(ordinal, &ids[..=k]));

            assert_eq!(session.registered_count(), k + 1);
            let expected: Vec<DeviceId> = ids[..=k].iter().map(|id| DeviceId::from(*id)).collect();
            assert_eq!(session.roster().devices(), expected.as_slice());
        }
        assert!(session.roll_call_complete());
        assert_eq!(session.mode, Mode::Play);
    }

    #[test]
    fn test_redelivered_check_in_is_ignored() {
        let config = Config::default();
        let mut session = started(&config);
        let event = checked_in(Ordinal::First, &["A"]);

        check_in(&mut session, &config, Ordinal::First, &event);
        let before = session.clone();

        let ctx = check_in(&mut session, &config, Ordinal::First, &event);
        assert!(ctx.is_silent());
        assert_eq!(session, before);

        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["Z"]),
        );
        assert!(ctx.is_silent());
        assert_eq!(session, before);
    }

    #[test]
    fn test_out_of_order_check_in_is_ignored() {
        let config = Config::default();
        let mut session = started(&config);

        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::Second,
            &checked_in(Ordinal::Second, &["A", "B"]),
        );

        assert!(ctx.is_silent());
        assert_eq!(session.registered_count(), 0);
        assert!(!session.roll_call_complete());
    }

    #[test]
    fn test_check_in_beyond_required_is_ignored() {
        let config = Config::default();
        let mut session = started(&config);
        check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["A"]),
        );
        check_in(
            &mut session,
            &config,
            Ordinal::Second,
            &checked_in(Ordinal::Second, &["A", "B"]),
        );

        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::Third,
            &checked_in(Ordinal::Third, &["A", "B", "C"]),
        );
        assert!(ctx.is_silent());
        assert_eq!(session.registered_count(), 2);
    }

    #[test]
    fn test_check_in_with_only_known_devices_is_ignored() {
        let config = Config::default();
        let mut session = started(&config);
        check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["A"]),
        );

        let ctx = check_in(
            &mut session,
            &config,
            Ordinal::Second,
            &checked_in(Ordinal::Second, &["A"]),
        );
        assert!(ctx.is_silent());
        assert_eq!(session.registered_count(), 1);
    }

    #[test]
    fn test_timeout_before_completion() {
        let config = Config::default();
        let mut session = started(&config);
        check_in(
            &mut session,
            &config,
            Ordinal::First,
            &checked_in(Ordinal::First, &["A"]),
        );

        let ctx = timeout(&mut session, &config);

        assert_eq!(session.mode, Mode::RollCall);
        assert!(session.expecting_end_confirmation);
        assert!(session.pending_input_handler().is_none());
        assert!(ctx.open_microphone);
        assert_eq!(ctx.output_speech[0], "For this skill we need two buttons.");
        assert!(!ctx.reprompt.is_empty());

        assert_eq!(ctx.directives.len(), 3);
        for light in ctx.directives.iter().filter_map(Directive::light) {
            assert_eq!(light.target_gadgets, vec![DeviceId::from("A")]);
        }
    }

    #[test]
    fn test_timeout_without_devices_resets_every_device() {
        let config = Config::default();
        let mut session = started(&config);

        let ctx = timeout(&mut session, &config);

        assert_eq!(ctx.directives.len(), 3);
        for light in ctx.directives.iter().filter_map(Directive::light) {
            assert!(light.target_gadgets.is_empty());
        }
    }
}
