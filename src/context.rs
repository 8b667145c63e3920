//! Per-request output
//!
//! Every handler returns a [`Context`] holding what the response should say,
//! which hardware directives it carries and whether the skill keeps
//! listening. The transport turns it into a platform response.

use itertools::Itertools;
use serde::Serialize;

use crate::directive::Directive;

/// Output accumulated while handling one inbound request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    /// Lines to speak, in order
    pub output_speech: Vec<String>,
    /// Lines to speak if the player stays silent
    pub reprompt: Vec<String>,
    /// Hardware commands, in execution order
    pub directives: Vec<Directive>,
    /// Whether the skill listens for speech after responding
    pub open_microphone: bool,
    /// Whether the session ends with this response
    pub end_session: bool,
}

impl Context {
    /// Appends a line of speech
    pub fn say(&mut self, line: impl Into<String>) {
        self.output_speech.push(line.into());
    }

    /// Appends a reprompt line
    pub fn reprompt(&mut self, line: impl Into<String>) {
        self.reprompt.push(line.into());
    }

    /// Appends a directive
    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    /// Appends several directives
    pub fn extend(&mut self, directives: impl IntoIterator<Item = Directive>) {
        self.directives.extend(directives);
    }

    /// The spoken output joined into one string
    pub fn speech(&self) -> String {
        self.output_speech.iter().join(" ")
    }

    /// Whether nothing is said and nothing is sent to the hardware
    pub fn is_silent(&self) -> bool {
        self.output_speech.is_empty() && self.reprompt.is_empty() && self.directives.is_empty()
    }

    /// Appends the output of `other`, which handled a later event of the
    /// same request
    ///
    /// The later event decides whether the microphone opens and whether the
    /// session ends.
    pub fn merge(&mut self, other: Context) {
        self.output_speech.extend(other.output_speech);
        self.reprompt.extend(other.reprompt);
        self.directives.extend(other.directives);
        self.open_microphone = other.open_microphone;
        self.end_session |= other.end_session;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_speech_joins_lines() {
        let mut ctx = Context::default();
        ctx.say("Hello, button 1.");
        ctx.say("Awesome.");
        assert_eq!(ctx.speech(), "Hello, button 1. Awesome.");
        assert!(!ctx.is_silent());
    }

    #[test]
    fn test_default_is_silent() {
        assert!(Context::default().is_silent());
    }

    #[test]
    fn test_merge_keeps_order_and_takes_later_microphone() {
        let mut first = Context::default();
        first.say("one");
        first.open_microphone = true;

        let mut second = Context::default();
        second.say("two");
        second.reprompt("again?");

        first.merge(second);
        assert_eq!(first.output_speech, vec!["one", "two"]);
        assert_eq!(first.reprompt, vec!["again?"]);
        assert!(!first.open_microphone);
        assert!(!first.end_session);
    }
}
