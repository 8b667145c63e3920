//! Configuration constants for the Color Crash game
//!
//! This module contains the default timings, device limits and shared
//! speech fragments used by both game phases. Values that a deployment may
//! want to change are surfaced again through [`crate::config::Config`].

/// Roll call (device enrollment) constants
pub mod roll_call {
    /// Fewest devices a game can be played with
    pub const MIN_DEVICES: usize = 2;
    /// Most devices roll call will enroll
    pub const MAX_DEVICES: usize = 4;
    /// Default number of devices roll call waits for
    pub const DEFAULT_REQUIRED_DEVICES: usize = 2;
    /// Default roll call input handler timeout in milliseconds
    pub const DEFAULT_TIMEOUT_MS: u64 = 50_000;
    /// Shortest roll call timeout accepted by configuration, in milliseconds
    pub const MIN_TIMEOUT_MS: u64 = 5_000;
    /// Longest input handler timeout the hardware channel accepts, in milliseconds
    pub const MAX_TIMEOUT_MS: u64 = 90_000;
}

/// Play round constants
pub mod round {
    /// Default round input handler timeout in milliseconds
    pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
    /// Shortest round timeout accepted by configuration, in milliseconds
    pub const MIN_TIMEOUT_MS: u64 = 1_000;
    /// Longest round timeout accepted by configuration, in milliseconds
    pub const MAX_TIMEOUT_MS: u64 = 90_000;
}

/// Speech fragments shared by several handlers
pub mod speech {
    /// Looping "waiting" sound played while the skill listens for buttons
    pub const WAITING_AUDIO: &str = "<audio src='https://s3.amazonaws.com/ask-soundlibrary/ui/gameshow/amzn_ui_sfx_gameshow_waiting_loop_30s_01.mp3'/>";
    /// Short pause inserted between sentences
    pub const BREAK: &str = "<break time='1s'/>";
    /// Name of the skill as spoken to players
    pub const SKILL_NAME: &str = "Color Crash";
}
