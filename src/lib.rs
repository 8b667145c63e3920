//! # Color Crash Game Library
//!
//! This library provides the core game logic for Color Crash, a reaction
//! game played with wireless buttons through a voice skill. It handles
//! device roll call, timed scoring rounds, per-conversation session state
//! and the light and input directives sent to the buttons.
//!
//! The transport owns everything platform specific: it turns inbound
//! requests into [`skill::Request`] values, feeds them to a
//! [`skill::Skill`] and serializes the returned [`context::Context`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod animation;
pub mod config;
pub mod constants;
pub mod context;
pub mod device;
pub mod directive;
pub mod event;
pub mod leaderboard;
pub mod persistence;
pub mod phase;
pub mod scoreboard;
pub mod session;
pub mod skill;

pub use context::Context;
pub use skill::{Request, Skill};
