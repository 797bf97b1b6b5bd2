#![forbid(unsafe_code)]

//! Ontos × SentimenTrader walkthrough.
//!
//! A four-phase scripted demo of a compiled reasoning engine: the problem,
//! the `.onto` specification, two live market ticks, and a deterministic AI
//! agent. Everything shown is canned data played back on timers.
//!
//! [`app::App`] is the runtime model; [`phases`] holds the four views and
//! [`controller`] decides which one is mounted.

pub mod app;
pub mod chrome;
pub mod cli;
pub mod controller;
pub mod error_boundary;
pub mod fixtures;
pub mod logging;
pub mod markdown;
pub mod og_card;
pub mod onto_syntax;
pub mod phases;
pub mod theme;
pub mod ui;
