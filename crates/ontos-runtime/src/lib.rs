#![forbid(unsafe_code)]

//! Ontos runtime
//!
//! Ties the core and render crates into an Elm-style application loop.
//!
//! # Key Components
//!
//! - [`Model`] - Trait for application state and behavior
//! - [`Cmd`] - Commands for side effects, including one-shot timers
//! - [`Every`] - Interval subscription, active while the model declares it
//! - [`Program`] - crossterm-backed terminal runtime
//! - [`ProgramSimulator`] - Deterministic runtime with a virtual clock
//! - [`Clipboard`] - OSC 52 clipboard writes
//!
//! Everything runs on one thread. Timers and subscriptions share a single
//! notion of "now" measured from program start, so the real loop and the
//! simulator deliver messages in the same order.

pub mod clipboard;
pub mod program;
pub mod scheduler;
pub mod session;
pub mod simulator;
pub mod subscription;

pub use clipboard::{Clipboard, ClipboardError};
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::ProgramSimulator;
pub use subscription::{Every, SubId, Subscription};
