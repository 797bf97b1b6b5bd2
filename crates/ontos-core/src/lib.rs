#![forbid(unsafe_code)]

//! Core primitives for the Ontos demo.
//!
//! # Key Components
//!
//! - [`geometry`] - Rectangles, sides, and simple row/column splitting
//! - [`event`] - Canonical input events, converted from crossterm
//! - [`animation`] - Easing curves, pulses, and the eased [`AnimatedCounter`]
//! - [`playback`] - The timed-line [`Sequencer`] and the [`Typewriter`]
//! - [`gesture`] - Horizontal swipe recognition over pointer drags
//! - [`viewport`] - Width breakpoints that report only on change
//!
//! Nothing in this crate owns a clock. Time-driven types expose what they
//! want to happen next (a [`Wake`] or a `tick(dt)` entry point) and the
//! runtime decides when to call back.
//!
//! [`AnimatedCounter`]: animation::AnimatedCounter
//! [`Sequencer`]: playback::Sequencer
//! [`Typewriter`]: playback::Typewriter
//! [`Wake`]: playback::Wake

pub mod animation;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod playback;
pub mod viewport;
