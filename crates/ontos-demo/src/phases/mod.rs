#![forbid(unsafe_code)]

//! The four phase views.
//!
//! Each phase implements [`PhaseView`]. A phase draws into a tall off-screen
//! canvas as wide as the content column and reports how many rows it used;
//! the app scrolls that canvas inside the viewport. Phases own their timers
//! through [`Wake`] chains and never see messages addressed to a previous
//! mount (the app filters those out by mount id).

pub mod deterministic_ai;
pub mod engine;
pub mod live_tick;
pub mod problem;

use std::fmt;
use std::time::Duration;

use ontos_core::event::KeyEvent;
use ontos_core::playback::{Jitter, Wake};
use ontos_render::frame::{Frame, HitData};
use ontos_runtime::Cmd;
use tracing::warn;

use crate::ui::ViewCtx;

pub use deterministic_ai::ChatPhase;
pub use engine::EnginePhase;
pub use live_tick::LiveTickPhase;
pub use problem::ProblemPhase;

/// Frame tick while something is animating.
pub const FRAME: Duration = Duration::from_millis(16);
/// Slower tick for cursors and pulses.
pub const BLINK: Duration = Duration::from_millis(100);
/// Rows of the off-screen canvas a phase draws into.
pub const CANVAS_ROWS: u16 = 600;

/// A phase of the walkthrough.
pub trait PhaseView {
    /// Message type for this phase (wrapped by [`PhaseMsg`]).
    type Message: fmt::Debug + 'static;

    /// Called once when the view is mounted.
    fn mount(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Handle a phase message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Map a key the app did not consume to a phase message.
    fn key(&self, _key: &KeyEvent) -> Option<Self::Message> {
        None
    }

    /// Map a click on a [`hit::PHASE`](crate::ui::hit::PHASE) region.
    fn click(&self, _data: HitData) -> Option<Self::Message> {
        None
    }

    /// Advance frame-driven animation by `dt`.
    fn tick(&mut self, _dt: Duration) {}

    /// How often the view wants [`tick`](Self::tick), if at all.
    fn frame_interval(&self) -> Option<Duration> {
        None
    }

    /// Draw into `frame` from row 0; returns rows used.
    fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16;
}

/// Turn a wake request into a one-shot timer.
pub(crate) fn schedule<M>(wake: Option<Wake>, make: impl FnOnce(Wake) -> M) -> Cmd<M> {
    match wake {
        Some(wake) => Cmd::after(wake.after(), make(wake)),
        None => Cmd::none(),
    }
}

/// A message for whichever phase is mounted.
#[derive(Debug)]
pub enum PhaseMsg {
    Problem(problem::Msg),
    Engine(engine::Msg),
    LiveTick(live_tick::Msg),
    Chat(deterministic_ai::Msg),
}

/// The mounted phase view.
#[derive(Debug)]
pub enum ActivePhase {
    Problem(ProblemPhase),
    Engine(EnginePhase),
    LiveTick(LiveTickPhase),
    Chat(ChatPhase),
}

macro_rules! each_phase {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            ActivePhase::Problem($p) => $body,
            ActivePhase::Engine($p) => $body,
            ActivePhase::LiveTick($p) => $body,
            ActivePhase::Chat($p) => $body,
        }
    };
}

macro_rules! each_phase_msg {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            ActivePhase::Problem($p) => $body.map(PhaseMsg::Problem),
            ActivePhase::Engine($p) => $body.map(PhaseMsg::Engine),
            ActivePhase::LiveTick($p) => $body.map(PhaseMsg::LiveTick),
            ActivePhase::Chat($p) => $body.map(PhaseMsg::Chat),
        }
    };
}

impl ActivePhase {
    /// Fresh view for phase `index`. Out-of-range indices get the last one.
    pub fn for_index(index: usize, jitter: Jitter) -> Self {
        match index {
            0 => Self::Problem(ProblemPhase::new()),
            1 => Self::Engine(EnginePhase::new()),
            2 => Self::LiveTick(LiveTickPhase::new()),
            _ => Self::Chat(ChatPhase::new(jitter)),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Problem(_) => 0,
            Self::Engine(_) => 1,
            Self::LiveTick(_) => 2,
            Self::Chat(_) => 3,
        }
    }

    pub fn mount(&mut self) -> Cmd<PhaseMsg> {
        each_phase_msg!(self, p => p.mount())
    }

    pub fn update(&mut self, msg: PhaseMsg) -> Cmd<PhaseMsg> {
        match (self, msg) {
            (Self::Problem(p), PhaseMsg::Problem(m)) => p.update(m).map(PhaseMsg::Problem),
            (Self::Engine(p), PhaseMsg::Engine(m)) => p.update(m).map(PhaseMsg::Engine),
            (Self::LiveTick(p), PhaseMsg::LiveTick(m)) => p.update(m).map(PhaseMsg::LiveTick),
            (Self::Chat(p), PhaseMsg::Chat(m)) => p.update(m).map(PhaseMsg::Chat),
            (phase, msg) => {
                warn!(phase = phase.index(), ?msg, "message for another phase");
                Cmd::none()
            }
        }
    }

    pub fn key(&self, key: &KeyEvent) -> Option<PhaseMsg> {
        each_phase_msg!(self, p => p.key(key))
    }

    pub fn click(&self, data: HitData) -> Option<PhaseMsg> {
        each_phase_msg!(self, p => p.click(data))
    }

    pub fn tick(&mut self, dt: Duration) {
        each_phase!(self, p => p.tick(dt));
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        each_phase!(self, p => p.frame_interval())
    }

    pub fn view(&self, frame: &mut Frame, ctx: ViewCtx) -> u16 {
        each_phase!(self, p => p.view(frame, ctx))
    }

    pub fn as_problem(&self) -> Option<&ProblemPhase> {
        match self {
            Self::Problem(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_live_tick(&self) -> Option<&LiveTickPhase> {
        match self {
            Self::LiveTick(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_chat(&self) -> Option<&ChatPhase> {
        match self {
            Self::Chat(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_engine(&self) -> Option<&EnginePhase> {
        match self {
            Self::Engine(p) => Some(p),
            _ => None,
        }
    }
}
