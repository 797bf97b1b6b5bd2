#![forbid(unsafe_code)]

//! The terminal event loop.
//!
//! A [`Model`] answers messages with a [`Cmd`]; the [`Program`] performs the
//! command, re-reads [`Model::subscriptions`], and redraws when anything was
//! dispatched. Timers from [`Cmd::after`] and interval subscriptions share
//! one clock measured from program start, so the loop sleeps until the
//! nearest deadline instead of polling on a fixed tick.

use std::io::{self, Stdout};
use std::rc::Rc;
use std::time::{Duration, Instant};

use ontos_core::event::Event;
use ontos_render::ansi;
use ontos_render::frame::Frame;
use ontos_render::presenter::Presenter;
use tracing::{debug, debug_span, info, trace};

use crate::clipboard::{Clipboard, ClipboardError};
use crate::scheduler::TimerQueue;
use crate::session::{SessionOptions, TerminalSession};
use crate::subscription::{Subscription, SubscriptionSet};

/// Application state driven by messages.
pub trait Model: Sized {
    /// Terminal events arrive through `From<Event>`.
    type Message: From<Event> + 'static;

    /// Startup commands, run before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the whole screen. Must not mutate observable state.
    fn view(&self, frame: &mut Frame);

    /// Interval subscriptions wanted right now. Re-read after every
    /// update; ids that appear start ticking, ids that vanish stop.
    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        vec![]
    }
}

/// Maps a clipboard result back into a model message.
pub type ClipboardCallback<M> = Box<dyn FnOnce(Result<(), ClipboardError>) -> M>;

/// A side effect for the runtime to perform.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Quit the application.
    Quit,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Dispatch a message right away.
    Msg(M),
    /// Deliver a message once, after a delay.
    After(Duration, M),
    /// Set the terminal window title.
    SetTitle(String),
    /// Copy text to the system clipboard, reporting the outcome.
    SetClipboard(String, ClipboardCallback<M>),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::After(d, m) => f.debug_tuple("After").field(d).field(m).finish(),
            Self::SetTitle(s) => f.debug_tuple("SetTitle").field(s).finish(),
            Self::SetClipboard(s, _) => f.debug_tuple("SetClipboard").field(s).finish(),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Deliver `m` once after `delay`.
    #[inline]
    pub fn after(delay: Duration, m: M) -> Self {
        Self::After(delay, m)
    }

    /// Set the window title.
    #[inline]
    pub fn set_title(title: impl Into<String>) -> Self {
        Self::SetTitle(title.into())
    }

    /// Copy `text` to the clipboard; `done` maps the outcome to a message.
    pub fn clipboard(
        text: impl Into<String>,
        done: impl FnOnce(Result<(), ClipboardError>) -> M + 'static,
    ) -> Self {
        Self::SetClipboard(text.into(), Box::new(done))
    }

    /// Create a batch of commands, flattening no-ops.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    /// Convert every message this command can produce with `f`.
    ///
    /// Used to lift a child view's commands into the parent's message type.
    pub fn map<N: 'static>(self, f: impl Fn(M) -> N + 'static) -> Cmd<N>
    where
        M: 'static,
    {
        let f: Rc<dyn Fn(M) -> N> = Rc::new(f);
        self.map_shared(&f)
    }

    fn map_shared<N: 'static>(self, f: &Rc<dyn Fn(M) -> N>) -> Cmd<N>
    where
        M: 'static,
    {
        match self {
            Self::None => Cmd::None,
            Self::Quit => Cmd::Quit,
            Self::Batch(cmds) => Cmd::Batch(cmds.into_iter().map(|c| c.map_shared(f)).collect()),
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::After(delay, m) => Cmd::After(delay, f(m)),
            Self::SetTitle(title) => Cmd::SetTitle(title),
            Self::SetClipboard(text, done) => {
                let f = Rc::clone(f);
                Cmd::SetClipboard(text, Box::new(move |result| f(done(result))))
            }
        }
    }

    /// True for [`Cmd::None`].
    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Return a stable name for tracing.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::After(..) => "After",
            Self::SetTitle(_) => "SetTitle",
            Self::SetClipboard(..) => "SetClipboard",
        }
    }
}

/// Configuration for the terminal runtime.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Use the alternate screen buffer.
    pub alternate_screen: bool,
    /// Enable mouse support.
    pub mouse: bool,
    /// Upper bound on how long the loop sleeps waiting for input.
    pub poll_timeout: Duration,
    /// Quit automatically after this long.
    pub exit_after: Option<Duration>,
    /// Clipboard backend.
    pub clipboard: Clipboard,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse: true,
            poll_timeout: Duration::from_millis(100),
            exit_after: None,
            clipboard: Clipboard::osc52(),
        }
    }
}

/// Owns the terminal session while a [`Model`] runs.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
    presenter: Presenter<Stdout>,
    timers: TimerQueue<M::Message>,
    subscriptions: SubscriptionSet<M::Message>,
    started: Instant,
    size: (u16, u16),
    running: bool,
    dirty: bool,
}

impl<M: Model> Program<M> {
    /// Create a program for `model`. No terminal state changes until [`run`](Self::run).
    pub fn new(model: M, config: ProgramConfig) -> Self {
        Self {
            model,
            config,
            presenter: Presenter::new(io::stdout()),
            timers: TimerQueue::new(),
            subscriptions: SubscriptionSet::new(),
            started: Instant::now(),
            size: (80, 24),
            running: true,
            dirty: true,
        }
    }

    /// Run until the model quits, the exit deadline passes, or I/O fails.
    ///
    /// The terminal is restored on every exit path, including errors.
    pub fn run(mut self) -> io::Result<M> {
        let session = TerminalSession::new(SessionOptions {
            alternate_screen: self.config.alternate_screen,
            mouse_capture: self.config.mouse,
        })?;
        self.started = Instant::now();
        self.size = session.size()?;
        info!(width = self.size.0, height = self.size.1, "program starting");

        let result = self.run_event_loop(&session);
        self.subscriptions.clear();
        self.timers.clear();
        drop(session);
        info!("program stopped");
        result.map(|()| self.model)
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    fn run_event_loop(&mut self, session: &TerminalSession) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!("ontos.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        let (width, height) = self.size;
        self.dispatch(Event::Resize { width, height }.into())?;
        self.render_frame()?;

        while self.running {
            if self
                .config
                .exit_after
                .is_some_and(|limit| self.now() >= limit)
            {
                info!("exit deadline reached");
                break;
            }

            if session.poll_event(self.effective_timeout())? {
                loop {
                    if let Some(event) = session.read_event()? {
                        self.handle_event(event)?;
                    }
                    if !self.running || !session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
            }

            self.process_due()?;

            if self.dirty && self.running {
                self.render_frame()?;
            }
        }
        Ok(())
    }

    /// Sleep until the earliest of: next timer, next subscription tick,
    /// exit deadline, or the poll ceiling.
    fn effective_timeout(&self) -> Duration {
        let now = self.now();
        [
            self.timers.next_deadline(),
            self.subscriptions.next_deadline(),
            self.config.exit_after,
        ]
        .into_iter()
        .flatten()
        .map(|deadline| deadline.saturating_sub(now))
        .fold(self.config.poll_timeout, Duration::min)
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        if let Event::Resize { width, height } = event {
            self.size = (width, height);
            self.presenter.invalidate();
        }
        self.dispatch(M::Message::from(event))
    }

    fn process_due(&mut self) -> io::Result<()> {
        let now = self.now();
        while self.running {
            let Some(msg) = self.timers.pop_due(now) else {
                break;
            };
            self.dispatch(msg)?;
        }
        for msg in self.subscriptions.collect_due(now) {
            if !self.running {
                break;
            }
            self.dispatch(msg)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: M::Message) -> io::Result<()> {
        let cmd = {
            let _span = debug_span!("ontos.program.update").entered();
            self.model.update(msg)
        };
        trace!(cmd = cmd.type_name(), "update returned");
        self.dirty = true;
        self.execute_cmd(cmd)?;
        let now = self.now();
        self.subscriptions
            .reconcile(self.model.subscriptions(), now);
        Ok(())
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                debug!("quit requested");
                self.running = false;
            }
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(m) => self.dispatch(m)?,
            Cmd::After(delay, m) => {
                let deadline = self.now() + delay;
                self.timers.schedule(deadline, m);
            }
            Cmd::SetTitle(title) => {
                let mut bytes = Vec::new();
                ansi::set_title(&mut bytes, &title)?;
                self.presenter.write_raw(&bytes)?;
            }
            Cmd::SetClipboard(text, done) => {
                let result = self
                    .config
                    .clipboard
                    .sequence(&text)
                    .and_then(|seq| {
                        self.presenter
                            .write_raw(seq.as_bytes())
                            .map_err(|e| ClipboardError::WriteError(e.to_string()))
                    });
                if let Err(err) = &result {
                    debug!(error = %err, "clipboard write failed");
                }
                self.dispatch(done(result))?;
            }
        }
        Ok(())
    }

    fn render_frame(&mut self) -> io::Result<()> {
        let (width, height) = self.size;
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        self.presenter.present(&frame.buffer)?;
        self.dirty = false;
        Ok(())
    }
}
